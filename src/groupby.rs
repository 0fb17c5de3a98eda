//! GroupBy engine.
//!
//! A [`GroupBy`] is computed once from one or more key arrays and then reused
//! for any number of [`aggregate`](GroupBy::aggregate) calls. It stores a
//! stable permutation that makes equal key tuples contiguous, the start offset
//! of every group in permuted order, and one representative key per group. It
//! holds no reference to the arrays it aggregates.
use crate::aggregate::{Reduction, reduce_with_origin};
use crate::array::{Array, FixedArray};
use crate::config::EngineConfig;
use crate::error::{LimbKitError, Result};
use crate::permute::take;
use crate::util::segment_ranges;
use std::cmp::Ordering;

/// Precomputed stable grouping of positions by equal key tuples.
///
/// # Examples
///
/// ```rust
/// use limbkit::{Array, FixedArray, GroupBy, Reduction};
///
/// let keys = Array::from(FixedArray::from_i64(vec![1, 1, 2, 3, 3, 3]));
/// let values = Array::from(FixedArray::from_i64(vec![10, 20, 5, 1, 2, 3]));
///
/// let g = GroupBy::new(&[&keys], true).unwrap();
/// assert_eq!(g.ngroups(), 3);
/// assert_eq!(g.segments(), &[0, 2, 3]);
///
/// let sums = g.aggregate(&values, Reduction::Sum).unwrap();
/// assert_eq!(sums.as_fixed().unwrap().as_i64(), Some(vec![30, 5, 6]));
/// ```
#[derive(Debug, Clone)]
pub struct GroupBy {
    len: usize,
    permutation: Vec<usize>,
    segments: Vec<usize>,
    unique_keys: Vec<Array>,
    assume_sorted: bool,
}

impl GroupBy {
    /// Group positions by the tuple of `keys`, first key most significant.
    ///
    /// Unless `assume_sorted` is set, positions are stably sorted by key tuple
    /// first. With `assume_sorted` the caller asserts the keys are already in
    /// ascending order and no sort happens. This is trusted, not checked:
    /// unsorted keys then yield one group per run of adjacent equal tuples,
    /// which is not a valid grouping.
    ///
    /// Composite keys order numerically. Float keys order by `f64::total_cmp`
    /// after `-0.0` is folded into `0.0` and all NaNs into one value, so each
    /// of those forms a single group.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if no keys are given or their lengths differ
    pub fn new(keys: &[&Array], assume_sorted: bool) -> Result<Self> {
        let first = keys.first().ok_or_else(|| {
            LimbKitError::Shape("GroupBy needs at least one key array".to_string())
        })?;
        let len = first.len();
        if let Some((pos, bad)) = keys.iter().enumerate().find(|(_, k)| k.len() != len) {
            return Err(LimbKitError::Shape(format!(
                "key array {} has length {}, expected {}",
                pos,
                bad.len(),
                len
            )));
        }
        let _span = tracing::debug_span!(
            "groupby",
            len = len,
            keys = keys.len(),
            assume_sorted = assume_sorted,
        )
        .entered();

        let mut permutation: Vec<usize> = (0..len).collect();
        if !assume_sorted {
            // `sort_by` is stable: equal tuples keep their original order.
            permutation.sort_by(|&a, &b| cmp_tuple(keys, a, b));
        }

        let mut segments = Vec::new();
        let mut previous: Option<usize> = None;
        for (pos, &idx) in permutation.iter().enumerate() {
            match previous {
                Some(prev) if cmp_tuple(keys, prev, idx) == Ordering::Equal => {}
                _ => segments.push(pos),
            }
            previous = Some(idx);
        }

        let starts: Vec<usize> = segments
            .iter()
            .filter_map(|&pos| permutation.get(pos).copied())
            .collect();
        let unique_keys = keys.iter().map(|key| take(key, &starts)).collect();
        tracing::debug!(groups = segments.len(), "built grouping");

        Ok(Self {
            len,
            permutation,
            segments,
            unique_keys,
            assume_sorted,
        })
    }

    /// Number of grouped positions (N).
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no positions were grouped.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of groups.
    pub fn ngroups(&self) -> usize {
        self.segments.len()
    }

    /// Original indices in grouped order.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Start offset of each group within the permuted order.
    pub fn segments(&self) -> &[usize] {
        &self.segments
    }

    /// One representative key per group, one array per key column.
    pub fn unique_keys(&self) -> &[Array] {
        &self.unique_keys
    }

    /// Whether the grouping trusted the caller's sort order.
    pub const fn assume_sorted(&self) -> bool {
        self.assume_sorted
    }

    /// Number of elements in each group, as an `Int64` array.
    pub fn size(&self) -> FixedArray {
        let counts = segment_ranges(&self.segments, self.len)
            .unwrap_or_default()
            .into_iter()
            .map(|range| i64::try_from(range.len()).unwrap_or(i64::MAX))
            .collect();
        FixedArray::from_i64(counts)
    }

    /// Reduce `values` per group with the default [`EngineConfig`].
    ///
    /// # Errors
    ///
    /// See [`aggregate_with`](Self::aggregate_with).
    pub fn aggregate(&self, values: &Array, op: Reduction) -> Result<Array> {
        self.aggregate_with(values, op, &EngineConfig::default())
    }

    /// Reduce `values` per group, returning one value per group in group order.
    ///
    /// Values are first permuted into grouped order, then each segment is
    /// reduced. `argmin`/`argmax` report original indices into `values`.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if `values.len()` differs from the grouping
    /// - [`LimbKitError::Type`] for `any`/`all` over a non-bool array
    pub fn aggregate_with(
        &self,
        values: &Array,
        op: Reduction,
        config: &EngineConfig,
    ) -> Result<Array> {
        if values.len() != self.len {
            return Err(LimbKitError::Shape(format!(
                "values have length {}, grouping has length {}",
                values.len(),
                self.len
            )));
        }
        if self.assume_sorted {
            return reduce_with_origin(values, &self.segments, None, op, config);
        }
        // The permutation covers 0..len by construction.
        let grouped = take(values, &self.permutation);
        reduce_with_origin(&grouped, &self.segments, Some(&self.permutation), op, config)
    }

    /// Like [`aggregate`](Self::aggregate), with the operator given by name.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnsupportedOperation`] if `op` is not a known reduction
    pub fn aggregate_str(&self, values: &Array, op: &str) -> Result<Array> {
        self.aggregate(values, op.parse()?)
    }
}

fn cmp_tuple(keys: &[&Array], a: usize, b: usize) -> Ordering {
    keys.iter()
        .map(|key| key.cmp_at(a, b))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
