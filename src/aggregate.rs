//! Segment reductions.
//!
//! The aggregator reduces contiguous segments of a value array with one of the
//! [`Reduction`] kinds. Each segment is split at partition boundaries (see
//! [`EngineConfig::partition_len`]); every piece is folded into a partial
//! accumulator and the partials are merged left to right. All merges are
//! associative, and the order-sensitive ones (`first`, `last`, `argmin`,
//! `argmax`) break ties on position, so results never depend on the partition
//! length. Float sums and products are not associative and are folded as one
//! piece per segment for the same reason.
use crate::array::{Array, FixedArray, ScalarKind, canonical_float_bits};
use crate::composite::CompositeArray;
use crate::config::EngineConfig;
use crate::error::{LimbKitError, Result};
use crate::limb::Limb;
use crate::permute::take;
use crate::util::{partition_pieces, segment_ranges};
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Reduction kind applied per group.
///
/// Parsed from its lowercase name with [`FromStr`]; unknown names fail with
/// [`LimbKitError::UnsupportedOperation`].
///
/// # Examples
///
/// ```rust
/// use limbkit::{LimbKitError, Reduction};
///
/// assert_eq!("argmax".parse::<Reduction>(), Ok(Reduction::Argmax));
/// assert!(matches!(
///     "median".parse::<Reduction>(),
///     Err(LimbKitError::UnsupportedOperation(_))
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// Arithmetic sum; identity 0
    Sum,
    /// Arithmetic product; identity 1
    Prod,
    /// Sum divided by count as `f64`; NaN for an empty group
    Mean,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Original index of the first minimum
    Argmin,
    /// Original index of the first maximum
    Argmax,
    /// Whether any element is true (bool input only); identity false
    Any,
    /// Whether every element is true (bool input only); identity true
    All,
    /// Count of distinct values; identity 0
    Nunique,
    /// First element in original order
    First,
    /// Last element in original order
    Last,
}

impl Reduction {
    /// Every reduction kind, in canonical order.
    pub const ALL: [Reduction; 12] = [
        Reduction::Sum,
        Reduction::Prod,
        Reduction::Mean,
        Reduction::Min,
        Reduction::Max,
        Reduction::Argmin,
        Reduction::Argmax,
        Reduction::Any,
        Reduction::All,
        Reduction::Nunique,
        Reduction::First,
        Reduction::Last,
    ];

    /// Lowercase operator name.
    pub const fn name(self) -> &'static str {
        match self {
            Reduction::Sum => "sum",
            Reduction::Prod => "prod",
            Reduction::Mean => "mean",
            Reduction::Min => "min",
            Reduction::Max => "max",
            Reduction::Argmin => "argmin",
            Reduction::Argmax => "argmax",
            Reduction::Any => "any",
            Reduction::All => "all",
            Reduction::Nunique => "nunique",
            Reduction::First => "first",
            Reduction::Last => "last",
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reduction {
    type Err = LimbKitError;

    fn from_str(s: &str) -> Result<Self> {
        Reduction::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| LimbKitError::UnsupportedOperation(s.to_string()))
    }
}

/// Reduce each segment of `values`.
///
/// `segments` holds the start offset of every segment; offsets must be
/// non-decreasing and at most `values.len()`. Repeated offsets denote empty
/// segments, which produce the reduction's identity or fail with
/// [`LimbKitError::NoGroups`] when it has none. `argmin`/`argmax` report
/// positions within `values`.
///
/// # Errors
///
/// - [`LimbKitError::Shape`] if the offsets are malformed
/// - [`LimbKitError::Type`] for `any`/`all` over a non-bool array
/// - [`LimbKitError::NoGroups`] for `min`, `max`, `argmin`, `argmax`, `first`
///   or `last` over an empty segment
///
/// # Examples
///
/// ```rust
/// use limbkit::{reduce_segments, Array, EngineConfig, FixedArray, Reduction};
///
/// let values = Array::from(FixedArray::from_i64(vec![10, 20, 5, 1, 2, 3]));
/// let out = reduce_segments(&values, &[0, 2, 3], Reduction::Sum, &EngineConfig::default())
///     .unwrap();
/// assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![30, 5, 6]));
/// ```
pub fn reduce_segments(
    values: &Array,
    segments: &[usize],
    op: Reduction,
    config: &EngineConfig,
) -> Result<Array> {
    reduce_with_origin(values, segments, None, op, config)
}

/// Segment reduction where `origin[pos]` is the original index of the value at
/// `pos`; used by `GroupBy` after permuting values.
pub(crate) fn reduce_with_origin(
    values: &Array,
    segments: &[usize],
    origin: Option<&[usize]>,
    op: Reduction,
    config: &EngineConfig,
) -> Result<Array> {
    let ranges = segment_ranges(segments, values.len())?;
    let _span = tracing::debug_span!(
        "aggregate",
        op = op.name(),
        len = values.len(),
        groups = ranges.len(),
        limbs = values.limb_count(),
    )
    .entered();

    match op {
        Reduction::Sum => sum(values, &ranges, config),
        Reduction::Prod => prod(values, &ranges, config),
        Reduction::Mean => Ok(mean(values, &ranges, config).into()),
        Reduction::Min => {
            let positions = extremes(values, &ranges, Ordering::Less, op, config)?;
            Ok(take(values, &positions))
        }
        Reduction::Max => {
            let positions = extremes(values, &ranges, Ordering::Greater, op, config)?;
            Ok(take(values, &positions))
        }
        Reduction::Argmin => {
            let positions = extremes(values, &ranges, Ordering::Less, op, config)?;
            Ok(original_indices(&positions, origin).into())
        }
        Reduction::Argmax => {
            let positions = extremes(values, &ranges, Ordering::Greater, op, config)?;
            Ok(original_indices(&positions, origin).into())
        }
        Reduction::Any | Reduction::All => {
            let words = match values {
                Array::Fixed(f) if f.kind() == ScalarKind::Bool => f.words(),
                other => {
                    return Err(LimbKitError::Type(format!(
                        "{} requires a bool array, got {}",
                        op,
                        other.dtype()
                    )));
                }
            };
            let out = if op == Reduction::Any {
                run(&BoolAny { words }, &ranges, config)
            } else {
                run(&BoolAll { words }, &ranges, config)
            };
            Ok(FixedArray::from_bool(out).into())
        }
        Reduction::Nunique => {
            let sets = run(&Distinct { values }, &ranges, config);
            let counts = sets
                .iter()
                .map(|set| i64::try_from(set.len()).unwrap_or(i64::MAX))
                .collect();
            Ok(FixedArray::from_i64(counts).into())
        }
        Reduction::First | Reduction::Last => {
            let positions = run(
                &Edge {
                    last: op == Reduction::Last,
                },
                &ranges,
                config,
            );
            Ok(take(values, &require_all(positions, op)?))
        }
    }
}

/// Per-piece accumulation with an associative merge.
trait Fold: Sync {
    type Acc: Send;

    /// Whether a segment may be split into one partial per partition.
    const SPLITTABLE: bool = true;

    fn empty(&self) -> Self::Acc;

    fn update(&self, acc: &mut Self::Acc, pos: usize);

    /// Merge two partials; `left` covers earlier positions than `right`.
    fn merge(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc;
}

fn fold_range<F: Fold>(fold: &F, range: Range<usize>, partition_len: usize) -> F::Acc {
    let partition_len = if F::SPLITTABLE {
        partition_len
    } else {
        usize::MAX
    };
    partition_pieces(range, partition_len)
        .into_iter()
        .fold(fold.empty(), |acc, piece| {
            let mut partial = fold.empty();
            for pos in piece {
                fold.update(&mut partial, pos);
            }
            fold.merge(acc, partial)
        })
}

fn run<F: Fold>(fold: &F, ranges: &[Range<usize>], config: &EngineConfig) -> Vec<F::Acc> {
    let partition_len = config.partition_len();
    #[cfg(feature = "parallel")]
    {
        if config.parallel() {
            use rayon::prelude::*;
            return ranges
                .par_iter()
                .map(|range| fold_range(fold, range.clone(), partition_len))
                .collect();
        }
    }
    ranges
        .iter()
        .map(|range| fold_range(fold, range.clone(), partition_len))
        .collect()
}

fn require_all(positions: Vec<Option<usize>>, op: Reduction) -> Result<Vec<usize>> {
    positions
        .into_iter()
        .map(|pos| pos.ok_or_else(|| LimbKitError::NoGroups(op.name().to_string())))
        .collect()
}

fn original_indices(positions: &[usize], origin: Option<&[usize]>) -> FixedArray {
    let indices = positions
        .iter()
        .map(|&pos| {
            let original = origin.and_then(|o| o.get(pos).copied()).unwrap_or(pos);
            i64::try_from(original).unwrap_or(i64::MAX)
        })
        .collect();
    FixedArray::from_i64(indices)
}

// ---------------------------------------------------------------------------
// sum / prod
// ---------------------------------------------------------------------------

struct WordSum<'a> {
    words: &'a [Limb],
}

impl Fold for WordSum<'_> {
    type Acc = Limb;

    fn empty(&self) -> Limb {
        0
    }

    fn update(&self, acc: &mut Limb, pos: usize) {
        if let Some(&w) = self.words.get(pos) {
            *acc = acc.wrapping_add(w);
        }
    }

    fn merge(&self, left: Limb, right: Limb) -> Limb {
        left.wrapping_add(right)
    }
}

struct WordProd<'a> {
    words: &'a [Limb],
}

impl Fold for WordProd<'_> {
    type Acc = Limb;

    fn empty(&self) -> Limb {
        1
    }

    fn update(&self, acc: &mut Limb, pos: usize) {
        if let Some(&w) = self.words.get(pos) {
            *acc = acc.wrapping_mul(w);
        }
    }

    fn merge(&self, left: Limb, right: Limb) -> Limb {
        left.wrapping_mul(right)
    }
}

struct FloatSum<'a> {
    words: &'a [Limb],
}

impl Fold for FloatSum<'_> {
    type Acc = f64;
    const SPLITTABLE: bool = false;

    fn empty(&self) -> f64 {
        0.0
    }

    fn update(&self, acc: &mut f64, pos: usize) {
        if let Some(&w) = self.words.get(pos) {
            *acc += f64::from_bits(w);
        }
    }

    fn merge(&self, left: f64, right: f64) -> f64 {
        left + right
    }
}

struct FloatProd<'a> {
    words: &'a [Limb],
}

impl Fold for FloatProd<'_> {
    type Acc = f64;
    const SPLITTABLE: bool = false;

    fn empty(&self) -> f64 {
        1.0
    }

    fn update(&self, acc: &mut f64, pos: usize) {
        if let Some(&w) = self.words.get(pos) {
            *acc *= f64::from_bits(w);
        }
    }

    fn merge(&self, left: f64, right: f64) -> f64 {
        left * right
    }
}

struct BigSum<'a> {
    array: &'a CompositeArray,
}

impl Fold for BigSum<'_> {
    type Acc = BigInt;

    fn empty(&self) -> BigInt {
        BigInt::zero()
    }

    fn update(&self, acc: &mut BigInt, pos: usize) {
        if let Some(v) = self.array.value_at(pos) {
            *acc += v;
        }
    }

    fn merge(&self, left: BigInt, right: BigInt) -> BigInt {
        left + right
    }
}

struct BigProd<'a> {
    array: &'a CompositeArray,
}

impl Fold for BigProd<'_> {
    type Acc = BigInt;

    fn empty(&self) -> BigInt {
        BigInt::one()
    }

    fn update(&self, acc: &mut BigInt, pos: usize) {
        if let Some(v) = self.array.value_at(pos) {
            *acc *= v;
        }
    }

    fn merge(&self, left: BigInt, right: BigInt) -> BigInt {
        left * right
    }
}

/// Integer sums wrap at 64 bits; bool sums count the true elements.
fn sum(values: &Array, ranges: &[Range<usize>], config: &EngineConfig) -> Result<Array> {
    match values {
        Array::Fixed(f) => Ok(match f.kind() {
            ScalarKind::Float64 => {
                FixedArray::from_f64(run(&FloatSum { words: f.words() }, ranges, config))
            }
            kind => FixedArray::from_words(
                promote_bool(kind),
                run(&WordSum { words: f.words() }, ranges, config),
            ),
        }
        .into()),
        Array::Composite(c) => {
            let sums = run(&BigSum { array: c }, ranges, config);
            Ok(CompositeArray::from_bigints_min(&sums, c.is_signed(), c.limb_count())?.into())
        }
    }
}

fn prod(values: &Array, ranges: &[Range<usize>], config: &EngineConfig) -> Result<Array> {
    match values {
        Array::Fixed(f) => Ok(match f.kind() {
            ScalarKind::Float64 => {
                FixedArray::from_f64(run(&FloatProd { words: f.words() }, ranges, config))
            }
            kind => FixedArray::from_words(
                promote_bool(kind),
                run(&WordProd { words: f.words() }, ranges, config),
            ),
        }
        .into()),
        Array::Composite(c) => {
            let prods = run(&BigProd { array: c }, ranges, config);
            Ok(CompositeArray::from_bigints_min(&prods, c.is_signed(), c.limb_count())?.into())
        }
    }
}

const fn promote_bool(kind: ScalarKind) -> ScalarKind {
    match kind {
        ScalarKind::Bool => ScalarKind::Int64,
        other => other,
    }
}

// ---------------------------------------------------------------------------
// mean
// ---------------------------------------------------------------------------

struct IntMean<'a> {
    words: &'a [Limb],
    signed: bool,
}

impl Fold for IntMean<'_> {
    type Acc = (i128, usize);

    fn empty(&self) -> (i128, usize) {
        (0, 0)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn update(&self, acc: &mut (i128, usize), pos: usize) {
        if let Some(&w) = self.words.get(pos) {
            let v = if self.signed {
                i128::from(w as i64)
            } else {
                i128::from(w)
            };
            acc.0 = acc.0.saturating_add(v);
            acc.1 = acc.1.saturating_add(1);
        }
    }

    fn merge(&self, left: (i128, usize), right: (i128, usize)) -> (i128, usize) {
        (left.0.saturating_add(right.0), left.1.saturating_add(right.1))
    }
}

struct FloatMean<'a> {
    words: &'a [Limb],
}

impl Fold for FloatMean<'_> {
    type Acc = (f64, usize);
    const SPLITTABLE: bool = false;

    fn empty(&self) -> (f64, usize) {
        (0.0, 0)
    }

    fn update(&self, acc: &mut (f64, usize), pos: usize) {
        if let Some(&w) = self.words.get(pos) {
            acc.0 += f64::from_bits(w);
            acc.1 = acc.1.saturating_add(1);
        }
    }

    fn merge(&self, left: (f64, usize), right: (f64, usize)) -> (f64, usize) {
        (left.0 + right.0, left.1.saturating_add(right.1))
    }
}

struct BigMean<'a> {
    array: &'a CompositeArray,
}

impl Fold for BigMean<'_> {
    type Acc = (BigInt, usize);

    fn empty(&self) -> (BigInt, usize) {
        (BigInt::zero(), 0)
    }

    fn update(&self, acc: &mut (BigInt, usize), pos: usize) {
        if let Some(v) = self.array.value_at(pos) {
            acc.0 += v;
            acc.1 = acc.1.saturating_add(1);
        }
    }

    fn merge(&self, left: (BigInt, usize), right: (BigInt, usize)) -> (BigInt, usize) {
        (left.0 + right.0, left.1.saturating_add(right.1))
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &Array, ranges: &[Range<usize>], config: &EngineConfig) -> FixedArray {
    let means: Vec<f64> = match values {
        Array::Fixed(f) if f.kind() == ScalarKind::Float64 => {
            run(&FloatMean { words: f.words() }, ranges, config)
                .into_iter()
                .map(|(total, count)| total / count as f64)
                .collect()
        }
        Array::Fixed(f) => run(
            &IntMean {
                words: f.words(),
                signed: f.kind() == ScalarKind::Int64,
            },
            ranges,
            config,
        )
        .into_iter()
        .map(|(total, count)| total as f64 / count as f64)
        .collect(),
        Array::Composite(c) => run(&BigMean { array: c }, ranges, config)
            .into_iter()
            .map(|(total, count)| total.to_f64().unwrap_or(f64::NAN) / count as f64)
            .collect(),
    };
    FixedArray::from_f64(means)
}

// ---------------------------------------------------------------------------
// min / max / argmin / argmax
// ---------------------------------------------------------------------------

/// Tracks the position of the best element; earlier positions win ties.
struct Extreme<'a> {
    values: &'a Array,
    want: Ordering,
    float: Option<&'a [Limb]>,
}

impl Extreme<'_> {
    /// Whether the element at `candidate` strictly beats the one at `current`.
    ///
    /// NaN never beats a number, and any number beats NaN.
    fn beats(&self, candidate: usize, current: usize) -> bool {
        match self.float {
            Some(words) => {
                let a = words.get(candidate).map_or(f64::NAN, |&w| f64::from_bits(w));
                let b = words.get(current).map_or(f64::NAN, |&w| f64::from_bits(w));
                match (a.is_nan(), b.is_nan()) {
                    (true, _) => false,
                    (false, true) => true,
                    (false, false) => a.partial_cmp(&b) == Some(self.want),
                }
            }
            None => self.values.cmp_at(candidate, current) == self.want,
        }
    }
}

impl Fold for Extreme<'_> {
    type Acc = Option<usize>;

    fn empty(&self) -> Option<usize> {
        None
    }

    fn update(&self, acc: &mut Option<usize>, pos: usize) {
        match *acc {
            Some(current) if !self.beats(pos, current) => {}
            _ => *acc = Some(pos),
        }
    }

    fn merge(&self, left: Option<usize>, right: Option<usize>) -> Option<usize> {
        match (left, right) {
            (Some(l), Some(r)) if self.beats(r, l) => Some(r),
            (l, r) => l.or(r),
        }
    }
}

fn extremes(
    values: &Array,
    ranges: &[Range<usize>],
    want: Ordering,
    op: Reduction,
    config: &EngineConfig,
) -> Result<Vec<usize>> {
    let float = values
        .as_fixed()
        .filter(|f| f.kind() == ScalarKind::Float64)
        .map(FixedArray::words);
    let positions = run(
        &Extreme {
            values,
            want,
            float,
        },
        ranges,
        config,
    );
    require_all(positions, op)
}

// ---------------------------------------------------------------------------
// any / all / nunique / first / last
// ---------------------------------------------------------------------------

struct BoolAny<'a> {
    words: &'a [Limb],
}

impl Fold for BoolAny<'_> {
    type Acc = bool;

    fn empty(&self) -> bool {
        false
    }

    fn update(&self, acc: &mut bool, pos: usize) {
        *acc = *acc || self.words.get(pos).is_some_and(|&w| w != 0);
    }

    fn merge(&self, left: bool, right: bool) -> bool {
        left || right
    }
}

struct BoolAll<'a> {
    words: &'a [Limb],
}

impl Fold for BoolAll<'_> {
    type Acc = bool;

    fn empty(&self) -> bool {
        true
    }

    fn update(&self, acc: &mut bool, pos: usize) {
        *acc = *acc && self.words.get(pos).is_some_and(|&w| w != 0);
    }

    fn merge(&self, left: bool, right: bool) -> bool {
        left && right
    }
}

struct Distinct<'a> {
    values: &'a Array,
}

impl Distinct<'_> {
    /// Identity of an element for counting: limbs for integers, a canonical
    /// bit pattern for floats (all NaNs are one value, `-0.0 == 0.0`).
    fn key(&self, pos: usize) -> Option<Vec<Limb>> {
        match self.values {
            Array::Fixed(f) => {
                let word = *f.words().get(pos)?;
                let word = if f.kind() == ScalarKind::Float64 {
                    canonical_float_bits(word)
                } else {
                    word
                };
                Some(vec![word])
            }
            Array::Composite(c) => c.element(pos),
        }
    }
}

impl Fold for Distinct<'_> {
    type Acc = HashSet<Vec<Limb>>;

    fn empty(&self) -> Self::Acc {
        HashSet::new()
    }

    fn update(&self, acc: &mut Self::Acc, pos: usize) {
        if let Some(key) = self.key(pos) {
            let _ = acc.insert(key);
        }
    }

    fn merge(&self, mut left: Self::Acc, right: Self::Acc) -> Self::Acc {
        left.extend(right);
        left
    }
}

struct Edge {
    last: bool,
}

impl Fold for Edge {
    type Acc = Option<usize>;

    fn empty(&self) -> Option<usize> {
        None
    }

    fn update(&self, acc: &mut Option<usize>, pos: usize) {
        if self.last || acc.is_none() {
            *acc = Some(pos);
        }
    }

    fn merge(&self, left: Option<usize>, right: Option<usize>) -> Option<usize> {
        if self.last {
            right.or(left)
        } else {
            left.or(right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn ints(v: Vec<i64>) -> Array {
        FixedArray::from_i64(v).into()
    }

    fn reduce(values: &Array, segments: &[usize], op: Reduction) -> Result<Array> {
        reduce_segments(values, segments, op, &EngineConfig::default())
    }

    #[test]
    fn test_parse_every_reduction() {
        for op in Reduction::ALL {
            assert_eq!(op.name().parse::<Reduction>(), Ok(op));
            assert_eq!(op.to_string(), op.name());
        }
        assert!(matches!(
            "SUM".parse::<Reduction>(),
            Err(LimbKitError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_sum_wraps_int64() {
        let out = reduce(&ints(vec![i64::MAX, 1]), &[0], Reduction::Sum).unwrap();
        assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![i64::MIN]));
    }

    #[test]
    fn test_empty_segment_identities() {
        let values = ints(vec![4, 5]);
        let segments = [0, 0, 2];
        let sum = reduce(&values, &segments, Reduction::Sum).unwrap();
        assert_eq!(sum.as_fixed().unwrap().as_i64(), Some(vec![0, 9, 0]));
        let prod = reduce(&values, &segments, Reduction::Prod).unwrap();
        assert_eq!(prod.as_fixed().unwrap().as_i64(), Some(vec![1, 20, 1]));
        let nunique = reduce(&values, &segments, Reduction::Nunique).unwrap();
        assert_eq!(nunique.as_fixed().unwrap().as_i64(), Some(vec![0, 2, 0]));

        let mean = reduce(&values, &segments, Reduction::Mean).unwrap();
        let mean = mean.as_fixed().unwrap().as_f64().unwrap();
        assert!(mean[0].is_nan());
        assert_eq!(mean[1], 4.5);

        for op in [
            Reduction::Min,
            Reduction::Max,
            Reduction::Argmin,
            Reduction::Argmax,
            Reduction::First,
            Reduction::Last,
        ] {
            assert!(matches!(
                reduce(&values, &segments, op),
                Err(LimbKitError::NoGroups(_))
            ));
        }
    }

    #[test]
    fn test_bool_identities() {
        let values: Array = FixedArray::from_bool(vec![true, false]).into();
        let any = reduce(&values, &[0, 0], Reduction::Any).unwrap();
        assert_eq!(any.as_fixed().unwrap().as_bool(), Some(vec![false, true]));
        let all = reduce(&values, &[0, 0], Reduction::All).unwrap();
        assert_eq!(all.as_fixed().unwrap().as_bool(), Some(vec![true, false]));
    }

    #[test]
    fn test_any_rejects_non_bool() {
        assert!(matches!(
            reduce(&ints(vec![1]), &[0], Reduction::Any),
            Err(LimbKitError::Type(_))
        ));
        let big: Array = CompositeArray::zeros(1, 2, false).unwrap().into();
        assert!(matches!(
            reduce(&big, &[0], Reduction::All),
            Err(LimbKitError::Type(_))
        ));
    }

    #[test]
    fn test_argmin_first_occurrence_across_partitions() {
        let values = ints(vec![3, 1, 2, 1, 1]);
        for partition_len in [1, 2, 3, 1024] {
            let config = EngineConfig::new(partition_len, false).unwrap();
            let out = reduce_segments(&values, &[0], Reduction::Argmin, &config).unwrap();
            assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![1]));
            let out = reduce_segments(&values, &[0], Reduction::Argmax, &config).unwrap();
            assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![0]));
        }
    }

    #[test]
    fn test_float_min_max_skip_nan() {
        let values: Array = FixedArray::from_f64(vec![f64::NAN, 2.0, -1.0, f64::NAN]).into();
        let min = reduce(&values, &[0], Reduction::Min).unwrap();
        assert_eq!(min.as_fixed().unwrap().as_f64(), Some(vec![-1.0]));
        let argmax = reduce(&values, &[0], Reduction::Argmax).unwrap();
        assert_eq!(argmax.as_fixed().unwrap().as_i64(), Some(vec![1]));

        let all_nan: Array = FixedArray::from_f64(vec![f64::NAN]).into();
        let max = reduce(&all_nan, &[0], Reduction::Max).unwrap();
        assert!(max.as_fixed().unwrap().as_f64().unwrap()[0].is_nan());
    }

    #[test]
    fn test_nunique_float_canonical() {
        let values: Array = FixedArray::from_f64(vec![0.0, -0.0, f64::NAN, f64::NAN, 1.0]).into();
        let out = reduce(&values, &[0], Reduction::Nunique).unwrap();
        assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![3]));
    }

    #[test]
    fn test_bool_sum_counts() {
        let values: Array = FixedArray::from_bool(vec![true, true, false]).into();
        let out = reduce(&values, &[0], Reduction::Sum).unwrap();
        assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![2]));
        let out = reduce(&values, &[0], Reduction::Min).unwrap();
        assert_eq!(out.as_fixed().unwrap().as_bool(), Some(vec![false]));
    }

    #[test]
    fn test_composite_sum_grows_instead_of_truncating() {
        let values: Array = CompositeArray::build(&[FixedArray::from_u64(vec![u64::MAX, u64::MAX])])
            .unwrap()
            .into();
        let out = reduce(&values, &[0], Reduction::Sum).unwrap();
        assert_eq!(out.limb_count(), 2);
        assert_eq!(
            out.materialize(),
            vec![Scalar::Big(BigInt::from(u64::MAX) * 2u32)]
        );
    }

    #[test]
    fn test_composite_min_first_last() {
        let c = CompositeArray::from_bigints(
            &[BigInt::from(-7), BigInt::from(1u128 << 80), BigInt::from(3)],
            true,
        )
        .unwrap();
        let values: Array = c.into();
        let min = reduce(&values, &[0], Reduction::Min).unwrap();
        assert_eq!(min.materialize(), vec![Scalar::Big(BigInt::from(-7))]);
        let max = reduce(&values, &[0], Reduction::Max).unwrap();
        assert_eq!(max.materialize(), vec![Scalar::Big(BigInt::from(1u128 << 80))]);
        let last = reduce(&values, &[0, 1], Reduction::Last).unwrap();
        assert_eq!(
            last.materialize(),
            vec![Scalar::Big(BigInt::from(-7)), Scalar::Big(BigInt::from(3))]
        );
        let mean = reduce(&values, &[0], Reduction::Mean).unwrap();
        let expected = ((1u128 << 80) as f64 - 4.0) / 3.0;
        assert_eq!(mean.as_fixed().unwrap().as_f64(), Some(vec![expected]));
    }

    #[test]
    fn test_malformed_segments() {
        assert!(matches!(
            reduce(&ints(vec![1, 2]), &[0, 3], Reduction::Sum),
            Err(LimbKitError::Shape(_))
        ));
    }
}
