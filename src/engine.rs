//! Handle-based operation boundary.
//!
//! This module provides the [`Engine`], which owns every array and grouping a
//! client creates and hands out copyable [`ArrayHandle`] / [`GroupByHandle`]
//! indices instead of references. Each operation resolves its handles, calls
//! into the array, permutation, grouping or reduction layer, and stores the
//! result under a fresh handle.
use crate::aggregate::Reduction;
use crate::array::{Array, FixedArray};
use crate::composite::CompositeArray;
use crate::config::EngineConfig;
use crate::error::{LimbKitError, Result};
use crate::groupby::GroupBy;
use crate::permute;
use crate::value::Scalar;

/// Index of an array owned by an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayHandle(usize);

impl ArrayHandle {
    /// Raw arena slot.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a grouping owned by an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupByHandle(usize);

impl GroupByHandle {
    /// Raw arena slot.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Arena of arrays and groupings addressed by handle.
///
/// Released slots are never reused, so a stale handle always fails with
/// [`LimbKitError::UnknownHandle`] rather than aliasing a newer array.
///
/// # Examples
///
/// ```rust
/// use limbkit::{Array, Engine, FixedArray, Scalar};
///
/// let mut engine = Engine::new();
/// let keys = engine.put(Array::from(FixedArray::from_i64(vec![1, 1, 2])));
/// let vals = engine.put(Array::from(FixedArray::from_i64(vec![4, 5, 6])));
///
/// let g = engine.groupby(&[keys], true).unwrap();
/// let sums = engine.aggregate(g, vals, "sum").unwrap();
/// assert_eq!(
///     engine.materialize(sums).unwrap(),
///     vec![Scalar::Int(9), Scalar::Int(6)]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    arrays: Vec<Option<Array>>,
    groupings: Vec<Option<GroupBy>>,
}

impl Engine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            arrays: Vec::new(),
            groupings: Vec::new(),
        }
    }

    /// The configuration used for aggregation.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of live arrays.
    pub fn len(&self) -> usize {
        self.arrays.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no arrays are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take ownership of `array` and return its handle.
    pub fn put(&mut self, array: Array) -> ArrayHandle {
        self.arrays.push(Some(array));
        ArrayHandle(self.arrays.len().saturating_sub(1))
    }

    /// Borrow the array behind `handle`.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] if the handle was never issued or was released
    pub fn get(&self, handle: ArrayHandle) -> Result<&Array> {
        self.arrays
            .get(handle.0)
            .and_then(Option::as_ref)
            .ok_or(LimbKitError::UnknownHandle(handle.0))
    }

    /// Borrow the grouping behind `handle`.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] if the handle was never issued or was released
    pub fn grouping(&self, handle: GroupByHandle) -> Result<&GroupBy> {
        self.groupings
            .get(handle.0)
            .and_then(Option::as_ref)
            .ok_or(LimbKitError::UnknownHandle(handle.0))
    }

    /// Drop the array behind `handle` and return it.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] if the handle is not live
    pub fn release(&mut self, handle: ArrayHandle) -> Result<Array> {
        tracing::trace!(handle = handle.0, "release array");
        self.take_array(handle)
    }

    /// Drop the grouping behind `handle`.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] if the handle is not live
    pub fn release_groupby(&mut self, handle: GroupByHandle) -> Result<GroupBy> {
        self.groupings
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or(LimbKitError::UnknownHandle(handle.0))
    }

    /// Compose a composite array from UInt64 limb arrays, most significant first.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Type`] if any input is not a UInt64 fixed array
    /// - [`LimbKitError::Shape`] for no inputs or unequal lengths
    pub fn build_composite(&mut self, limb_arrays: &[ArrayHandle]) -> Result<ArrayHandle> {
        let _span =
            tracing::debug_span!("engine.build_composite", limbs = limb_arrays.len()).entered();
        let fixed = limb_arrays
            .iter()
            .map(|&handle| match self.get(handle)? {
                Array::Fixed(a) => Ok(a.clone()),
                Array::Composite(_) => Err(LimbKitError::Type(
                    "limb arrays must be uint64, got bigint".to_string(),
                )),
            })
            .collect::<Result<Vec<FixedArray>>>()?;
        let built = CompositeArray::build(&fixed)?;
        Ok(self.put(built.into()))
    }

    /// Reinterpret an Int64 array as a signed one-limb composite array.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Type`] if the input is not an Int64 fixed array
    pub fn cast_from_signed(&mut self, values: ArrayHandle) -> Result<ArrayHandle> {
        let _span = tracing::debug_span!("engine.cast_from_signed", handle = values.0).entered();
        let cast = match self.get(values)? {
            Array::Fixed(a) => CompositeArray::cast_from_signed(a)?,
            Array::Composite(_) => {
                return Err(LimbKitError::Type(
                    "cast_from_signed expects int64, got bigint".to_string(),
                ));
            }
        };
        Ok(self.put(cast.into()))
    }

    /// Re-express a composite array with `new_k` limbs, preserving every value.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Type`] if the input is not a composite array
    /// - [`LimbKitError::Shape`] if `new_k` is 0
    /// - [`LimbKitError::PrecisionLoss`] if a value does not fit `new_k` limbs
    pub fn resize(&mut self, array: ArrayHandle, new_k: usize) -> Result<ArrayHandle> {
        let _span =
            tracing::debug_span!("engine.resize", handle = array.0, new_k = new_k).entered();
        let resized = self.composite(array, "resize")?.resize(new_k)?;
        Ok(self.put(resized.into()))
    }

    /// All-zero composite array of `n` elements and `k` limbs.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if `k` is 0
    pub fn zeros(&mut self, n: usize, k: usize, signed: bool) -> Result<ArrayHandle> {
        let zeros = CompositeArray::zeros(n, k, signed)?;
        Ok(self.put(zeros.into()))
    }

    /// Composite array shaped like `array`, every value 1.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Type`] if the input is not a composite array
    pub fn ones_like(&mut self, array: ArrayHandle) -> Result<ArrayHandle> {
        let ones = self.composite(array, "ones_like")?.ones_like();
        Ok(self.put(ones.into()))
    }

    /// Whole-array replacement `target[:] = source`.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Type`] if either side is not a composite array
    /// - [`LimbKitError::Shape`] if the lengths differ
    pub fn assign(&mut self, target: ArrayHandle, source: ArrayHandle) -> Result<()> {
        let _span =
            tracing::debug_span!("engine.assign", target = target.0, source = source.0).entered();
        let source = self.composite(source, "assign")?.clone();
        match self
            .arrays
            .get_mut(target.0)
            .and_then(Option::as_mut)
            .ok_or(LimbKitError::UnknownHandle(target.0))?
        {
            Array::Composite(t) => t.assign(&source),
            Array::Fixed(t) => Err(LimbKitError::Type(format!(
                "assign expects a bigint target, got {}",
                t.kind()
            ))),
        }
    }

    /// Element-wise equality as a new Bool array.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Shape`] if the lengths differ
    /// - [`LimbKitError::Type`] if the kinds cannot be compared
    pub fn equals(&mut self, a: ArrayHandle, b: ArrayHandle) -> Result<ArrayHandle> {
        let _span = tracing::debug_span!("engine.equals", a = a.0, b = b.0).entered();
        let eq = self.get(a)?.equals(self.get(b)?)?;
        Ok(self.put(eq.into()))
    }

    /// Build a grouping over one or more key arrays.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::Shape`] for no keys or unequal lengths
    pub fn groupby(&mut self, keys: &[ArrayHandle], assume_sorted: bool) -> Result<GroupByHandle> {
        let _span = tracing::debug_span!("engine.groupby", keys = keys.len()).entered();
        let resolved = keys
            .iter()
            .map(|&handle| self.get(handle))
            .collect::<Result<Vec<&Array>>>()?;
        let grouping = GroupBy::new(&resolved, assume_sorted)?;
        self.groupings.push(Some(grouping));
        Ok(GroupByHandle(self.groupings.len().saturating_sub(1)))
    }

    /// Reduce `values` per group with the named reduction.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - [`LimbKitError::UnsupportedOperation`] for an unknown reduction name
    /// - any error of [`GroupBy::aggregate_with`]
    pub fn aggregate(
        &mut self,
        grouping: GroupByHandle,
        values: ArrayHandle,
        op: &str,
    ) -> Result<ArrayHandle> {
        let _span = tracing::debug_span!(
            "engine.aggregate",
            grouping = grouping.0,
            values = values.0,
            op = op
        )
        .entered();
        let op: Reduction = op.parse()?;
        let result = self
            .grouping(grouping)?
            .aggregate_with(self.get(values)?, op, &self.config)?;
        Ok(self.put(result))
    }

    /// `result[i] = array[indices[i]]` as a new array.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - any error of [`permute::gather`]
    pub fn gather(&mut self, array: ArrayHandle, indices: ArrayHandle) -> Result<ArrayHandle> {
        let _span =
            tracing::debug_span!("engine.gather", array = array.0, indices = indices.0).entered();
        let gathered = permute::gather(self.get(array)?, self.get(indices)?)?;
        Ok(self.put(gathered))
    }

    /// `target[indices[i]] = values[i]` in place; returns `target`.
    ///
    /// `indices` or `values` may name the target itself; they are read as
    /// they were before the call.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    /// - any error of [`permute::scatter`]; the target is unchanged on error
    pub fn scatter(
        &mut self,
        target: ArrayHandle,
        indices: ArrayHandle,
        values: ArrayHandle,
    ) -> Result<ArrayHandle> {
        let _span = tracing::debug_span!(
            "engine.scatter",
            target = target.0,
            indices = indices.0,
            values = values.0
        )
        .entered();
        // Stale operands must not cost the target its slot.
        let _ = self.get(indices)?;
        let _ = self.get(values)?;

        let mut array = self.take_array(target)?;
        let snapshot = (indices == target || values == target).then(|| array.clone());
        let outcome = self.resolve(indices, target, snapshot.as_ref()).and_then(|idx| {
            let vals = self.resolve(values, target, snapshot.as_ref())?;
            permute::scatter(&mut array, idx, vals)
        });
        if let Some(slot) = self.arrays.get_mut(target.0) {
            *slot = Some(array);
        }
        outcome.map(|()| target)
    }

    /// Exact element values of the array behind `handle`.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::UnknownHandle`] for a stale handle
    pub fn materialize(&self, handle: ArrayHandle) -> Result<Vec<Scalar>> {
        let _span = tracing::debug_span!("engine.materialize", handle = handle.0).entered();
        Ok(self.get(handle)?.materialize())
    }

    fn composite(&self, handle: ArrayHandle, op: &str) -> Result<&CompositeArray> {
        match self.get(handle)? {
            Array::Composite(c) => Ok(c),
            Array::Fixed(f) => Err(LimbKitError::Type(format!(
                "{} expects a bigint array, got {}",
                op,
                f.kind()
            ))),
        }
    }

    fn take_array(&mut self, handle: ArrayHandle) -> Result<Array> {
        self.arrays
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or(LimbKitError::UnknownHandle(handle.0))
    }

    fn resolve<'a>(
        &'a self,
        handle: ArrayHandle,
        target: ArrayHandle,
        snapshot: Option<&'a Array>,
    ) -> Result<&'a Array> {
        if handle == target {
            snapshot.ok_or(LimbKitError::UnknownHandle(handle.0))
        } else {
            self.get(handle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_build_resize_materialize() {
        let mut engine = Engine::new();
        let hi = engine.put(FixedArray::from_u64(vec![0, 1]).into());
        let lo = engine.put(FixedArray::from_u64(vec![7, 0]).into());
        let big = engine.build_composite(&[hi, lo]).unwrap();
        let wide = engine.resize(big, 4).unwrap();
        assert_eq!(engine.get(wide).unwrap().limb_count(), 4);
        assert_eq!(
            engine.materialize(wide).unwrap(),
            vec![Scalar::Big(BigInt::from(7)), Scalar::Big(BigInt::from(1u128 << 64))]
        );
        assert_eq!(engine.len(), 4);
    }

    #[test]
    fn test_unknown_handle_after_release() {
        let mut engine = Engine::new();
        let a = engine.put(FixedArray::from_i64(vec![1]).into());
        let _ = engine.release(a).unwrap();
        assert_eq!(engine.get(a), Err(LimbKitError::UnknownHandle(0)));
        assert_eq!(engine.materialize(a), Err(LimbKitError::UnknownHandle(0)));
        assert!(engine.is_empty());
        // New arrays get fresh slots.
        let b = engine.put(FixedArray::from_i64(vec![2]).into());
        assert_ne!(a, b);
    }

    #[test]
    fn test_scatter_self_alias() {
        let mut engine = Engine::new();
        let a = engine.put(FixedArray::from_i64(vec![2, 0, 1]).into());
        let out = engine.scatter(a, a, a).unwrap();
        assert_eq!(out, a);
        // target[2] = 2, target[0] = 0, target[1] = 1
        assert_eq!(
            engine.get(a).unwrap().as_fixed().unwrap().as_i64(),
            Some(vec![0, 1, 2])
        );
    }

    #[test]
    fn test_scatter_stale_operand_keeps_target() {
        let mut engine = Engine::new();
        let t = engine.put(FixedArray::from_i64(vec![1, 2]).into());
        let idx = engine.put(FixedArray::from_i64(vec![0]).into());
        let _ = engine.release(idx).unwrap();
        assert!(engine.scatter(t, idx, t).is_err());
        assert!(engine.get(t).is_ok());
    }

    #[test]
    fn test_assign_changes_limb_count() {
        let mut engine = Engine::new();
        let wide = engine.zeros(3, 4, false).unwrap();
        let narrow = engine.zeros(3, 1, false).unwrap();
        let ones = engine.ones_like(narrow).unwrap();
        engine.assign(wide, ones).unwrap();
        assert_eq!(engine.get(wide).unwrap().limb_count(), 1);
        let eq = engine.equals(wide, ones).unwrap();
        assert_eq!(
            engine.get(eq).unwrap().as_fixed().unwrap().as_bool(),
            Some(vec![true; 3])
        );
    }

    #[test]
    fn test_type_errors() {
        let mut engine = Engine::new();
        let ints = engine.put(FixedArray::from_i64(vec![1]).into());
        assert!(matches!(engine.resize(ints, 2), Err(LimbKitError::Type(_))));
        assert!(matches!(engine.build_composite(&[ints]), Err(LimbKitError::Type(_))));
        let big = engine.cast_from_signed(ints).unwrap();
        assert!(matches!(engine.cast_from_signed(big), Err(LimbKitError::Type(_))));
        assert!(matches!(engine.assign(ints, big), Err(LimbKitError::Type(_))));
    }

    #[test]
    fn test_aggregate_with_config() {
        let mut engine = Engine::with_config(EngineConfig::new(1, false).unwrap());
        let keys = engine.put(FixedArray::from_i64(vec![0, 0, 0]).into());
        let vals = engine.put(FixedArray::from_bool(vec![false, true, false]).into());
        let g = engine.groupby(&[keys], true).unwrap();
        let any = engine.aggregate(g, vals, "any").unwrap();
        assert_eq!(engine.materialize(any).unwrap(), vec![Scalar::Bool(true)]);
        assert!(matches!(
            engine.aggregate(g, vals, "median"),
            Err(LimbKitError::UnsupportedOperation(_))
        ));
        let _ = engine.release_groupby(g).unwrap();
        assert!(matches!(
            engine.aggregate(g, vals, "all"),
            Err(LimbKitError::UnknownHandle(_))
        ));
    }
}
