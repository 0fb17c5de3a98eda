//! LimbKit - grouped reductions over multi-limb integer arrays
//!
//! A Rust implementation of an array engine for fixed-width and
//! arbitrary-precision integer columns, with a reusable GroupBy, a closed set
//! of segment reductions, and atomic gather/scatter permutations.
//!
//! ## Overview
//!
//! Arbitrary-precision values are stored as a [`CompositeArray`]: `k` parallel
//! `u64` limb arrays, most significant first, plus a signedness flag. Every
//! operation moves all limbs of an element together, so values are never torn
//! across a permutation. Fixed-width columns (`int64`, `uint64`, `float64`,
//! `bool`) are a [`FixedArray`]; both live behind the closed [`Array`] enum.
//!
//! ## Key Features
//!
//! - **Composite arrays**: build from limb arrays, cast from `int64`, resize
//!   without losing a value, compare numerically across widths and signedness
//! - **Permutations**: [`gather`] and [`scatter`] with bounds checks that run
//!   before any write
//! - **GroupBy**: stable multi-key grouping, reused across aggregations
//! - **Reductions**: `sum`, `prod`, `mean`, `min`, `max`, `argmin`, `argmax`,
//!   `any`, `all`, `nunique`, `first`, `last`, partition-invariant
//! - **Engine**: handle-based arena for callers that should not hold references
//!
//! ## Quick Start
//!
//! ```rust
//! use limbkit::{gather, Array, CompositeArray, FixedArray, GroupBy, Reduction, Scalar};
//! use num_bigint::BigInt;
//!
//! // Two-limb unsigned values: (hi << 64) | lo
//! let hi = FixedArray::from_u64(vec![0, 1, 0]);
//! let lo = FixedArray::from_u64(vec![5, 0, 7]);
//! let big = Array::from(CompositeArray::build(&[hi, lo]).unwrap());
//!
//! // Reverse it
//! let rev = Array::from(FixedArray::from_i64(vec![2, 1, 0]));
//! let reversed = gather(&big, &rev).unwrap();
//! assert_eq!(reversed.materialize()[1], Scalar::Big(BigInt::from(1u128 << 64)));
//!
//! // Group and sum
//! let keys = Array::from(FixedArray::from_i64(vec![1, 2, 1]));
//! let g = GroupBy::new(&[&keys], false).unwrap();
//! let sums = g.aggregate(&big, Reduction::Sum).unwrap();
//! assert_eq!(
//!     sums.materialize(),
//!     vec![Scalar::Big(BigInt::from(12)), Scalar::Big(BigInt::from(1u128 << 64))]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`limb`]: limb-level value model and conversions
//! - [`composite`]: multi-limb integer arrays
//! - [`array`]: fixed-width arrays and the [`Array`] variant
//! - [`permute`]: gather and scatter
//! - [`groupby`]: grouping by key tuples
//! - [`aggregate`]: segment reductions
//! - [`engine`]: handle-based operation boundary
//! - [`config`]: engine configuration
//! - [`value`]: materialized scalars
//! - [`error`]: error types
//! - [`util`]: index and segment validation helpers

pub mod aggregate;
pub mod array;
pub mod composite;
pub mod config;
pub mod engine;
pub mod error;
pub mod groupby;
pub mod limb;
pub mod permute;
pub mod util;
pub mod value;

// Re-export public API
pub use aggregate::{Reduction, reduce_segments};
pub use array::{Array, FixedArray, ScalarKind};
pub use composite::CompositeArray;
pub use config::{DEFAULT_PARTITION_LEN, EngineConfig};
pub use engine::{ArrayHandle, Engine, GroupByHandle};
pub use error::{LimbKitError, Result};
pub use groupby::GroupBy;
pub use limb::{LIMB_BITS, Limb};
pub use permute::{gather, scatter};
pub use value::Scalar;

/// Group by `keys` and reduce `values` in one call.
///
/// This is a convenience wrapper around [`GroupBy::new`] and
/// [`GroupBy::aggregate`] for a single aggregation. Build the [`GroupBy`]
/// directly to reuse the grouping.
///
/// # Errors
///
/// - [`LimbKitError::Shape`] for no keys or mismatched lengths
/// - [`LimbKitError::Type`] for `any`/`all` over a non-bool array
///
/// # Examples
///
/// ```rust
/// use limbkit::{groupby_aggregate, Array, FixedArray, Reduction};
///
/// let keys = Array::from(FixedArray::from_i64(vec![3, 1, 3]));
/// let vals = Array::from(FixedArray::from_i64(vec![1, 2, 4]));
/// let (unique, out) = groupby_aggregate(&[&keys], &vals, Reduction::Max).unwrap();
/// assert_eq!(unique[0].as_fixed().unwrap().as_i64(), Some(vec![1, 3]));
/// assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![2, 4]));
/// ```
pub fn groupby_aggregate(
    keys: &[&Array],
    values: &Array,
    op: Reduction,
) -> Result<(Vec<Array>, Array)> {
    let grouping = GroupBy::new(keys, false)?;
    let reduced = grouping.aggregate(values, op)?;
    Ok((grouping.unique_keys().to_vec(), reduced))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groupby_aggregate() {
        let keys = Array::from(FixedArray::from_i64(vec![1, 1, 2, 3, 3, 3]));
        let vals = Array::from(FixedArray::from_i64(vec![10, 20, 5, 1, 2, 3]));
        let (unique, sums) = groupby_aggregate(&[&keys], &vals, Reduction::Sum).unwrap();
        assert_eq!(unique[0].as_fixed().unwrap().as_i64(), Some(vec![1, 2, 3]));
        assert_eq!(sums.as_fixed().unwrap().as_i64(), Some(vec![30, 5, 6]));
    }

    #[test]
    fn test_groupby_aggregate_no_keys() {
        let vals = Array::from(FixedArray::from_i64(vec![1]));
        assert!(matches!(
            groupby_aggregate(&[], &vals, Reduction::Sum),
            Err(LimbKitError::Shape(_))
        ));
    }

    #[test]
    fn test_reexports() {
        assert_eq!(LIMB_BITS, 64);
        assert_eq!(DEFAULT_PARTITION_LEN, 1024);
        let _: Limb = 0;
    }
}
