//! Permutation engine: `gather` and `scatter`.
//!
//! Both primitives treat a composite array's limbs as one unit per index: every
//! limb array is read (or written) with the same positions in the same pass, so
//! no result ever mixes limbs that came from different source elements.
use crate::array::{Array, FixedArray};
use crate::composite::CompositeArray;
use crate::error::{LimbKitError, Result};
use crate::limb::Limb;
use crate::util::checked_positions;

/// Read-indexed reordering: `result[i] = a[indices[i]]`.
///
/// The result has the variant, kind, limb count and signedness of `a`.
///
/// # Errors
///
/// - [`LimbKitError::Type`] if `indices` is not an `Int64`/`UInt64` array
/// - [`LimbKitError::IndexOutOfBounds`] if any index is outside `[0, a.len())`
///
/// # Examples
///
/// ```rust
/// use limbkit::{gather, Array, FixedArray};
///
/// let a = Array::from(FixedArray::from_i64(vec![10, 20, 30]));
/// let idx = Array::from(FixedArray::from_i64(vec![2, 2, 0]));
/// let out = gather(&a, &idx).unwrap();
/// assert_eq!(out.as_fixed().unwrap().as_i64(), Some(vec![30, 30, 10]));
/// ```
pub fn gather(a: &Array, indices: &Array) -> Result<Array> {
    let positions = checked_positions(indices, a.len())?;
    let _span = tracing::debug_span!(
        "gather",
        len = a.len(),
        indices = positions.len(),
        limbs = a.limb_count(),
    )
    .entered();
    Ok(take(a, &positions))
}

/// Gather at pre-validated positions.
pub(crate) fn take(a: &Array, positions: &[usize]) -> Array {
    match a {
        Array::Fixed(f) => {
            Array::Fixed(FixedArray::from_words(f.kind(), take_words(f.words(), positions)))
        }
        Array::Composite(c) => {
            let limbs = c
                .limbs()
                .iter()
                .map(|column| take_words(column, positions))
                .collect();
            Array::Composite(CompositeArray::from_parts(limbs, c.is_signed()))
        }
    }
}

fn take_words(words: &[Limb], positions: &[usize]) -> Vec<Limb> {
    positions
        .iter()
        .map(|&pos| words.get(pos).copied().unwrap_or(0))
        .collect()
}

/// Write-indexed reordering in place: `target[indices[i]] = values[i]`.
///
/// Writes happen in index order, so with duplicate indices the value at the
/// later position wins. Every check runs before the first write; on error the
/// target is unchanged.
///
/// Composite targets accept composite or integer fixed values of the same
/// signedness (`Int64` counts as signed, `UInt64` as unsigned). Values are
/// resized to the target's limb count first, which fails if any value does
/// not fit.
///
/// # Errors
///
/// - [`LimbKitError::Shape`] if `indices` and `values` differ in length
/// - [`LimbKitError::IndexOutOfBounds`] if any index is outside `[0, target.len())`
/// - [`LimbKitError::Type`] if `values` cannot be stored in `target`
/// - [`LimbKitError::PrecisionLoss`] if a value does not fit the target's limbs
///
/// # Examples
///
/// ```rust
/// use limbkit::{scatter, Array, FixedArray};
///
/// let mut target = Array::from(FixedArray::from_i64(vec![0, 0, 0]));
/// let idx = Array::from(FixedArray::from_i64(vec![0, 0, 2]));
/// let vals = Array::from(FixedArray::from_i64(vec![7, 8, 9]));
/// scatter(&mut target, &idx, &vals).unwrap();
/// assert_eq!(target.as_fixed().unwrap().as_i64(), Some(vec![8, 0, 9]));
/// ```
pub fn scatter(target: &mut Array, indices: &Array, values: &Array) -> Result<()> {
    if indices.len() != values.len() {
        return Err(LimbKitError::Shape(format!(
            "scatter got {} indices but {} values",
            indices.len(),
            values.len()
        )));
    }
    let positions = checked_positions(indices, target.len())?;
    let _span = tracing::debug_span!(
        "scatter",
        len = target.len(),
        indices = positions.len(),
        limbs = target.limb_count(),
    )
    .entered();

    match target {
        Array::Fixed(t) => {
            let source = match values {
                Array::Fixed(v) if v.kind() == t.kind() => v,
                other => {
                    return Err(LimbKitError::Type(format!(
                        "cannot scatter {} values into a {} array",
                        other.dtype(),
                        t.kind()
                    )));
                }
            };
            put_words(t.words_mut(), &positions, source.words());
        }
        Array::Composite(t) => {
            let promoted;
            let source = match values {
                Array::Composite(v) => v,
                Array::Fixed(v) => {
                    promoted = v.to_composite()?;
                    &promoted
                }
            };
            if source.is_signed() != t.is_signed() {
                return Err(LimbKitError::Type(format!(
                    "cannot scatter {} values into a {} bigint array",
                    signedness(source.is_signed()),
                    signedness(t.is_signed())
                )));
            }
            let source = source.resize(t.limb_count())?;
            // One pass over the indices; each index writes all of its limbs.
            let source_limbs = source.limbs();
            for (pos, &dst) in positions.iter().enumerate() {
                for (column, from) in t.limbs_mut().iter_mut().zip(source_limbs) {
                    if let (Some(slot), Some(&word)) = (column.get_mut(dst), from.get(pos)) {
                        *slot = word;
                    }
                }
            }
        }
    }
    Ok(())
}

const fn signedness(signed: bool) -> &'static str {
    if signed { "signed" } else { "unsigned" }
}

fn put_words(target: &mut [Limb], positions: &[usize], words: &[Limb]) {
    for (&dst, &word) in positions.iter().zip(words) {
        if let Some(slot) = target.get_mut(dst) {
            *slot = word;
        }
    }
}
