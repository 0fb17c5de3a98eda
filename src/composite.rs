//! Composite (multi-limb) integer arrays.
//!
//! A [`CompositeArray`] holds N arbitrary-precision integers as `k` parallel
//! limb arrays of length N, most-significant limb array first. All limb arrays
//! have the same length at all times; `k` changes only through [`resize`] or a
//! whole-array [`assign`].
//!
//! [`resize`]: CompositeArray::resize
//! [`assign`]: CompositeArray::assign
use crate::array::{FixedArray, ScalarKind};
use crate::error::{LimbKitError, Result};
use crate::limb::{self, LIMB_BITS, Limb};
use crate::value::Scalar;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Array of arbitrary-precision integers stored as parallel limb arrays.
///
/// # Fields
///
/// * `limbs` - `k >= 1` limb arrays, most significant first, each of length N
/// * `signed` - whether values are read as two's complement
///
/// # Examples
///
/// ```rust
/// use limbkit::{CompositeArray, FixedArray, Scalar};
/// use num_bigint::BigInt;
///
/// let hi = FixedArray::from_u64(vec![0, 1]);
/// let lo = FixedArray::from_u64(vec![7, 0]);
/// let a = CompositeArray::build(&[hi, lo]).unwrap();
/// assert_eq!(a.limb_count(), 2);
/// assert_eq!(
///     a.materialize(),
///     vec![Scalar::Big(BigInt::from(7)), Scalar::Big(BigInt::from(1u128 << 64))]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompositeParts")]
pub struct CompositeArray {
    limbs: Vec<Vec<Limb>>,
    signed: bool,
}

#[derive(Deserialize)]
struct CompositeParts {
    limbs: Vec<Vec<Limb>>,
    signed: bool,
}

impl TryFrom<CompositeParts> for CompositeArray {
    type Error = LimbKitError;

    fn try_from(parts: CompositeParts) -> Result<Self> {
        let _ = check_limb_shapes(parts.limbs.iter().map(Vec::len))?;
        Ok(Self::from_parts(parts.limbs, parts.signed))
    }
}

fn check_limb_shapes(mut lens: impl Iterator<Item = usize>) -> Result<usize> {
    let expected = lens
        .next()
        .ok_or_else(|| LimbKitError::Shape("at least one limb array is required".to_string()))?;
    for (pos, len) in lens.enumerate() {
        if len != expected {
            return Err(LimbKitError::Shape(format!(
                "limb array {} has length {}, expected {}",
                pos.saturating_add(1),
                len,
                expected
            )));
        }
    }
    Ok(expected)
}

impl CompositeArray {
    pub(crate) const fn from_parts(limbs: Vec<Vec<Limb>>, signed: bool) -> Self {
        Self { limbs, signed }
    }

    /// Compose an unsigned composite array from limb arrays.
    ///
    /// The caller's order is the limb order, most significant first.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if no limb arrays are given or their lengths differ
    /// - [`LimbKitError::Type`] if a limb array is not `UInt64`
    pub fn build(limb_arrays: &[FixedArray]) -> Result<Self> {
        if let Some((pos, bad)) = limb_arrays
            .iter()
            .enumerate()
            .find(|(_, a)| a.kind() != ScalarKind::UInt64)
        {
            return Err(LimbKitError::Type(format!(
                "limb array {} is {}, expected uint64",
                pos,
                bad.kind()
            )));
        }
        let _ = check_limb_shapes(limb_arrays.iter().map(FixedArray::len))?;
        let limbs = limb_arrays.iter().map(|a| a.words().to_vec()).collect();
        Ok(Self::from_parts(limbs, false))
    }

    /// One-limb signed array holding the two's-complement pattern of each value.
    ///
    /// Growing the result with [`resize`](Self::resize) preserves the sign.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Type`] if `values` is not `Int64`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use limbkit::{CompositeArray, FixedArray, Scalar};
    /// use num_bigint::BigInt;
    ///
    /// let a = CompositeArray::cast_from_signed(&FixedArray::from_i64(vec![-5])).unwrap();
    /// let wide = a.resize(4).unwrap();
    /// assert_eq!(wide.materialize(), vec![Scalar::Big(BigInt::from(-5))]);
    /// ```
    pub fn cast_from_signed(values: &FixedArray) -> Result<Self> {
        if values.kind() != ScalarKind::Int64 {
            return Err(LimbKitError::Type(format!(
                "cast_from_signed expects int64, got {}",
                values.kind()
            )));
        }
        values.to_composite()
    }

    /// All-zero array of `n` values with `k` limbs each.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if `k` is 0
    pub fn zeros(n: usize, k: usize, signed: bool) -> Result<Self> {
        if k == 0 {
            return Err(LimbKitError::Shape(
                "at least one limb array is required".to_string(),
            ));
        }
        Ok(Self::from_parts(vec![vec![0; n]; k], signed))
    }

    /// Array with the same shape and signedness as `self`, every value 1.
    pub fn ones_like(&self) -> Self {
        let n = self.len();
        let k = self.limb_count();
        let limbs = (0..k)
            .map(|level| {
                if level.saturating_add(1) == k {
                    vec![1; n]
                } else {
                    vec![0; n]
                }
            })
            .collect();
        Self::from_parts(limbs, self.signed)
    }

    /// Build from exact integers using the smallest limb count that holds every value.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Type`] if a negative value is given for an unsigned array
    pub fn from_bigints(values: &[BigInt], signed: bool) -> Result<Self> {
        Self::from_bigints_min(values, signed, 1)
    }

    /// Like [`from_bigints`](Self::from_bigints) but never narrower than `min_k`.
    pub(crate) fn from_bigints_min(values: &[BigInt], signed: bool, min_k: usize) -> Result<Self> {
        let mut k = min_k.max(1);
        for (pos, value) in values.iter().enumerate() {
            let needed = limb::limbs_needed(value, signed).ok_or_else(|| {
                LimbKitError::Type(format!(
                    "negative value at index {} in unsigned bigint array",
                    pos
                ))
            })?;
            k = k.max(needed);
        }
        let mut limbs = vec![Vec::with_capacity(values.len()); k];
        for (pos, value) in values.iter().enumerate() {
            let words = limb::from_bigint(value, k, signed).ok_or(LimbKitError::PrecisionLoss {
                index: pos,
                new_limbs: k,
            })?;
            for (column, word) in limbs.iter_mut().zip(words) {
                column.push(word);
            }
        }
        Ok(Self::from_parts(limbs, signed))
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.limbs.first().map_or(0, Vec::len)
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Limbs per element (`k`).
    pub const fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// Whether values are two's complement.
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Bit width of every value (`64 * k`).
    pub const fn max_bits(&self) -> usize {
        self.limbs.len().saturating_mul(LIMB_BITS)
    }

    /// The raw limb arrays, most significant first.
    pub fn limbs(&self) -> &[Vec<Limb>] {
        &self.limbs
    }

    pub(crate) fn limbs_mut(&mut self) -> &mut [Vec<Limb>] {
        &mut self.limbs
    }

    /// Limb array `level` (0 = most significant) as a `UInt64` array.
    pub fn limb_array(&self, level: usize) -> Option<FixedArray> {
        self.limbs
            .get(level)
            .map(|words| FixedArray::from_u64(words.clone()))
    }

    /// The limb sequence of element `idx`, most significant first.
    pub fn element(&self, idx: usize) -> Option<Vec<Limb>> {
        self.limbs.iter().map(|column| column.get(idx).copied()).collect()
    }

    /// Exact value of element `idx`.
    pub fn value_at(&self, idx: usize) -> Option<BigInt> {
        self.element(idx).map(|words| limb::to_bigint(&words, self.signed))
    }

    /// Exact host-side values.
    pub fn materialize(&self) -> Vec<Scalar> {
        (0..self.len())
            .filter_map(|idx| self.value_at(idx))
            .map(Scalar::Big)
            .collect()
    }

    /// Re-express every value with `new_k` limbs.
    ///
    /// Growing prepends fill limbs (zeros, or sign fill for signed arrays).
    /// Shrinking is allowed only when every dropped limb of every element is the
    /// fill implied by the new most-significant limb.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if `new_k` is 0
    /// - [`LimbKitError::PrecisionLoss`] if a value does not fit in `new_k` limbs
    ///
    /// # Examples
    ///
    /// ```rust
    /// use limbkit::{CompositeArray, FixedArray, LimbKitError};
    ///
    /// let a = CompositeArray::build(&[
    ///     FixedArray::from_u64(vec![0, 1]),
    ///     FixedArray::from_u64(vec![9, 0]),
    /// ])
    /// .unwrap();
    /// assert_eq!(a.resize(3).unwrap().limb_count(), 3);
    /// assert!(matches!(
    ///     a.resize(1),
    ///     Err(LimbKitError::PrecisionLoss { index: 1, new_limbs: 1 })
    /// ));
    /// ```
    pub fn resize(&self, new_k: usize) -> Result<Self> {
        if new_k == 0 {
            return Err(LimbKitError::Shape(
                "at least one limb array is required".to_string(),
            ));
        }
        let k = self.limb_count();
        match new_k.cmp(&k) {
            Ordering::Equal => Ok(self.clone()),
            Ordering::Greater => {
                let fills: Vec<Limb> = self
                    .limbs
                    .first()
                    .map(|top| top.iter().map(|&w| limb::fill_for(w, self.signed)).collect())
                    .unwrap_or_default();
                let mut limbs = vec![fills; new_k.saturating_sub(k)];
                limbs.extend(self.limbs.iter().cloned());
                tracing::trace!(from = k, to = new_k, len = self.len(), "grew composite array");
                Ok(Self::from_parts(limbs, self.signed))
            }
            Ordering::Less => {
                let drop = k.saturating_sub(new_k);
                let (dropped, kept) = self.limbs.split_at(drop);
                let new_top = kept.first().map(Vec::as_slice).unwrap_or_default();
                for (idx, &top) in new_top.iter().enumerate() {
                    let fill = limb::fill_for(top, self.signed);
                    if dropped
                        .iter()
                        .any(|column| column.get(idx).is_some_and(|&w| w != fill))
                    {
                        tracing::debug!(
                            index = idx,
                            from = k,
                            to = new_k,
                            "resize would lose precision"
                        );
                        return Err(LimbKitError::PrecisionLoss {
                            index: idx,
                            new_limbs: new_k,
                        });
                    }
                }
                tracing::trace!(from = k, to = new_k, len = self.len(), "shrank composite array");
                Ok(Self::from_parts(kept.to_vec(), self.signed))
            }
        }
    }

    /// Word at `level` (0 = most significant) of element `idx` after
    /// extending the element to `width` limbs.
    fn word_at(&self, level: usize, width: usize, idx: usize) -> Limb {
        let pad = width.saturating_sub(self.limb_count());
        match level.checked_sub(pad) {
            Some(own) => self
                .limbs
                .get(own)
                .and_then(|column| column.get(idx))
                .copied()
                .unwrap_or(0),
            None => {
                let top = self
                    .limbs
                    .first()
                    .and_then(|column| column.get(idx))
                    .copied()
                    .unwrap_or(0);
                limb::fill_for(top, self.signed)
            }
        }
    }

    /// Element-wise numeric equality.
    ///
    /// Differing limb counts are aligned by extension; signed and unsigned
    /// arrays compare by value.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if the lengths differ
    pub fn equals(&self, other: &CompositeArray) -> Result<FixedArray> {
        if self.len() != other.len() {
            return Err(LimbKitError::Shape(format!(
                "cannot compare arrays of length {} and {}",
                self.len(),
                other.len()
            )));
        }
        let mut width = self.limb_count().max(other.limb_count());
        if self.signed != other.signed {
            width = width.saturating_add(1);
        }
        let eq = (0..self.len())
            .map(|idx| {
                (0..width).all(|level| {
                    self.word_at(level, width, idx) == other.word_at(level, width, idx)
                })
            })
            .collect();
        Ok(FixedArray::from_bool(eq))
    }

    /// Replace the whole contents with `source` (`target[:] = source`).
    ///
    /// The target adopts the source's limb count and signedness.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if the lengths differ
    pub fn assign(&mut self, source: &CompositeArray) -> Result<()> {
        if self.len() != source.len() {
            return Err(LimbKitError::Shape(format!(
                "cannot assign {} values to an array of length {}",
                source.len(),
                self.len()
            )));
        }
        self.limbs.clone_from(&source.limbs);
        self.signed = source.signed;
        Ok(())
    }

    /// Numeric order of two elements of this array.
    pub(crate) fn cmp_at(&self, i: usize, j: usize) -> Ordering {
        let mut columns = self.limbs.iter();
        if self.signed
            && let Some(top) = columns.next()
        {
            let ord = match (top.get(i), top.get(j)) {
                (Some(&a), Some(&b)) => limb::cmp_limbs(&[a], &[b], true),
                _ => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        for column in columns {
            let ord = column.get(i).cmp(&column.get(j));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Whether elements `i` and `j` hold identical limbs.
    pub(crate) fn same_at(&self, i: usize, j: usize) -> bool {
        self.limbs
            .iter()
            .all(|column| column.get(i) == column.get(j))
    }
}
