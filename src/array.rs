//! Array types.
//!
//! This module defines the closed set of array variants every engine in the
//! crate dispatches on: [`FixedArray`] (one 64-bit word per element plus a
//! declared [`ScalarKind`]) and [`CompositeArray`] (k parallel limb arrays).
//! Both are wrapped by [`Array`].
use crate::composite::CompositeArray;
use crate::error::{LimbKitError, Result};
use crate::limb::Limb;
use crate::value::Scalar;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Declared element kind of a [`FixedArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Two's-complement 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// IEEE-754 double, stored as its bit pattern
    Float64,
    /// Boolean, stored as 0 or 1
    Bool,
}

impl ScalarKind {
    /// Lowercase dtype name (`int64`, `uint64`, `float64`, `bool`).
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float64 => "float64",
            ScalarKind::Bool => "bool",
        }
    }

    /// Whether the kind is one of the two integer kinds.
    pub const fn is_integer(self) -> bool {
        matches!(self, ScalarKind::Int64 | ScalarKind::UInt64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-width array: one limb per element and a declared kind.
///
/// This is the degenerate `k = 1` case of a composite array. Float elements
/// are kept as `f64::to_bits`, booleans as 0/1, signed integers as their
/// two's-complement bit pattern.
///
/// # Examples
///
/// ```rust
/// use limbkit::{FixedArray, ScalarKind};
///
/// let a = FixedArray::from_i64(vec![-1, 2, 3]);
/// assert_eq!(a.kind(), ScalarKind::Int64);
/// assert_eq!(a.len(), 3);
/// assert_eq!(a.words()[0], u64::MAX);
/// assert_eq!(a.as_i64(), Some(vec![-1, 2, 3]));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FixedParts")]
pub struct FixedArray {
    kind: ScalarKind,
    words: Vec<Limb>,
}

#[derive(Deserialize)]
struct FixedParts {
    kind: ScalarKind,
    words: Vec<Limb>,
}

impl TryFrom<FixedParts> for FixedArray {
    type Error = LimbKitError;

    fn try_from(parts: FixedParts) -> Result<Self> {
        if parts.kind == ScalarKind::Bool
            && let Some(pos) = parts.words.iter().position(|&w| w > 1)
        {
            return Err(LimbKitError::InvalidArgument(format!(
                "bool array holds non 0/1 word at index {}",
                pos
            )));
        }
        Ok(Self::from_words(parts.kind, parts.words))
    }
}

/// Bit pattern of a float word with `-0.0` folded into `0.0` and every NaN
/// folded into `f64::NAN`. Grouping and distinct counting key on this.
pub(crate) fn canonical_float_bits(word: Limb) -> Limb {
    let v = f64::from_bits(word);
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        word
    }
}

impl FixedArray {
    /// Build an `Int64` array.
    #[allow(clippy::cast_sign_loss)]
    pub fn from_i64(values: Vec<i64>) -> Self {
        Self::from_words(ScalarKind::Int64, values.into_iter().map(|v| v as u64).collect())
    }

    /// Build a `UInt64` array.
    pub const fn from_u64(values: Vec<u64>) -> Self {
        Self::from_words(ScalarKind::UInt64, values)
    }

    /// Build a `Float64` array.
    pub fn from_f64(values: Vec<f64>) -> Self {
        Self::from_words(
            ScalarKind::Float64,
            values.into_iter().map(f64::to_bits).collect(),
        )
    }

    /// Build a `Bool` array.
    pub fn from_bool(values: Vec<bool>) -> Self {
        Self::from_words(ScalarKind::Bool, values.into_iter().map(Limb::from).collect())
    }

    /// `Int64` array holding `0..n`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use limbkit::FixedArray;
    ///
    /// assert_eq!(FixedArray::arange(3).as_i64(), Some(vec![0, 1, 2]));
    /// ```
    pub fn arange(n: usize) -> Self {
        Self::from_words(ScalarKind::Int64, (0..n).map(|i| i as Limb).collect())
    }

    pub(crate) const fn from_words(kind: ScalarKind, words: Vec<Limb>) -> Self {
        Self { kind, words }
    }

    /// Declared element kind.
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Number of elements.
    pub const fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the array has no elements.
    pub const fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Raw element words.
    pub fn words(&self) -> &[Limb] {
        &self.words
    }

    pub(crate) fn words_mut(&mut self) -> &mut [Limb] {
        &mut self.words
    }

    /// Elements as `i64`, if the kind is `Int64`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn as_i64(&self) -> Option<Vec<i64>> {
        (self.kind == ScalarKind::Int64).then(|| self.words.iter().map(|&w| w as i64).collect())
    }

    /// Elements as `u64`, if the kind is `UInt64`.
    pub fn as_u64(&self) -> Option<Vec<u64>> {
        (self.kind == ScalarKind::UInt64).then(|| self.words.clone())
    }

    /// Elements as `f64`, if the kind is `Float64`.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        (self.kind == ScalarKind::Float64)
            .then(|| self.words.iter().map(|&w| f64::from_bits(w)).collect())
    }

    /// Elements as `bool`, if the kind is `Bool`.
    pub fn as_bool(&self) -> Option<Vec<bool>> {
        (self.kind == ScalarKind::Bool).then(|| self.words.iter().map(|&w| w != 0).collect())
    }

    /// Decode one word under this array's kind.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn decode(&self, word: Limb) -> Scalar {
        match self.kind {
            ScalarKind::Int64 => Scalar::Int(word as i64),
            ScalarKind::UInt64 => Scalar::UInt(word),
            ScalarKind::Float64 => Scalar::Float(f64::from_bits(word)),
            ScalarKind::Bool => Scalar::Bool(word != 0),
        }
    }

    /// Element at `idx`, or `None` when out of range.
    pub fn scalar_at(&self, idx: usize) -> Option<Scalar> {
        self.words.get(idx).map(|&w| self.decode(w))
    }

    /// Exact host-side values.
    pub fn materialize(&self) -> Vec<Scalar> {
        self.words.iter().map(|&w| self.decode(w)).collect()
    }

    /// Total order on two elements.
    ///
    /// Floats are canonicalized first (see [`canonical_float_bits`]) and then
    /// ordered by `f64::total_cmp`, so `-0.0 == 0.0` and all NaNs are equal.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn cmp_at(&self, i: usize, j: usize) -> Ordering {
        let (a, b) = match (self.words.get(i), self.words.get(j)) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return i.cmp(&j),
        };
        match self.kind {
            ScalarKind::Int64 => (a as i64).cmp(&(b as i64)),
            ScalarKind::UInt64 | ScalarKind::Bool => a.cmp(&b),
            ScalarKind::Float64 => f64::from_bits(canonical_float_bits(a))
                .total_cmp(&f64::from_bits(canonical_float_bits(b))),
        }
    }

    /// Promote an integer array to a one-limb composite array.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Type`] for `Float64` and `Bool` arrays
    pub fn to_composite(&self) -> Result<CompositeArray> {
        match self.kind {
            ScalarKind::Int64 => Ok(CompositeArray::from_parts(vec![self.words.clone()], true)),
            ScalarKind::UInt64 => Ok(CompositeArray::from_parts(vec![self.words.clone()], false)),
            other => Err(LimbKitError::Type(format!(
                "cannot convert {} array to bigint",
                other
            ))),
        }
    }

    fn equals(&self, other: &FixedArray) -> Result<FixedArray> {
        if self.len() != other.len() {
            return Err(LimbKitError::Shape(format!(
                "cannot compare arrays of length {} and {}",
                self.len(),
                other.len()
            )));
        }
        if self.kind == other.kind {
            let eq: Vec<bool> = match self.kind {
                ScalarKind::Float64 => self
                    .words
                    .iter()
                    .zip(&other.words)
                    .map(|(&a, &b)| f64::from_bits(a) == f64::from_bits(b))
                    .collect(),
                _ => self.words.iter().zip(&other.words).map(|(a, b)| a == b).collect(),
            };
            return Ok(FixedArray::from_bool(eq));
        }
        if self.kind.is_integer() && other.kind.is_integer() {
            return self.to_composite()?.equals(&other.to_composite()?);
        }
        Err(LimbKitError::Type(format!(
            "cannot compare {} with {}",
            self.kind, other.kind
        )))
    }
}

/// Any array the engines operate on.
///
/// A closed tagged variant: every engine matches on it exhaustively instead of
/// inspecting dtypes at runtime.
///
/// # Examples
///
/// ```rust
/// use limbkit::{Array, CompositeArray, FixedArray, Scalar};
/// use num_bigint::BigInt;
///
/// let fixed: Array = FixedArray::from_i64(vec![1, 2]).into();
/// assert_eq!(fixed.limb_count(), 1);
///
/// let big: Array = CompositeArray::build(&[
///     FixedArray::from_u64(vec![1, 0]),
///     FixedArray::from_u64(vec![0, 5]),
/// ])
/// .unwrap()
/// .into();
/// assert_eq!(big.limb_count(), 2);
/// assert_eq!(big.materialize()[0], Scalar::Big(BigInt::from(1u128 << 64)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Array {
    /// Fixed-width array with a declared scalar kind
    Fixed(FixedArray),
    /// Multi-limb arbitrary-precision integer array
    Composite(CompositeArray),
}

impl From<FixedArray> for Array {
    fn from(a: FixedArray) -> Self {
        Array::Fixed(a)
    }
}

impl From<CompositeArray> for Array {
    fn from(a: CompositeArray) -> Self {
        Array::Composite(a)
    }
}

impl Array {
    /// Number of logical elements.
    pub fn len(&self) -> usize {
        match self {
            Array::Fixed(a) => a.len(),
            Array::Composite(a) => a.len(),
        }
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Limbs per element (always 1 for fixed arrays).
    pub fn limb_count(&self) -> usize {
        match self {
            Array::Fixed(_) => 1,
            Array::Composite(a) => a.limb_count(),
        }
    }

    /// Human-readable dtype (`int64`, ..., `bigint`).
    pub const fn dtype(&self) -> &'static str {
        match self {
            Array::Fixed(a) => a.kind().name(),
            Array::Composite(_) => "bigint",
        }
    }

    /// The fixed-width array, if this is one.
    pub const fn as_fixed(&self) -> Option<&FixedArray> {
        match self {
            Array::Fixed(a) => Some(a),
            Array::Composite(_) => None,
        }
    }

    /// The composite array, if this is one.
    pub const fn as_composite(&self) -> Option<&CompositeArray> {
        match self {
            Array::Fixed(_) => None,
            Array::Composite(a) => Some(a),
        }
    }

    /// Exact host-side values.
    pub fn materialize(&self) -> Vec<Scalar> {
        match self {
            Array::Fixed(a) => a.materialize(),
            Array::Composite(a) => a.materialize(),
        }
    }

    /// Element-wise equality, returning a `Bool` array.
    ///
    /// Integer arrays of different kinds or limb counts are compared
    /// numerically; the narrower side is extended, never truncated.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::Shape`] if the lengths differ
    /// - [`LimbKitError::Type`] if the kinds cannot be compared
    pub fn equals(&self, other: &Array) -> Result<FixedArray> {
        match (self, other) {
            (Array::Fixed(a), Array::Fixed(b)) => a.equals(b),
            (Array::Composite(a), Array::Composite(b)) => a.equals(b),
            (Array::Composite(a), Array::Fixed(b)) | (Array::Fixed(b), Array::Composite(a)) => {
                a.equals(&b.to_composite()?)
            }
        }
    }

    /// Total order on two elements of this array.
    pub(crate) fn cmp_at(&self, i: usize, j: usize) -> Ordering {
        match self {
            Array::Fixed(a) => a.cmp_at(i, j),
            Array::Composite(a) => a.cmp_at(i, j),
        }
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if serialization fails
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| LimbKitError::InvalidArgument(e.to_string()))
    }

    /// Deserialize from a JSON string, re-checking the limb length invariant.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if the input is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LimbKitError::InvalidArgument(e.to_string()))
    }

    /// Serialize to bincode.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if serialization fails
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| LimbKitError::InvalidArgument(e.to_string()))
    }

    /// Deserialize from bincode, re-checking the limb length invariant.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if the input is malformed
    pub fn from_binary(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| LimbKitError::InvalidArgument(e.to_string()))
    }
}
