//! Materialized element values.
//!
//! This module defines [`Scalar`], the exact host-side value of one array
//! element as returned by [`Array::materialize`](crate::Array::materialize).
//! It is the ground truth used when comparing arrays in tests.
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::fmt;

/// One materialized array element.
///
/// # Examples
///
/// ```rust
/// use limbkit::Scalar;
/// use num_bigint::BigInt;
///
/// let small = Scalar::Int(-3);
/// let big = Scalar::Big(BigInt::from(u128::MAX));
/// assert_eq!(small.to_bigint(), Some(BigInt::from(-3)));
/// assert!(big.to_bigint().is_some());
/// assert_eq!(Scalar::Float(1.5).to_bigint(), None);
/// ```
#[derive(Clone, PartialEq)]
pub enum Scalar {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit unsigned integer
    UInt(u64),
    /// 64-bit floating-point number
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Arbitrary-precision integer from a composite array
    Big(BigInt),
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "Int({})", v),
            Scalar::UInt(v) => write!(f, "UInt({})", v),
            Scalar::Float(v) => write!(f, "Float({})", v),
            Scalar::Bool(v) => write!(f, "Bool({})", v),
            Scalar::Big(v) => write!(f, "Big({})", v),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::UInt(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Big(v) => write!(f, "{}", v),
        }
    }
}

impl Scalar {
    /// Exact integer value, if the scalar is integral.
    ///
    /// Booleans map to 0 and 1; floats return `None`.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Scalar::Int(v) => Some(BigInt::from(*v)),
            Scalar::UInt(v) => Some(BigInt::from(*v)),
            Scalar::Bool(v) => Some(BigInt::from(u8::from(*v))),
            Scalar::Big(v) => Some(v.clone()),
            Scalar::Float(_) => None,
        }
    }

    /// Nearest `f64`, used by the `mean` reduction and for display.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => v.to_f64(),
            Scalar::UInt(v) => v.to_f64(),
            Scalar::Float(v) => Some(*v),
            Scalar::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Scalar::Big(v) => v.to_f64(),
        }
    }

    /// Returns the boolean payload, if this is a `Bool`.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::UInt(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<BigInt> for Scalar {
    fn from(v: BigInt) -> Self {
        Scalar::Big(v)
    }
}
