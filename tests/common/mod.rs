//! Common test utilities and helpers for LimbKit tests
#![allow(dead_code)] // Test helpers may not all be used in every test file
use limbkit::*;
use num_bigint::BigInt;

/// Builder for composite arrays from explicit limb columns, most significant first
pub struct CompositeBuilder {
    limbs: Vec<FixedArray>,
    signed: bool,
}

impl CompositeBuilder {
    /// Create a new, unsigned builder
    pub fn new() -> Self {
        Self {
            limbs: Vec::new(),
            signed: false,
        }
    }

    /// Append the next less significant limb column
    pub fn with_limb(mut self, words: Vec<u64>) -> Self {
        self.limbs.push(FixedArray::from_u64(words));
        self
    }

    /// Reinterpret the built array as signed
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Build the array
    pub fn build(self) -> Array {
        let unsigned = CompositeArray::build(&self.limbs).unwrap();
        if !self.signed {
            return unsigned.into();
        }
        // Same bits, signed interpretation: round trip through exact values.
        let values: Vec<BigInt> = (0..unsigned.len())
            .map(|i| {
                let v = unsigned.value_at(i).unwrap();
                let width = 64 * unsigned.limb_count();
                if v.bit(width as u64 - 1) {
                    v - (BigInt::from(1) << width)
                } else {
                    v
                }
            })
            .collect();
        let signed = CompositeArray::from_bigints(&values, true).unwrap();
        signed.resize(unsigned.limb_count().max(signed.limb_count())).unwrap().into()
    }
}

impl Default for CompositeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Int64 array
pub fn ints(values: Vec<i64>) -> Array {
    FixedArray::from_i64(values).into()
}

/// UInt64 array
pub fn uints(values: Vec<u64>) -> Array {
    FixedArray::from_u64(values).into()
}

/// Float64 array
pub fn floats(values: Vec<f64>) -> Array {
    FixedArray::from_f64(values).into()
}

/// Bool array
pub fn bools(values: Vec<bool>) -> Array {
    FixedArray::from_bool(values).into()
}

/// Index array `[n-1, ..., 1, 0]`
pub fn reversal(n: usize) -> Array {
    ints((0..n as i64).rev().collect())
}

/// Composite array holding exactly `values`
pub fn big(values: &[BigInt], signed: bool) -> Array {
    CompositeArray::from_bigints(values, signed).unwrap().into()
}

/// Composite array from decimal strings
pub fn big_str(values: &[&str], signed: bool) -> Array {
    let parsed: Vec<BigInt> = values.iter().map(|s| s.parse().unwrap()).collect();
    big(&parsed, signed)
}

/// Exact values of a composite or integer array
pub fn to_bigints(array: &Array) -> Vec<BigInt> {
    array
        .materialize()
        .iter()
        .map(|s| s.to_bigint().expect("integer element"))
        .collect()
}

/// Deterministic pseudo-random u64 stream (xorshift64*)
pub struct Words(u64);

impl Words {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_word(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    pub fn take(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.next_word()).collect()
    }
}

/// Assert two arrays hold the same values element-wise
pub fn assert_same_values(a: &Array, b: &Array) {
    assert_eq!(a.len(), b.len(), "length mismatch");
    let eq = a.equals(b).unwrap();
    assert!(
        eq.as_bool().unwrap().iter().all(|&x| x),
        "arrays differ: {:?} vs {:?}",
        a.materialize(),
        b.materialize()
    );
}
