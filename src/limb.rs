//! BigInt value model.
//!
//! An arbitrary-precision integer is stored as an ordered sequence of 64-bit
//! limbs, most-significant first. A sequence of `k` limbs is read either as an
//! unsigned integer or as a two's-complement signed integer of width `64 * k`.
//!
//! The helpers here work on one element's limb sequence at a time. Column-wise
//! storage lives in [`CompositeArray`](crate::CompositeArray).
use num_bigint::{BigInt, Sign};
use std::cmp::Ordering;

/// One fixed-width word of an arbitrary-precision integer.
pub type Limb = u64;

/// Number of bits in a limb.
pub const LIMB_BITS: usize = 64;

const LIMB_BYTES: usize = 8;

/// Fill limb used when sign/zero-extending a value whose most-significant
/// limb is `top`.
///
/// Unsigned values always extend with zeros; signed values extend with all
/// ones when the top bit of `top` is set.
///
/// # Examples
///
/// ```rust
/// use limbkit::limb::fill_for;
///
/// assert_eq!(fill_for(1, true), 0);
/// assert_eq!(fill_for(u64::MAX, true), u64::MAX);
/// assert_eq!(fill_for(u64::MAX, false), 0);
/// ```
pub const fn fill_for(top: Limb, signed: bool) -> Limb {
    if signed && (top >> 63) == 1 {
        Limb::MAX
    } else {
        0
    }
}

/// Extend `limbs` to `new_k` limbs by prepending fill limbs.
///
/// Returns the input unchanged when `new_k <= limbs.len()`.
pub fn extend(limbs: &[Limb], new_k: usize, signed: bool) -> Vec<Limb> {
    let fill = fill_for(limbs.first().copied().unwrap_or(0), signed);
    let pad = new_k.saturating_sub(limbs.len());
    let mut out = Vec::with_capacity(pad.saturating_add(limbs.len()));
    out.resize(pad, fill);
    out.extend_from_slice(limbs);
    out
}

/// Check whether `limbs` can be truncated to `new_k` limbs without changing
/// its value.
///
/// Every dropped leading limb must equal the fill implied by the limb that
/// becomes most significant.
///
/// # Examples
///
/// ```rust
/// use limbkit::limb::fits;
///
/// // -1 as two limbs shrinks to one limb
/// assert!(fits(&[u64::MAX, u64::MAX], 1, true));
/// // 2^64 does not
/// assert!(!fits(&[1, 0], 1, false));
/// // u64::MAX is representable unsigned in one limb, but not signed
/// assert!(fits(&[0, u64::MAX], 1, false));
/// assert!(!fits(&[0, u64::MAX], 1, true));
/// ```
pub fn fits(limbs: &[Limb], new_k: usize, signed: bool) -> bool {
    if new_k == 0 {
        return false;
    }
    let drop = limbs.len().saturating_sub(new_k);
    let Some((dropped, kept)) = limbs.split_at_checked(drop) else {
        return false;
    };
    let fill = fill_for(kept.first().copied().unwrap_or(0), signed);
    dropped.iter().all(|&limb| limb == fill)
}

/// Convert a limb sequence into an exact [`BigInt`].
///
/// # Examples
///
/// ```rust
/// use limbkit::limb::to_bigint;
/// use num_bigint::BigInt;
///
/// assert_eq!(to_bigint(&[1, 0], false), BigInt::from(1u128 << 64));
/// assert_eq!(to_bigint(&[u64::MAX], true), BigInt::from(-1));
/// assert_eq!(to_bigint(&[u64::MAX], false), BigInt::from(u64::MAX));
/// ```
pub fn to_bigint(limbs: &[Limb], signed: bool) -> BigInt {
    let bytes: Vec<u8> = limbs.iter().flat_map(|limb| limb.to_be_bytes()).collect();
    if bytes.is_empty() {
        return BigInt::default();
    }
    if signed {
        BigInt::from_signed_bytes_be(&bytes)
    } else {
        BigInt::from_bytes_be(Sign::Plus, &bytes)
    }
}

/// Smallest limb count that represents `value` exactly.
///
/// Returns `None` when `value` is negative and `signed` is false. The result is
/// at least 1.
pub fn limbs_needed(value: &BigInt, signed: bool) -> Option<usize> {
    let bytes = minimal_bytes(value, signed)?;
    Some(bytes.len().div_ceil(LIMB_BYTES).max(1))
}

/// Re-express `value` as exactly `k` limbs.
///
/// Returns `None` when the value does not fit in `64 * k` bits under the
/// requested signedness, or when a negative value is requested unsigned.
///
/// # Examples
///
/// ```rust
/// use limbkit::limb::from_bigint;
/// use num_bigint::BigInt;
///
/// assert_eq!(from_bigint(&BigInt::from(-2), 2, true), Some(vec![u64::MAX, u64::MAX - 1]));
/// assert_eq!(from_bigint(&BigInt::from(-2), 2, false), None);
/// assert_eq!(from_bigint(&BigInt::from(1u128 << 64), 1, false), None);
/// ```
pub fn from_bigint(value: &BigInt, k: usize, signed: bool) -> Option<Vec<Limb>> {
    let bytes = minimal_bytes(value, signed)?;
    let width = k.checked_mul(LIMB_BYTES)?;
    if bytes.len() > width || k == 0 {
        return None;
    }
    let fill = if value.sign() == Sign::Minus { 0xFF } else { 0x00 };
    let mut padded = vec![fill; width.saturating_sub(bytes.len())];
    padded.extend_from_slice(&bytes);
    padded
        .chunks_exact(LIMB_BYTES)
        .map(|chunk| chunk.try_into().ok().map(Limb::from_be_bytes))
        .collect()
}

fn minimal_bytes(value: &BigInt, signed: bool) -> Option<Vec<u8>> {
    if signed {
        Some(value.to_signed_bytes_be())
    } else if value.sign() == Sign::Minus {
        None
    } else {
        Some(value.to_bytes_be().1)
    }
}

/// Compare two limb sequences of equal length under one signedness.
///
/// Signed sequences compare their most-significant limb as `i64` and the rest
/// as unsigned words.
#[allow(clippy::cast_possible_wrap)]
pub fn cmp_limbs(a: &[Limb], b: &[Limb], signed: bool) -> Ordering {
    let mut pairs = a.iter().zip(b.iter());
    if signed && let Some((&ta, &tb)) = pairs.next() {
        let top = (ta as i64).cmp(&(tb as i64));
        if top != Ordering::Equal {
            return top;
        }
    }
    for (x, y) in pairs {
        let ord = x.cmp(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Numeric comparison of two limb sequences of any width and signedness.
///
/// Both sides are extended to one limb wider than the longer of the two, at
/// which width every unsigned and signed value has a valid two's-complement
/// encoding, and then compared as signed.
pub fn cmp_numeric(a: &[Limb], a_signed: bool, b: &[Limb], b_signed: bool) -> Ordering {
    if a_signed == b_signed && a.len() == b.len() {
        return cmp_limbs(a, b, a_signed);
    }
    let width = a.len().max(b.len()).saturating_add(1);
    let wa = extend(a, width, a_signed);
    let wb = extend(b, width, b_signed);
    cmp_limbs(&wa, &wb, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_unsigned_and_signed() {
        assert_eq!(extend(&[7], 3, false), vec![0, 0, 7]);
        assert_eq!(extend(&[u64::MAX - 4], 3, true), vec![u64::MAX, u64::MAX, u64::MAX - 4]);
        assert_eq!(extend(&[u64::MAX - 4], 3, false), vec![0, 0, u64::MAX - 4]);
        assert_eq!(extend(&[1, 2], 1, false), vec![1, 2]);
    }

    #[test]
    fn test_fits() {
        assert!(fits(&[0, 0, 5], 1, false));
        assert!(fits(&[0, 0, 5], 1, true));
        assert!(!fits(&[0, 1, 5], 1, false));
        assert!(fits(&[u64::MAX, u64::MAX - 4], 1, true));
        assert!(!fits(&[u64::MAX, 4], 1, true));
        assert!(!fits(&[5], 0, false));
    }

    #[test]
    fn test_bigint_round_trip_widths() {
        for value in [
            BigInt::from(0),
            BigInt::from(-1),
            BigInt::from(i64::MIN),
            BigInt::from(u64::MAX),
            BigInt::from(u128::MAX),
            -BigInt::from(u128::MAX),
        ] {
            let k = limbs_needed(&value, true).unwrap();
            let limbs = from_bigint(&value, k, true).unwrap();
            assert_eq!(to_bigint(&limbs, true), value);
            let wider = from_bigint(&value, k + 2, true).unwrap();
            assert_eq!(to_bigint(&wider, true), value);
        }
    }

    #[test]
    fn test_limbs_needed() {
        assert_eq!(limbs_needed(&BigInt::from(0), false), Some(1));
        assert_eq!(limbs_needed(&BigInt::from(u64::MAX), false), Some(1));
        assert_eq!(limbs_needed(&BigInt::from(u64::MAX), true), Some(2));
        assert_eq!(limbs_needed(&BigInt::from(i64::MIN), true), Some(1));
        assert_eq!(limbs_needed(&BigInt::from(-1), false), None);
    }

    #[test]
    fn test_cmp_limbs_signed() {
        assert_eq!(cmp_limbs(&[u64::MAX], &[0], true), Ordering::Less);
        assert_eq!(cmp_limbs(&[u64::MAX], &[0], false), Ordering::Greater);
        assert_eq!(cmp_limbs(&[0, 2], &[0, 1], true), Ordering::Greater);
    }

    #[test]
    fn test_cmp_numeric_mixed() {
        // -1 (signed, one limb) vs 2^64 - 1 (unsigned, one limb)
        assert_eq!(cmp_numeric(&[u64::MAX], true, &[u64::MAX], false), Ordering::Less);
        // 5 in one limb equals 5 in three limbs
        assert_eq!(cmp_numeric(&[5], false, &[0, 0, 5], true), Ordering::Equal);
        assert_eq!(
            cmp_numeric(&[u64::MAX], true, &[u64::MAX, u64::MAX], true),
            Ordering::Equal
        );
    }
}
