//! Utility functions for limbkit.
//!
//! This module provides the shared validation helpers used by the
//! permutation engine and the aggregator: turning index arrays into checked
//! positions, turning segment offsets into ranges, and splitting a range at
//! partition boundaries.
use crate::array::{Array, ScalarKind};
use crate::error::{LimbKitError, Result};
use std::ops::Range;

/// Validate an index array against an array of length `len`.
///
/// Index arrays must be `Int64` or `UInt64` fixed arrays. Every index must lie
/// in `[0, len)`; negative indices are rejected, not wrapped.
///
/// # Errors
///
/// - [`LimbKitError::Type`] if `indices` is not an integer fixed array
/// - [`LimbKitError::IndexOutOfBounds`] for the first index outside `[0, len)`
///
/// # Examples
///
/// ```rust
/// use limbkit::{Array, FixedArray, util::checked_positions};
///
/// let idx = Array::from(FixedArray::from_i64(vec![2, 0]));
/// assert_eq!(checked_positions(&idx, 3).unwrap(), vec![2, 0]);
/// assert!(checked_positions(&idx, 2).is_err());
/// ```
#[allow(clippy::cast_possible_wrap)]
pub fn checked_positions(indices: &Array, len: usize) -> Result<Vec<usize>> {
    let fixed = match indices {
        Array::Fixed(a) if a.kind().is_integer() => a,
        other => {
            return Err(LimbKitError::Type(format!(
                "index array must be int64 or uint64, got {}",
                other.dtype()
            )));
        }
    };
    let signed = fixed.kind() == ScalarKind::Int64;
    fixed
        .words()
        .iter()
        .map(|&word| {
            let index = if signed {
                i128::from(word as i64)
            } else {
                i128::from(word)
            };
            usize::try_from(index)
                .ok()
                .filter(|&pos| pos < len)
                .ok_or(LimbKitError::IndexOutOfBounds { index, len })
        })
        .collect()
}

/// Convert segment start offsets into ranges over `0..len`.
///
/// A non-empty offset list must start at 0. Offsets must be non-decreasing and
/// at most `len`. A repeated offset denotes an empty segment.
///
/// # Errors
///
/// - [`LimbKitError::Shape`] if the first offset is not 0, or offsets decrease
///   or exceed `len`
///
/// # Examples
///
/// ```rust
/// use limbkit::util::segment_ranges;
///
/// assert_eq!(segment_ranges(&[0, 2, 2], 5).unwrap(), vec![0..2, 2..2, 2..5]);
/// assert!(segment_ranges(&[0, 6], 5).is_err());
/// assert!(segment_ranges(&[1, 2], 5).is_err());
/// ```
pub fn segment_ranges(segments: &[usize], len: usize) -> Result<Vec<Range<usize>>> {
    if let Some(&first) = segments.first()
        && first != 0
    {
        return Err(LimbKitError::Shape(format!(
            "segment offsets must start at 0, got {}",
            first
        )));
    }
    let mut ranges = Vec::with_capacity(segments.len());
    let mut starts = segments.iter().copied().peekable();
    while let Some(start) = starts.next() {
        let end = starts.peek().copied().unwrap_or(len);
        if start > end || end > len {
            return Err(LimbKitError::Shape(format!(
                "segment offsets must be non-decreasing and at most {}, got {}..{}",
                len, start, end
            )));
        }
        ranges.push(start..end);
    }
    Ok(ranges)
}

/// Split `range` at every multiple of `partition_len`.
///
/// A `partition_len` of 0 is treated as 1.
///
/// # Examples
///
/// ```rust
/// use limbkit::util::partition_pieces;
///
/// assert_eq!(partition_pieces(3..9, 4), vec![3..4, 4..8, 8..9]);
/// assert!(partition_pieces(5..5, 4).is_empty());
/// ```
pub fn partition_pieces(range: Range<usize>, partition_len: usize) -> Vec<Range<usize>> {
    let step = partition_len.max(1);
    let mut pieces = Vec::new();
    let mut start = range.start;
    while start < range.end {
        let boundary = (start / step).saturating_add(1).saturating_mul(step);
        let end = boundary.min(range.end);
        pieces.push(start..end);
        start = end;
    }
    pieces
}
