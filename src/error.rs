//! Error types for limbkit operations.
//!
//! This module defines the error types used throughout limbkit. All operations
//! that can fail return a [`Result<T, LimbKitError>`](Result). Every failure is
//! local and synchronous: an operation that returns an error has not mutated
//! any of its inputs.
use std::fmt;

/// Main error type for limbkit operations.
///
/// # Examples
///
/// ```rust
/// use limbkit::LimbKitError;
///
/// // Limb arrays of unequal length
/// let err = LimbKitError::Shape("limb array 1 has length 3, expected 4".to_string());
///
/// // Gather index outside the source array
/// let err = LimbKitError::IndexOutOfBounds { index: -1, len: 5 };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LimbKitError {
    /// Mismatched lengths.
    ///
    /// Raised for limb arrays of unequal length, `indices`/`values` length
    /// mismatch in scatter, key arrays of different lengths, or a value array
    /// whose length differs from the grouping it is aggregated with.
    Shape(String),
    /// Gather/scatter index outside `[0, len)`.
    IndexOutOfBounds {
        /// The offending index as supplied by the caller (may be negative)
        index: i128,
        /// Length of the array being indexed
        len: usize,
    },
    /// A limb-count reduction would discard significant limbs.
    PrecisionLoss {
        /// First element whose value does not fit
        index: usize,
        /// The requested limb count
        new_limbs: usize,
    },
    /// The operation is not defined for the array's kind.
    ///
    /// # Examples
    ///
    /// - `any`/`all` over a non-boolean array
    /// - building a composite array from signed limb arrays
    /// - scattering float values into an integer target
    Type(String),
    /// A reduction without an identity was applied to an empty group.
    NoGroups(String),
    /// Unknown reduction name.
    UnsupportedOperation(String),
    /// Handle not present in the engine arena.
    UnknownHandle(usize),
    /// Invalid configuration or malformed serialized input.
    InvalidArgument(String),
}

impl fmt::Display for LimbKitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimbKitError::Shape(msg) => {
                write!(f, "Shape error: {}", msg)
            }
            LimbKitError::IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds (len: {})", index, len)
            }
            LimbKitError::PrecisionLoss { index, new_limbs } => {
                write!(
                    f,
                    "Precision loss: value at index {} does not fit in {} limbs",
                    index, new_limbs
                )
            }
            LimbKitError::Type(msg) => {
                write!(f, "Type error: {}", msg)
            }
            LimbKitError::NoGroups(op) => {
                write!(f, "Reduction '{}' is undefined on an empty group", op)
            }
            LimbKitError::UnsupportedOperation(op) => {
                write!(f, "Unsupported operation: {}", op)
            }
            LimbKitError::UnknownHandle(id) => {
                write!(f, "Unknown handle: {}", id)
            }
            LimbKitError::InvalidArgument(msg) => {
                write!(f, "Invalid argument: {}", msg)
            }
        }
    }
}

impl std::error::Error for LimbKitError {}

/// Result type alias for limbkit operations
pub type Result<T> = std::result::Result<T, LimbKitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_shape_display() {
        let err = LimbKitError::Shape("limb array 1 has length 3, expected 4".to_string());
        assert_eq!(
            format!("{}", err),
            "Shape error: limb array 1 has length 3, expected 4"
        );
    }

    #[test]
    fn test_index_out_of_bounds_display() {
        let err = LimbKitError::IndexOutOfBounds { index: -1, len: 5 };
        assert_eq!(format!("{}", err), "Index -1 out of bounds (len: 5)");

        let err = LimbKitError::IndexOutOfBounds {
            index: i128::from(u64::MAX),
            len: 0,
        };
        assert!(format!("{}", err).contains("18446744073709551615"));
    }

    #[test]
    fn test_precision_loss_display() {
        let err = LimbKitError::PrecisionLoss {
            index: 2,
            new_limbs: 1,
        };
        assert_eq!(
            format!("{}", err),
            "Precision loss: value at index 2 does not fit in 1 limbs"
        );
    }

    #[test]
    fn test_no_groups_and_unsupported_display() {
        let err = LimbKitError::NoGroups("argmax".to_string());
        assert_eq!(
            format!("{}", err),
            "Reduction 'argmax' is undefined on an empty group"
        );

        let err = LimbKitError::UnsupportedOperation("median".to_string());
        assert_eq!(format!("{}", err), "Unsupported operation: median");
    }

    #[test]
    fn test_error_equality_and_clone() {
        let err1 = LimbKitError::Type("any".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
        assert_ne!(err1, LimbKitError::Type("all".to_string()));
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            LimbKitError::Shape("msg".to_string()),
            LimbKitError::IndexOutOfBounds { index: 0, len: 0 },
            LimbKitError::PrecisionLoss {
                index: 0,
                new_limbs: 0,
            },
            LimbKitError::Type("msg".to_string()),
            LimbKitError::NoGroups("min".to_string()),
            LimbKitError::UnsupportedOperation("op".to_string()),
            LimbKitError::UnknownHandle(7),
            LimbKitError::InvalidArgument("msg".to_string()),
        ];

        for err in errors {
            assert!(!format!("{}", err).is_empty());
            assert!(!format!("{:?}", err).is_empty());
            assert!(err.source().is_none());
        }
    }
}
