//! Error types for the value crate.

use crate::value::ValueType;
use thiserror::Error;

/// Result type for value operations.
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors that can occur while building, converting or comparing values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value does not carry the expected tag.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The tag that was required.
        expected: ValueType,
        /// The tag the value actually carries.
        found: ValueType,
    },

    /// The value is empty and has nothing to convert or compare.
    #[error("value is empty")]
    Empty,

    /// The converted value is too large for the target type.
    #[error("conversion overflow: value does not fit in {target}")]
    Overflow {
        /// The conversion target.
        target: ValueType,
    },

    /// The converted value is too small for the target type.
    #[error("conversion underflow: value does not fit in {target}")]
    Underflow {
        /// The conversion target.
        target: ValueType,
    },

    /// Text could not be parsed as a number.
    #[error("cannot parse {text:?} as {target}")]
    Parse {
        /// The offending text.
        text: String,
        /// The conversion target.
        target: ValueType,
    },

    /// An enum value or text is not a member of the enum set.
    #[error("not a member of the enum set: {member}")]
    EnumNotInSet {
        /// Description of the rejected member.
        member: String,
    },

    /// An index was outside a value set.
    #[error("index {index} out of range for value set of size {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The size of the value set.
        len: usize,
    },

    /// A field name is already present in the field list.
    #[error("duplicate field: {name}")]
    DuplicateField {
        /// The duplicated name.
        name: String,
    },

    /// An argument was missing, empty or malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },
}

impl ValueError {
    /// Creates a type mismatch error.
    pub fn mismatch(expected: ValueType, found: ValueType) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Creates an enum membership error.
    pub fn not_in_set(member: impl Into<String>) -> Self {
        Self::EnumNotInSet {
            member: member.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns true if this error came from converting or comparing a value,
    /// as opposed to a malformed argument.
    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::Empty
                | Self::Overflow { .. }
                | Self::Underflow { .. }
                | Self::Parse { .. }
                | Self::EnumNotInSet { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display() {
        let err = ValueError::mismatch(ValueType::Int32, ValueType::Text);
        assert_eq!(err.to_string(), "type mismatch: expected int32, found text");
    }

    #[test]
    fn parse_display() {
        let err = ValueError::Parse {
            text: "12a".to_string(),
            target: ValueType::Int64,
        };
        assert!(err.to_string().contains("\"12a\""));
    }

    #[test]
    fn conversion_classification() {
        assert!(ValueError::Empty.is_conversion());
        assert!(ValueError::Overflow {
            target: ValueType::UInt32
        }
        .is_conversion());
        assert!(!ValueError::IndexOutOfRange { index: 3, len: 2 }.is_conversion());
        assert!(!ValueError::invalid_argument("x").is_conversion());
    }
}
