//! Error types for objdb core.

use objdb_backend::BackendError;
use objdb_pool::PoolError;
use objdb_value::ValueError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in object operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required input was missing or malformed, or values did not match
    /// the schema.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The connection was closed before the call.
    #[error("not connected")]
    NotConnected,

    /// A value failed to convert.
    #[error("conversion failed: {0}")]
    Conversion(#[from] ValueError),

    /// A pool could not provide a block.
    #[error("allocation failed: {0}")]
    Allocation(#[from] PoolError),

    /// The backend failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A backend row did not have one value per field.
    #[error("backend returned a row of {found} values for {expected} fields")]
    RowShape {
        /// Number of fields in the object's schema.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns the stable code of this error's kind.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::NotConnected => ErrorCode::NotConnected,
            Self::Conversion(e) => value_code(e),
            Self::Allocation(_) => ErrorCode::Allocation,
            Self::Backend(e) => match e {
                BackendError::NotConnected => ErrorCode::NotConnected,
                BackendError::InvalidConfig(_) => ErrorCode::InvalidArgument,
                BackendError::Value(v) => value_code(v),
                _ => ErrorCode::Backend,
            },
            Self::RowShape { .. } => ErrorCode::Backend,
        }
    }
}

fn value_code(err: &ValueError) -> ErrorCode {
    if err.is_conversion() {
        ErrorCode::Conversion
    } else {
        ErrorCode::InvalidArgument
    }
}

/// Stable numeric codes for error kinds.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No error.
    Ok = 0,
    /// Missing, empty or malformed input.
    InvalidArgument = 1,
    /// The connection is closed.
    NotConnected = 2,
    /// Overflow, unparseable text or tag mismatch.
    Conversion = 3,
    /// Pool or backing allocator exhausted.
    Allocation = 4,
    /// The backend failed.
    Backend = 5,
}

impl ErrorCode {
    /// Returns the numeric value of this code.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Looks up a code by number.
    #[must_use]
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::InvalidArgument),
            2 => Some(Self::NotConnected),
            3 => Some(Self::Conversion),
            4 => Some(Self::Allocation),
            5 => Some(Self::Backend),
            _ => None,
        }
    }
}

/// Returns the fixed message for an error code.
#[must_use]
pub const fn error_string(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Ok => "success",
        ErrorCode::InvalidArgument => "invalid argument",
        ErrorCode::NotConnected => "not connected",
        ErrorCode::Conversion => "value conversion failed",
        ErrorCode::Allocation => "allocation failed",
        ErrorCode::Backend => "backend failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objdb_value::ValueType;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Ok.as_i32(), 0);
        assert_eq!(ErrorCode::Backend.as_i32(), 5);
        for n in 0..=5 {
            assert_eq!(ErrorCode::from_i32(n).map(ErrorCode::as_i32), Some(n));
        }
        assert_eq!(ErrorCode::from_i32(6), None);
    }

    #[test]
    fn every_code_has_a_message() {
        for n in 0..=5 {
            let code = ErrorCode::from_i32(n).unwrap();
            assert!(!error_string(code).is_empty());
        }
        assert_eq!(error_string(ErrorCode::NotConnected), "not connected");
    }

    #[test]
    fn value_errors_split_by_kind() {
        let conversion = CoreError::from(ValueError::Overflow {
            target: ValueType::Int32,
        });
        assert_eq!(conversion.code(), ErrorCode::Conversion);

        let argument = CoreError::from(ValueError::IndexOutOfRange { index: 1, len: 0 });
        assert_eq!(argument.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn backend_errors_map_to_kinds() {
        assert_eq!(
            CoreError::from(BackendError::NotConnected).code(),
            ErrorCode::NotConnected
        );
        assert_eq!(
            CoreError::from(BackendError::invalid_config("x")).code(),
            ErrorCode::InvalidArgument
        );
        assert_eq!(
            CoreError::from(BackendError::corrupted("x")).code(),
            ErrorCode::Backend
        );
        assert_eq!(
            CoreError::from(PoolError::Exhausted { max_pages: 1 }).code(),
            ErrorCode::Allocation
        );
    }
}
