//! CLI errors.

use objdb_core::{error_string, CoreError, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by the `contacts` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// An objdb operation failed.
    #[error("{}: {0}", error_string(.0.code()))]
    Core(#[from] CoreError),

    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        /// Path given with `--config`.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not a JSON object of settings.
    #[error("invalid config {path}: {message}")]
    ConfigFormat {
        /// Path given with `--config`.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// A command-line value was rejected.
    #[error("{}: {0}", error_string(ErrorCode::InvalidArgument))]
    Usage(String),

    /// Output could not be rendered.
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Returns the process exit code: the error code for objdb failures,
    /// 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) => e.code().as_i32(),
            Self::Usage(_) => ErrorCode::InvalidArgument.as_i32(),
            _ => 1,
        }
    }
}

impl From<objdb_value::ValueError> for CliError {
    fn from(err: objdb_value::ValueError) -> Self {
        Self::Core(CoreError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_carry_their_code_message() {
        let err = CliError::from(CoreError::NotConnected);
        assert!(err.to_string().starts_with("not connected"));
        assert_eq!(err.exit_code(), 2);

        let usage = CliError::usage("unknown group \"pals\"");
        assert!(usage.to_string().starts_with("invalid argument"));
    }
}
