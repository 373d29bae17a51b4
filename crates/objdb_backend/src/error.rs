//! Error types for backend operations.

use objdb_value::ValueError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised by backends and the table engine.
#[derive(Debug, Error)]
pub enum BackendError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend was disconnected or never connected.
    #[error("backend is not connected")]
    NotConnected,

    /// The configuration is missing a key or has a bad value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The query references something the engine cannot resolve.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A stored value failed to convert or compare.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// The data file is already opened by another backend.
    #[error("data file is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    /// The data file failed validation.
    #[error("data file corrupted: {0}")]
    Corrupted(String),

    /// A frame's checksum did not match its contents.
    #[error("checksum mismatch at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Offset of the frame in the data file.
        offset: u64,
        /// Checksum stored in the frame.
        expected: u32,
        /// Checksum computed over the payload.
        actual: u32,
    },

    /// A record could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
}

impl BackendError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }
}
