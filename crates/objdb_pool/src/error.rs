//! Error types for pool operations.

use thiserror::Error;

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while allocating from or accessing a pool.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Blocks of zero bytes cannot be pooled.
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// The block size exceeds the configured page size.
    #[error("block size {block_size} exceeds page size {page_size}")]
    BlockTooLarge {
        /// Requested block size.
        block_size: usize,
        /// Configured page size.
        page_size: usize,
    },

    /// The pool reached its configured page limit.
    #[error("pool exhausted: page limit of {max_pages} reached")]
    Exhausted {
        /// Configured page limit.
        max_pages: usize,
    },

    /// The system allocator refused a backing page.
    #[error("backing allocation of {bytes} bytes failed")]
    AllocationFailed {
        /// Size of the failed allocation.
        bytes: usize,
    },

    /// A block access went past the end of the block.
    #[error("access out of bounds: offset {offset}, len {len}, block size {block_size}")]
    OutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Size of the block.
        block_size: usize,
    },

    /// The block was handed out by a different pool.
    #[error("block does not belong to this pool")]
    ForeignBlock,
}
