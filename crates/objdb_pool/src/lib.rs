//! # objdb Pool
//!
//! Fixed-size pooled block allocator for objdb.
//!
//! A [`BlockPool`] hands out blocks of one fixed size. Blocks are carved from
//! backing pages that are provisioned lazily and only returned to the system
//! when the whole pool is released. Freed blocks go onto an index-based free
//! list, so allocate and deallocate are O(1).
//!
//! ## Thread Safety
//!
//! Each pool has a single mutex guarding its free list and page provisioning.
//! Block contents are guarded per page, so reads and writes to blocks never
//! contend with allocation.
//!
//! ## Example
//!
//! ```rust
//! use objdb_pool::{BlockPool, PoolConfig};
//!
//! let pool = BlockPool::new(64, PoolConfig::default());
//! let block = pool.allocate_zeroed().unwrap();
//! pool.write(&block, 0, b"hello").unwrap();
//! assert_eq!(&pool.read(&block).unwrap()[..5], b"hello");
//! pool.deallocate(block).unwrap();
//! pool.release();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod pool;

pub use config::{PoolConfig, DEFAULT_PAGE_SIZE};
pub use error::{PoolError, PoolResult};
pub use pool::{Block, BlockPool, PoolStats};
