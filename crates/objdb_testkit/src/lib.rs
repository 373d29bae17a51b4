//! # objdb Testkit
//!
//! Test utilities for objdb.
//!
//! This crate provides:
//! - [`MockBackend`], a backend that records every call it receives
//! - Fixtures: the contact schema and memory or temp-file connections
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use objdb_testkit::prelude::*;
//!
//! #[test]
//! fn adds_a_contact() {
//!     with_memory_connection(|conn| {
//!         let contacts = contact_object(conn);
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mock;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::mock::*;
}

pub use fixtures::*;
pub use generators::*;
pub use mock::*;
