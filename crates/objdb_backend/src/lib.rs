//! # objdb Backend
//!
//! The dispatch protocol between objects and storage engines, and the
//! engines bundled with objdb.
//!
//! Objects describe what they want with backend-neutral types: an
//! [`ObjectDesc`] naming the table and schema, [`ClauseList`]s and
//! [`JoinList`]s restricting rows, and [`ValueSet`](objdb_value::ValueSet)s
//! carrying data. A [`Backend`] turns those into storage operations.
//!
//! ## Design Principles
//!
//! - Backends receive validated requests; schema checks happen above them
//! - Persisted layout is private to each backend
//! - Must be `Send + Sync`
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - volatile tables for tests and scratch data
//! - [`FileBackend`] - tables rebuilt from an append-only, checksummed file
//!
//! ## Example
//!
//! ```rust
//! use objdb_backend::{Backend, BackendMeta, Clause, ClauseList, InMemoryBackend, ObjectDesc};
//! use objdb_value::{Field, FieldList, Value, ValueSet, ValueType};
//!
//! let backend = InMemoryBackend::new();
//! let fields = FieldList::new().with(Field::new("name", ValueType::Text).unwrap()).unwrap();
//! let meta = BackendMeta::new();
//! let desc = ObjectDesc::new("people", "id", &fields, &meta);
//!
//! let key = backend
//!     .create(&desc, &fields, &ValueSet::from(vec![Value::text("Alice")]))
//!     .unwrap();
//! assert!(key.is_primary_key());
//!
//! let filter = ClauseList::from(Clause::equal("name", "Alice"));
//! assert_eq!(backend.count(&desc, None, Some(&filter)).unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod cursor;
mod desc;
mod error;
mod file;
mod memory;
mod query;
mod table;

pub use backend::Backend;
pub use config::{BackendConfig, BackendKind, KEY_BACKEND, KEY_PATH, KEY_SYNC_ON_WRITE};
pub use cursor::{Row, RowCursor};
pub use desc::{BackendMeta, ObjectDesc};
pub use error::{BackendError, BackendResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use query::{Clause, ClauseKind, ClauseList, Direction, Join, JoinList, Operator, OrderBy};
