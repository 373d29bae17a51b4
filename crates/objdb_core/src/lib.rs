//! # objdb Core
//!
//! The object layer of objdb: connections, schema-checked CRUD and lazy
//! result lists over any [`Backend`](objdb_backend::Backend).
//!
//! ## Overview
//!
//! - [`Connection`] opens a backend from a
//!   [`BackendConfig`](objdb_backend::BackendConfig) and owns the block
//!   pools its callers share
//! - [`Object`] binds a table, a primary-key column and a schema to a
//!   connection and validates every request before the backend sees it
//! - [`ResultList`] coerces backend rows to the schema as they are pulled
//!
//! Errors carry a stable [`ErrorCode`] with a fixed message from
//! [`error_string`].
//!
//! ## Example
//!
//! ```rust
//! use objdb_backend::{BackendConfig, Clause, ClauseList};
//! use objdb_core::Connection;
//! use objdb_value::{Field, FieldList, Value, ValueSet, ValueType};
//!
//! let conn = Connection::open(&BackendConfig::memory("contacts")).unwrap();
//! let fields = FieldList::new()
//!     .with(Field::new("name", ValueType::Text).unwrap())
//!     .unwrap()
//!     .with(Field::new("birth_year", ValueType::UInt32).unwrap())
//!     .unwrap();
//! let contacts = conn.object("contacts", "id", fields.clone()).unwrap();
//!
//! contacts
//!     .create(&fields, &ValueSet::from(vec![Value::text("Alice"), Value::uint32(1990)]))
//!     .unwrap();
//!
//! let alice = ClauseList::from(Clause::equal("name", "Alice"));
//! assert_eq!(contacts.count(None, Some(&alice)).unwrap(), 1);
//! assert_eq!(contacts.delete(Some(&alice)).unwrap(), 1);
//! assert_eq!(contacts.read(None, Some(&alice)).unwrap().count(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
mod object;
mod result;

pub use connection::{connect, Connection};
pub use error::{error_string, CoreError, CoreResult, ErrorCode};
pub use object::Object;
pub use result::ResultList;

pub use objdb_backend as backend;
pub use objdb_pool as pool;
pub use objdb_value as value;
