//! # objdb Value
//!
//! The typed value model shared by every objdb layer.
//!
//! This crate provides:
//! - [`Value`], a tagged datum with an orthogonal primary-key flag
//! - [`ValueSet`], a fixed-length, bounds-checked sequence of values
//! - [`EnumSet`], the text/integer pairs an enum value resolves against
//! - [`Field`] and [`FieldList`], the schema describing one record
//! - [`convert`], free functions converting and comparing values
//!
//! ## Usage
//!
//! ```
//! use objdb_value::{Field, FieldList, Value, ValueSet, ValueType};
//!
//! let mut fields = FieldList::new();
//! fields.push(Field::new("name", ValueType::Text).unwrap()).unwrap();
//! fields.push(Field::new("birth_year", ValueType::UInt32).unwrap()).unwrap();
//!
//! let values = ValueSet::from(vec![Value::text("Alice"), Value::uint32(1990)]);
//! fields.check(&values).unwrap();
//!
//! assert_eq!(values.at(1).unwrap().to_int64().unwrap(), 1990);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod convert;
mod enum_set;
mod error;
mod field;
mod value;
mod value_set;

pub use convert::compare;
pub use enum_set::EnumSet;
pub use error::{ValueError, ValueResult};
pub use field::{Field, FieldList};
pub use value::{Datum, EnumValue, Scalar, Value, ValueType};
pub use value_set::ValueSet;
