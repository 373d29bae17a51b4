//! Update command implementation.

use super::{contacts, named, year};
use crate::error::CliResult;
use objdb_core::Connection;
use objdb_value::{FieldList, Value, ValueSet};

/// Sets the birth year of every contact named `name`. Returns how many
/// changed.
///
/// # Errors
///
/// Returns the object layer's error.
pub fn run(conn: &Connection, name: &str, birth_year: u32) -> CliResult<u64> {
    let fields = FieldList::new().with(year("birth_year")?)?;
    let values = ValueSet::from(vec![Value::uint32(birth_year)]);
    Ok(contacts(conn)?.update(&fields, &values, Some(&named(name)))?)
}
