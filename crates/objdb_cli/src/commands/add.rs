//! Add command implementation.

use super::{contacts, groups, text, year};
use crate::error::{CliError, CliResult};
use objdb_core::Connection;
use objdb_value::{Field, FieldList, Value, ValueSet};
use tracing::info;

/// Adds one contact and returns its key.
///
/// # Errors
///
/// Returns a usage error for an unknown group, or the object layer's error.
pub fn run(conn: &Connection, name: &str, birth_year: u32, group: Option<&str>) -> CliResult<Value> {
    let mut fields = FieldList::new().with(text("name")?)?.with(year("birth_year")?)?;
    let mut values = vec![Value::text(name), Value::uint32(birth_year)];

    if let Some(group) = group {
        let set = groups()?;
        let member = set.by_text(group).cloned().ok_or_else(|| {
            CliError::usage(format!("unknown group {group:?}, expected family, friend or work"))
        })?;
        fields.push(Field::enumeration("grp", set)?)?;
        values.push(Value::enumeration(member));
    }

    let key = contacts(conn)?.create(&fields, &ValueSet::from(values))?;
    info!(name, key = %key, "contact added");
    Ok(key)
}
