//! CLI command implementations.
//!
//! Each command takes an open [`Connection`] and returns what it produced,
//! so `main` owns all printing.

pub mod add;
pub mod count;
pub mod list;
pub mod remove;
pub mod update;

use crate::error::{CliError, CliResult};
use objdb_backend::{Clause, ClauseList};
use objdb_core::{Connection, CoreError, Object};
use objdb_value::{EnumSet, Field, FieldList, ValueSet, ValueType};
use serde::Serialize;

/// Table holding contacts.
pub const TABLE: &str = "contacts";
/// Primary-key column.
pub const KEY: &str = "id";

/// The groups a contact can belong to.
pub fn groups() -> CliResult<EnumSet> {
    Ok(EnumSet::new([("family", 0), ("friend", 1), ("work", 2)])?)
}

fn text(name: &str) -> CliResult<Field> {
    Ok(Field::new(name, ValueType::Text)?)
}

fn year(name: &str) -> CliResult<Field> {
    Ok(Field::new(name, ValueType::UInt32)?)
}

/// `id`, `name`, `birth_year`, `grp`.
pub fn schema() -> CliResult<FieldList> {
    Ok(FieldList::new()
        .with(Field::new(KEY, ValueType::PrimaryKey)?)?
        .with(text("name")?)?
        .with(year("birth_year")?)?
        .with(Field::enumeration("grp", groups()?)?)?)
}

/// Binds the contact table to `conn`.
pub fn contacts(conn: &Connection) -> CliResult<Object<'_>> {
    Ok(conn.object(TABLE, KEY, schema()?)?)
}

/// Matches contacts named `name`.
pub fn named(name: &str) -> ClauseList {
    ClauseList::from(Clause::equal("name", name))
}

/// One contact as printed by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// Primary key.
    pub id: String,
    /// Name.
    pub name: String,
    /// Year of birth.
    pub birth_year: Option<u32>,
    /// Group text, if set.
    pub group: Option<String>,
}

impl Contact {
    fn from_row(row: &ValueSet) -> CliResult<Self> {
        let [id, name, birth_year, group] = row.as_slice() else {
            return Err(CliError::Core(CoreError::RowShape {
                expected: 4,
                found: row.len(),
            }));
        };
        Ok(Self {
            id: id.to_text()?,
            name: name.to_text()?,
            birth_year: birth_year.as_uint32(),
            group: group.as_enum().map(|g| g.text().to_string()),
        })
    }
}

#[cfg(test)]
pub(crate) fn memory_connection() -> Connection {
    Connection::open(&objdb_backend::BackendConfig::memory("cli-test")).unwrap()
}
