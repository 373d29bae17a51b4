//! Test fixtures and connection helpers.
//!
//! The contact schema used across objdb's tests:
//!
//! | field        | type        |
//! |--------------|-------------|
//! | `id`         | primary key |
//! | `name`       | text        |
//! | `birth_year` | uint32      |
//! | `grp`        | enum        |

use objdb_backend::BackendConfig;
use objdb_core::{Connection, Object};
use objdb_value::{EnumSet, EnumValue, Field, FieldList, Value, ValueSet, ValueType};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Table holding contacts.
pub const CONTACT_TABLE: &str = "contacts";
/// Primary-key column of [`CONTACT_TABLE`].
pub const CONTACT_KEY: &str = "id";

/// A connection with automatic cleanup of its data file.
pub struct TestConnection {
    /// The connection.
    pub conn: Connection,
    path: Option<PathBuf>,
    _temp_dir: Option<TempDir>,
}

impl TestConnection {
    /// Opens an in-memory connection.
    pub fn memory() -> Self {
        Self {
            conn: Connection::open(&BackendConfig::memory("test"))
                .expect("Failed to open memory connection"),
            path: None,
            _temp_dir: None,
        }
    }

    /// Opens a file connection in a fresh temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("contacts.objdb");
        let conn =
            Connection::open(&file_config(&path)).expect("Failed to open file connection");
        Self {
            conn,
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the data file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Disconnects and opens the same data file again.
    ///
    /// In-memory connections come back empty.
    pub fn reopen(self) -> Self {
        self.conn.disconnect().expect("Failed to disconnect");
        let conn = match &self.path {
            Some(path) => Connection::open(&file_config(path)),
            None => Connection::open(&BackendConfig::memory("test")),
        }
        .expect("Failed to reopen connection");
        Self {
            conn,
            path: self.path,
            _temp_dir: self._temp_dir,
        }
    }
}

impl std::ops::Deref for TestConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

/// Returns a file backend configuration for `path`.
pub fn file_config(path: &Path) -> BackendConfig {
    BackendConfig::file("test", path)
}

/// Runs a test with a temporary in-memory connection.
pub fn with_memory_connection<F, R>(f: F) -> R
where
    F: FnOnce(&Connection) -> R,
{
    let test = TestConnection::memory();
    f(&test.conn)
}

/// Runs a test with a temporary file connection.
pub fn with_file_connection<F, R>(f: F) -> R
where
    F: FnOnce(&Connection, &Path) -> R,
{
    let test = TestConnection::file();
    let path = test.path().expect("File connection should have a path");
    f(&test.conn, path)
}

/// Runs `f` once against a memory connection and once against a file one.
pub fn with_each_backend<F>(mut f: F)
where
    F: FnMut(&Connection),
{
    with_memory_connection(&mut f);
    with_file_connection(|conn, _| f(conn));
}

/// The contact groups: family, friend and work.
pub fn contact_groups() -> EnumSet {
    EnumSet::new([("family", 0), ("friend", 1), ("work", 2)]).expect("valid contact groups")
}

/// Returns the member of [`contact_groups`] named `text`.
pub fn contact_group(text: &str) -> EnumValue {
    contact_groups()
        .by_text(text)
        .cloned()
        .expect("unknown contact group")
}

/// The full contact schema.
pub fn contact_fields() -> FieldList {
    FieldList::new()
        .with(Field::new(CONTACT_KEY, ValueType::PrimaryKey).expect("id field"))
        .and_then(|l| l.with(Field::new("name", ValueType::Text).expect("name field")))
        .and_then(|l| l.with(Field::new("birth_year", ValueType::UInt32).expect("year field")))
        .and_then(|l| l.with(Field::enumeration("grp", contact_groups()).expect("grp field")))
        .expect("valid contact schema")
}

/// The writable contact fields without the group: `name`, `birth_year`.
pub fn name_year_fields() -> FieldList {
    FieldList::new()
        .with(Field::new("name", ValueType::Text).expect("name field"))
        .and_then(|l| l.with(Field::new("birth_year", ValueType::UInt32).expect("year field")))
        .expect("valid field list")
}

/// Values pairing with [`name_year_fields`].
pub fn name_year_values(name: &str, birth_year: u32) -> ValueSet {
    ValueSet::from(vec![Value::text(name), Value::uint32(birth_year)])
}

/// Builds the contact object on `conn`.
pub fn contact_object(conn: &Connection) -> Object<'_> {
    conn.object(CONTACT_TABLE, CONTACT_KEY, contact_fields())
        .expect("valid contact object")
}

/// Inserts contacts by name and birth year, returning their keys.
pub fn populate_contacts(contacts: &Object<'_>, people: &[(&str, u32)]) -> Vec<Value> {
    let fields = name_year_fields();
    people
        .iter()
        .map(|(name, year)| {
            contacts
                .create(&fields, &name_year_values(name, *year))
                .expect("Failed to create contact")
        })
        .collect()
}
