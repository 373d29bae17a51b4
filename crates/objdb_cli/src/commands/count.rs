//! Count command implementation.

use super::contacts;
use crate::error::CliResult;
use objdb_core::Connection;

/// Counts all contacts.
///
/// # Errors
///
/// Returns the object layer's error.
pub fn run(conn: &Connection) -> CliResult<u64> {
    Ok(contacts(conn)?.count(None, None)?)
}
