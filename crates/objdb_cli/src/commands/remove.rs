//! Remove command implementation.

use super::{contacts, named};
use crate::error::CliResult;
use objdb_core::Connection;

/// Removes every contact named `name`. Returns how many were removed.
///
/// # Errors
///
/// Returns the object layer's error.
pub fn run(conn: &Connection, name: &str) -> CliResult<u64> {
    Ok(contacts(conn)?.delete(Some(&named(name)))?)
}
