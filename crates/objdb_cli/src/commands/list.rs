//! List command implementation.

use super::{contacts, Contact};
use crate::error::CliResult;
use objdb_backend::{Clause, ClauseList, Direction};
use objdb_core::Connection;

/// Lists contacts by name, optionally filtered.
///
/// # Errors
///
/// Returns the object layer's error.
pub fn run(
    conn: &Connection,
    name: Option<&str>,
    born_after: Option<u32>,
) -> CliResult<Vec<Contact>> {
    let mut clauses = ClauseList::new();
    if let Some(name) = name {
        clauses.push(Clause::equal("name", name));
    }
    if let Some(year) = born_after {
        clauses.push(Clause::greater_than("birth_year", year));
    }
    let clauses = clauses.order_by("name", Direction::Ascending);

    let contacts = contacts(conn)?;
    let mut found = Vec::new();
    for row in contacts.read(None, Some(&clauses))? {
        found.push(Contact::from_row(&row?)?);
    }
    Ok(found)
}

/// Renders contacts as aligned text.
#[must_use]
pub fn render_text(contacts: &[Contact]) -> String {
    let mut out = format!("{:>6}  {:<20} {:>6}  {}\n", "id", "name", "born", "group");
    for c in contacts {
        let born = c.birth_year.map(|y| y.to_string()).unwrap_or_default();
        let group = c.group.as_deref().unwrap_or("-");
        out.push_str(&format!("{:>6}  {:<20} {:>6}  {}\n", c.id, c.name, born, group));
    }
    out
}
