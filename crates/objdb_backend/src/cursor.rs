//! Row cursors returned by reads.

use crate::error::BackendResult;
use objdb_value::ValueSet;
use std::fmt;

/// A raw backend row: one value per field of the object, in schema order.
///
/// Values carry whatever representation the backend stores; the object
/// layer coerces them to the declared field types.
pub type Row = ValueSet;

/// A forward-only stream of rows.
///
/// Dropping the cursor releases whatever the backend holds for it.
pub struct RowCursor {
    rows: Box<dyn Iterator<Item = BackendResult<Row>> + Send>,
}

impl RowCursor {
    /// Wraps a backend iterator.
    pub fn new<I>(rows: I) -> Self
    where
        I: Iterator<Item = BackendResult<Row>> + Send + 'static,
    {
        Self {
            rows: Box::new(rows),
        }
    }

    /// A cursor over already materialised rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }

    /// A cursor that yields nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for RowCursor {
    type Item = BackendResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCursor").finish_non_exhaustive()
    }
}
