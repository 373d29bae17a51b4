//! Result lists: lazy, forward-only rows of a read.

use crate::error::{CoreError, CoreResult};
use objdb_backend::{Row, RowCursor};
use objdb_value::{FieldList, ValueSet};

/// The rows produced by [`crate::Object::read`].
///
/// Each backend row is coerced to the object's schema only when it is
/// pulled. The list is single-pass: once exhausted, issue a new read to
/// iterate again. The first error ends the list.
#[derive(Debug)]
pub struct ResultList<'o> {
    fields: &'o FieldList,
    cursor: Option<RowCursor>,
    rows_read: usize,
}

impl<'o> ResultList<'o> {
    pub(crate) fn new(fields: &'o FieldList, cursor: RowCursor) -> Self {
        Self {
            fields,
            cursor: Some(cursor),
            rows_read: 0,
        }
    }

    /// Returns the number of rows yielded so far.
    #[must_use]
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Returns true once the backend cursor has been drained, failed or
    /// released.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none()
    }

    /// Returns the schema rows are coerced to.
    #[must_use]
    pub fn fields(&self) -> &FieldList {
        self.fields
    }

    /// Pulls the next row.
    ///
    /// Returns `Ok(None)` when the list is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, [`CoreError::RowShape`] for a row of
    /// the wrong width, or a conversion error if a value does not fit its
    /// field. The list is exhausted afterwards.
    pub fn next_row(&mut self) -> CoreResult<Option<ValueSet>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        let raw = match cursor.next() {
            None => {
                self.cursor = None;
                return Ok(None);
            }
            Some(raw) => raw,
        };
        match raw.map_err(CoreError::from).and_then(|row| self.coerce(&row)) {
            Ok(values) => {
                self.rows_read += 1;
                Ok(Some(values))
            }
            Err(err) => {
                self.cursor = None;
                Err(err)
            }
        }
    }

    fn coerce(&self, row: &Row) -> CoreResult<ValueSet> {
        if row.len() != self.fields.len() {
            return Err(CoreError::RowShape {
                expected: self.fields.len(),
                found: row.len(),
            });
        }
        self.fields
            .iter()
            .zip(row.iter())
            .map(|(field, raw)| field.coerce(raw).map_err(CoreError::from))
            .collect()
    }

    /// Drops the backend cursor without reading the remaining rows.
    pub fn release(mut self) {
        self.cursor = None;
    }
}

impl Iterator for ResultList<'_> {
    type Item = CoreResult<ValueSet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
