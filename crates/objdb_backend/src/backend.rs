//! Backend dispatch protocol.

use crate::config::BackendConfig;
use crate::cursor::RowCursor;
use crate::desc::ObjectDesc;
use crate::error::BackendResult;
use crate::query::{ClauseList, JoinList};
use objdb_value::{FieldList, Value, ValueSet};

/// A storage engine the object layer dispatches to.
///
/// Backends receive fully validated requests: value sets always match their
/// field lists and every field belongs to the object's schema. They own the
/// mapping from objects to persisted rows.
///
/// # Invariants
///
/// - `create` returns the generated primary key, or an empty value if the
///   engine does not generate keys
/// - `read` yields rows with one value per field of `desc.fields`
/// - `update` and `delete` return the number of rows affected; matching
///   nothing is not an error
/// - Every call after `disconnect` fails with
///   [`crate::BackendError::NotConnected`]
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`crate::InMemoryBackend`] - volatile tables
/// - [`crate::FileBackend`] - tables persisted in an append-only data file
pub trait Backend: Send + Sync {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Opens a backend from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the engine cannot
    /// be opened.
    fn connect(config: &BackendConfig) -> BackendResult<Self>
    where
        Self: Sized;

    /// Closes the backend. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if pending data cannot be flushed.
    fn disconnect(&self) -> BackendResult<()>;

    /// Returns true until [`Backend::disconnect`] is called.
    fn is_connected(&self) -> bool;

    /// Inserts one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be stored.
    fn create(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
    ) -> BackendResult<Value>;

    /// Streams the rows of `desc.table` that satisfy the joins and clauses.
    ///
    /// # Errors
    ///
    /// Returns an error if the query references unknown tables or columns,
    /// or a comparison fails.
    fn read(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<RowCursor>;

    /// Sets `fields` to `values` on every row matching `clauses`.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::read`], plus storage failures.
    fn update(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
        clauses: &ClauseList,
    ) -> BackendResult<u64>;

    /// Removes every row matching `clauses`.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::update`].
    fn delete(&self, desc: &ObjectDesc<'_>, clauses: &ClauseList) -> BackendResult<u64>;

    /// Counts the rows [`Backend::read`] would yield.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::read`].
    fn count(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<u64>;
}
