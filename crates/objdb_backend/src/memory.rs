//! In-memory backend.

use crate::backend::Backend;
use crate::config::{BackendConfig, BackendKind};
use crate::cursor::RowCursor;
use crate::desc::ObjectDesc;
use crate::error::{BackendError, BackendResult};
use crate::query::{ClauseList, JoinList};
use crate::table::TableStore;
use objdb_value::{FieldList, Value, ValueSet};
use parking_lot::RwLock;
use tracing::info;

/// A backend keeping every table in memory.
///
/// Suitable for tests and ephemeral data. Disconnecting drops all tables.
///
/// # Thread Safety
///
/// Reads share a lock; writes take it exclusively.
///
/// # Example
///
/// ```rust
/// use objdb_backend::{Backend, BackendConfig, InMemoryBackend};
///
/// let backend = InMemoryBackend::connect(&BackendConfig::memory("test")).unwrap();
/// assert!(backend.is_connected());
/// backend.disconnect().unwrap();
/// assert!(!backend.is_connected());
/// ```
#[derive(Debug)]
pub struct InMemoryBackend {
    name: String,
    store: RwLock<Option<TableStore>>,
}

impl InMemoryBackend {
    /// Creates a connected, empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            store: RwLock::new(Some(TableStore::new())),
        }
    }

    /// Returns the number of rows in `table`, or 0 when disconnected.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.store.read().as_ref().map_or(0, |s| s.row_count(table))
    }

    fn with_store<R>(&self, f: impl FnOnce(&TableStore) -> BackendResult<R>) -> BackendResult<R> {
        let guard = self.store.read();
        let store = guard.as_ref().ok_or(BackendError::NotConnected)?;
        f(store)
    }

    fn with_store_mut<R>(
        &self,
        f: impl FnOnce(&mut TableStore) -> BackendResult<R>,
    ) -> BackendResult<R> {
        let mut guard = self.store.write();
        let store = guard.as_mut().ok_or(BackendError::NotConnected)?;
        f(store)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn connect(config: &BackendConfig) -> BackendResult<Self> {
        let kind = config.kind()?;
        if kind != BackendKind::Memory {
            return Err(BackendError::invalid_config(format!(
                "in-memory backend cannot serve backend = {kind}"
            )));
        }
        info!(name = config.name(), "connected in-memory backend");
        Ok(Self {
            name: config.name().to_string(),
            store: RwLock::new(Some(TableStore::new())),
        })
    }

    fn disconnect(&self) -> BackendResult<()> {
        if let Some(store) = self.store.write().take() {
            info!(
                name = %self.name,
                tables = store.table_count(),
                "disconnected in-memory backend"
            );
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.store.read().is_some()
    }

    fn create(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
    ) -> BackendResult<Value> {
        self.with_store_mut(|store| {
            let mutation = store.plan_insert(desc, fields, values)?;
            let key = mutation.generated_key();
            store.apply(mutation);
            Ok(key)
        })
    }

    fn read(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<RowCursor> {
        self.with_store(|store| {
            let ids = store.matching_ids(desc, joins, clauses)?;
            Ok(RowCursor::from_rows(store.rows(desc, &ids)))
        })
    }

    fn update(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
        clauses: &ClauseList,
    ) -> BackendResult<u64> {
        self.with_store_mut(|store| {
            let mutation = store.plan_update(desc, fields, values, clauses)?;
            Ok(store.apply(mutation))
        })
    }

    fn delete(&self, desc: &ObjectDesc<'_>, clauses: &ClauseList) -> BackendResult<u64> {
        self.with_store_mut(|store| {
            let mutation = store.plan_delete(desc, clauses)?;
            Ok(store.apply(mutation))
        })
    }

    fn count(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<u64> {
        self.with_store(|store| Ok(store.matching_ids(desc, joins, clauses)?.len() as u64))
    }
}
