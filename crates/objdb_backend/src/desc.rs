//! Object descriptions handed to backends.

use objdb_value::FieldList;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type MetaEntry = Arc<dyn Any + Send + Sync>;

/// Backend-private preparation state cached per object.
///
/// Backends store whatever they can reuse across calls for the same object
/// (resolved column layouts, prepared statements) under a key of their
/// choosing. The owning object drops the cache with itself.
#[derive(Default)]
pub struct BackendMeta {
    entries: Mutex<HashMap<String, MetaEntry>>,
}

impl BackendMeta {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry under `key` if it exists and has type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let entry = self.entries.lock().get(key).cloned()?;
        entry.downcast::<T>().ok()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.entries.lock().insert(key.into(), Arc::new(value));
    }

    /// Returns the entry under `key`, building and caching it on first use.
    ///
    /// An entry of a different type under the same key is replaced.
    pub fn get_or_insert_with<T, F>(&self, key: &str, build: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(key).cloned() {
            if let Ok(typed) = existing.downcast::<T>() {
                return typed;
            }
        }
        let value = Arc::new(build());
        entries.insert(key.to_string(), value.clone());
        value
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for BackendMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        f.debug_struct("BackendMeta").field("keys", &keys).finish()
    }
}

/// A borrowed view of one object: its table, primary key and schema.
#[derive(Debug, Clone, Copy)]
pub struct ObjectDesc<'a> {
    /// Table the object maps to.
    pub table: &'a str,
    /// Name of the primary-key column.
    pub primary_key: &'a str,
    /// Schema of the object, in row order.
    pub fields: &'a FieldList,
    /// Backend cache owned by the object.
    pub meta: &'a BackendMeta,
}

impl<'a> ObjectDesc<'a> {
    /// Creates a description.
    #[must_use]
    pub fn new(
        table: &'a str,
        primary_key: &'a str,
        fields: &'a FieldList,
        meta: &'a BackendMeta,
    ) -> Self {
        Self {
            table,
            primary_key,
            fields,
            meta,
        }
    }
}
