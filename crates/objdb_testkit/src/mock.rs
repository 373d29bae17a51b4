//! A backend that records its calls.
//!
//! Useful for asserting that the object layer rejects bad requests before
//! the backend is reached, and for feeding hand-made rows to result lists.

use objdb_backend::{
    Backend, BackendConfig, BackendError, BackendResult, ClauseList, JoinList, ObjectDesc, Row,
    RowCursor,
};
use objdb_value::{FieldList, Value, ValueSet};
use parking_lot::Mutex;
use std::sync::Arc;

/// One call received by a [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `disconnect` was called.
    Disconnect,
    /// `create` was called with this many fields.
    Create {
        /// Target table.
        table: String,
        /// Number of fields written.
        fields: usize,
    },
    /// `read` was called.
    Read {
        /// Target table.
        table: String,
        /// Number of joins given.
        joins: usize,
        /// Number of clauses given.
        clauses: usize,
    },
    /// `update` was called.
    Update {
        /// Target table.
        table: String,
        /// Number of fields written.
        fields: usize,
    },
    /// `delete` was called.
    Delete {
        /// Target table.
        table: String,
    },
    /// `count` was called.
    Count {
        /// Target table.
        table: String,
    },
}

#[derive(Debug)]
struct MockState {
    connected: bool,
    calls: Vec<MockCall>,
    rows: Vec<Row>,
    affected: u64,
    next_key: u64,
}

/// A backend that records calls and answers with canned data.
///
/// Clones share state, so a test can keep one handle while a
/// [`Connection`](objdb_core::Connection) owns another.
///
/// - `create` returns keys 1, 2, 3...
/// - `read` yields the rows set with [`MockBackend::with_rows`]
/// - `count` returns the number of those rows
/// - `update` and `delete` return the value set with
///   [`MockBackend::with_affected`]
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Creates a connected mock with no rows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                connected: true,
                calls: Vec::new(),
                rows: Vec::new(),
                affected: 0,
                next_key: 1,
            })),
        }
    }

    /// Sets the rows every read yields.
    #[must_use]
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.state.lock().rows = rows;
        self
    }

    /// Sets the count returned by updates and deletes.
    #[must_use]
    pub fn with_affected(self, affected: u64) -> Self {
        self.state.lock().affected = affected;
        self
    }

    /// Returns a boxed handle sharing this mock's state.
    #[must_use]
    pub fn boxed(&self) -> Box<dyn Backend> {
        Box::new(self.clone())
    }

    /// Returns every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Returns true if any call was received.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    fn record(&self, call: MockCall) -> BackendResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.connected {
            Ok(())
        } else {
            Err(BackendError::NotConnected)
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn connect(_config: &BackendConfig) -> BackendResult<Self> {
        Ok(Self::new())
    }

    fn disconnect(&self) -> BackendResult<()> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Disconnect);
        state.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn create(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        _values: &ValueSet,
    ) -> BackendResult<Value> {
        self.record(MockCall::Create {
            table: desc.table.to_string(),
            fields: fields.len(),
        })?;
        let mut state = self.state.lock();
        let key = state.next_key;
        state.next_key += 1;
        Ok(Value::primary_key(key))
    }

    fn read(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<RowCursor> {
        self.record(MockCall::Read {
            table: desc.table.to_string(),
            joins: joins.map_or(0, JoinList::len),
            clauses: clauses.map_or(0, ClauseList::len),
        })?;
        Ok(RowCursor::from_rows(self.state.lock().rows.clone()))
    }

    fn update(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        _values: &ValueSet,
        _clauses: &ClauseList,
    ) -> BackendResult<u64> {
        self.record(MockCall::Update {
            table: desc.table.to_string(),
            fields: fields.len(),
        })?;
        Ok(self.state.lock().affected)
    }

    fn delete(&self, desc: &ObjectDesc<'_>, _clauses: &ClauseList) -> BackendResult<u64> {
        self.record(MockCall::Delete {
            table: desc.table.to_string(),
        })?;
        Ok(self.state.lock().affected)
    }

    fn count(
        &self,
        desc: &ObjectDesc<'_>,
        _joins: Option<&JoinList>,
        _clauses: Option<&ClauseList>,
    ) -> BackendResult<u64> {
        self.record(MockCall::Count {
            table: desc.table.to_string(),
        })?;
        Ok(self.state.lock().rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objdb_backend::BackendMeta;
    use objdb_value::{Field, ValueType};

    #[test]
    fn clones_share_calls() {
        let mock = MockBackend::new().with_affected(3);
        let boxed = mock.boxed();
        let fields = FieldList::new()
            .with(Field::new("n", ValueType::Int32).unwrap())
            .unwrap();
        let meta = BackendMeta::new();
        let desc = ObjectDesc::new("t", "id", &fields, &meta);

        assert_eq!(boxed.delete(&desc, &ClauseList::new()).unwrap(), 3);
        assert_eq!(
            mock.calls(),
            vec![MockCall::Delete {
                table: "t".to_string()
            }]
        );

        boxed.disconnect().unwrap();
        assert!(!mock.is_connected());
        assert!(matches!(
            boxed.count(&desc, None, None),
            Err(BackendError::NotConnected)
        ));
        assert_eq!(mock.call_count(), 3);
    }
}
