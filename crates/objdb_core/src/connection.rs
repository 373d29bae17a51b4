//! Connections: a backend handle plus the pools shared by its objects.

use crate::error::{CoreError, CoreResult};
use crate::object::Object;
use objdb_backend::{Backend, BackendConfig, BackendKind, FileBackend, InMemoryBackend};
use objdb_pool::{BlockPool, PoolConfig};
use objdb_value::FieldList;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Opens the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the configuration names an unknown backend or the
/// backend fails to connect.
pub fn connect(config: &BackendConfig) -> CoreResult<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match config.kind()? {
        BackendKind::Memory => Box::new(InMemoryBackend::connect(config)?),
        BackendKind::File => Box::new(FileBackend::connect(config)?),
    };
    Ok(backend)
}

/// A connected backend.
///
/// Objects borrow the connection, so it always outlives them. After
/// [`Connection::disconnect`] every object operation fails with
/// [`CoreError::NotConnected`].
///
/// The connection also keeps one [`BlockPool`] per block size, created on
/// first use with the connection's [`PoolConfig`].
///
/// # Example
///
/// ```rust
/// use objdb_backend::BackendConfig;
/// use objdb_core::Connection;
///
/// let conn = Connection::open(&BackendConfig::memory("scratch")).unwrap();
/// assert!(conn.is_connected());
/// conn.disconnect().unwrap();
/// assert!(!conn.is_connected());
/// ```
pub struct Connection {
    backend: Box<dyn Backend>,
    pool_config: PoolConfig,
    pools: Mutex<HashMap<usize, Arc<BlockPool>>>,
}

impl Connection {
    /// Connects to the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Same as [`connect`].
    pub fn open(config: &BackendConfig) -> CoreResult<Self> {
        let backend = connect(config)?;
        info!(backend = backend.name(), "connection opened");
        Ok(Self::with_backend(backend))
    }

    /// Wraps an already connected backend.
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            pool_config: PoolConfig::default(),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the configuration used for pools created from now on.
    #[must_use]
    pub fn with_pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Returns the backend if the connection is still open.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] after disconnect.
    pub fn backend(&self) -> CoreResult<&dyn Backend> {
        if self.backend.is_connected() {
            Ok(self.backend.as_ref())
        } else {
            Err(CoreError::NotConnected)
        }
    }

    /// Returns the backend's name.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Returns true until [`Connection::disconnect`].
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.backend.is_connected()
    }

    /// Closes the backend and releases every pool. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if it fails to close cleanly.
    pub fn disconnect(&self) -> CoreResult<()> {
        let pools: Vec<_> = self.pools.lock().drain().collect();
        for (block_size, pool) in pools {
            match Arc::try_unwrap(pool) {
                Ok(pool) => {
                    pool.release();
                }
                Err(_) => {
                    warn!(block_size, "pool still shared at disconnect; released by last owner");
                }
            }
        }
        if self.backend.is_connected() {
            self.backend.disconnect()?;
            info!(backend = self.backend.name(), "connection closed");
        }
        Ok(())
    }

    /// Returns the pool for blocks of `block_size` bytes, creating it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if `block_size` is zero or
    /// larger than the configured page size, and
    /// [`CoreError::NotConnected`] after disconnect.
    pub fn pool(&self, block_size: usize) -> CoreResult<Arc<BlockPool>> {
        if !self.is_connected() {
            return Err(CoreError::NotConnected);
        }
        if block_size == 0 || block_size > self.pool_config.page_size {
            return Err(CoreError::invalid_argument(format!(
                "block size {block_size} must be between 1 and the page size {}",
                self.pool_config.page_size
            )));
        }
        let mut pools = self.pools.lock();
        let pool = pools
            .entry(block_size)
            .or_insert_with(|| Arc::new(BlockPool::new(block_size, self.pool_config.clone())));
        Ok(Arc::clone(pool))
    }

    /// Builds an object bound to this connection.
    ///
    /// # Errors
    ///
    /// Same as [`Object::new`].
    pub fn object(
        &self,
        table: impl Into<String>,
        primary_key: impl Into<String>,
        fields: FieldList,
    ) -> CoreResult<Object<'_>> {
        Object::new(self, table, primary_key, fields)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.backend.name())
            .field("connected", &self.is_connected())
            .field("pools", &self.pools.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_dispatches_by_kind() {
        let conn = Connection::open(&BackendConfig::memory("m")).unwrap();
        assert_eq!(conn.backend_name(), "m");

        let err = Connection::open(&BackendConfig::new("x").with("backend", "nosuch")).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::InvalidArgument);
    }

    #[test]
    fn backend_after_disconnect() {
        let conn = Connection::open(&BackendConfig::memory("m")).unwrap();
        assert!(conn.backend().is_ok());
        conn.disconnect().unwrap();
        conn.disconnect().unwrap();
        assert!(matches!(conn.backend(), Err(CoreError::NotConnected)));
    }

    #[test]
    fn pools_are_shared_per_size() {
        let conn = Connection::open(&BackendConfig::memory("m"))
            .unwrap()
            .with_pool_config(PoolConfig::new().page_size(1024));
        let a = conn.pool(32).unwrap();
        let b = conn.pool(32).unwrap();
        let c = conn.pool(64).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.config().page_size, 1024);

        assert!(matches!(conn.pool(0), Err(CoreError::InvalidArgument { .. })));
        assert!(matches!(conn.pool(2048), Err(CoreError::InvalidArgument { .. })));
    }

    #[test]
    fn disconnect_releases_pools() {
        let conn = Connection::open(&BackendConfig::memory("m")).unwrap();
        {
            let pool = conn.pool(16).unwrap();
            let block = pool.allocate().unwrap();
            pool.deallocate(block).unwrap();
        }
        conn.disconnect().unwrap();
        assert!(matches!(conn.pool(16), Err(CoreError::NotConnected)));
    }
}
