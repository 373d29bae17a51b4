//! Backend configuration.

use crate::error::{BackendError, BackendResult};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Key selecting the backend kind.
pub const KEY_BACKEND: &str = "backend";
/// Key naming the data file of the file backend.
pub const KEY_PATH: &str = "path";
/// Key enabling `fsync` after every write in the file backend.
pub const KEY_SYNC_ON_WRITE: &str = "sync_on_write";

/// The storage engines this crate can connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Volatile in-process tables.
    #[default]
    Memory,
    /// Tables replayed from an append-only data file.
    File,
}

impl BackendKind {
    /// Returns the configuration spelling of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> BackendResult<Self> {
        match s {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(BackendError::invalid_config(format!(
                "unknown backend {other:?}, expected memory or file"
            ))),
        }
    }
}

/// A named list of key/value string pairs configuring one backend.
///
/// Keys are unique; setting a key again replaces its value while keeping
/// its original position.
///
/// # Example
///
/// ```rust
/// use objdb_backend::{BackendConfig, BackendKind};
///
/// let config = BackendConfig::new("contacts")
///     .with("backend", "file")
///     .with("path", "/tmp/contacts.db");
///
/// assert_eq!(config.kind().unwrap(), BackendKind::File);
/// assert_eq!(config.get("path"), Some("/tmp/contacts.db"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendConfig {
    name: String,
    entries: Vec<(String, String)>,
}

impl BackendConfig {
    /// Creates an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Creates a configuration for the in-memory backend.
    pub fn memory(name: impl Into<String>) -> Self {
        Self::new(name).with(KEY_BACKEND, BackendKind::Memory.as_str())
    }

    /// Creates a configuration for the file backend at `path`.
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(name)
            .with(KEY_BACKEND, BackendKind::File.as_str())
            .with(KEY_PATH, path.to_string_lossy())
    }

    /// Returns the configuration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builder form of [`BackendConfig::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of `key`, failing if it is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidConfig`] naming the missing key.
    pub fn require(&self, key: &str) -> BackendResult<&str> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BackendError::invalid_config(format!("missing required key {key:?}")))
    }

    /// Parses `key` as a boolean, returning `default` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidConfig`] if the value is not `true`
    /// or `false`.
    pub fn get_bool(&self, key: &str, default: bool) -> BackendResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(BackendError::invalid_config(format!(
                "{key} must be true or false, got {other:?}"
            ))),
        }
    }

    /// Returns the selected backend kind. Defaults to memory.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidConfig`] for an unknown kind.
    pub fn kind(&self) -> BackendResult<BackendKind> {
        self.get(KEY_BACKEND)
            .map_or(Ok(BackendKind::default()), BackendKind::from_str)
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for BackendConfig {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut config = BackendConfig::new("t").with("a", "1").with("b", "2");
        config.set("a", "3");
        let entries: Vec<_> = config.iter().collect();
        assert_eq!(entries, [("a", "3"), ("b", "2")]);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn require_rejects_missing_and_empty() {
        let config = BackendConfig::new("t").with("path", "");
        assert!(matches!(
            config.require("path"),
            Err(BackendError::InvalidConfig(_))
        ));
        assert!(config.require("other").is_err());
    }

    #[test]
    fn kind_defaults_to_memory() {
        assert_eq!(BackendConfig::new("t").kind().unwrap(), BackendKind::Memory);
        assert_eq!(
            BackendConfig::file("t", "/x").kind().unwrap(),
            BackendKind::File
        );
        assert!(BackendConfig::new("t").with("backend", "sqlite").kind().is_err());
    }

    #[test]
    fn bool_values() {
        let config = BackendConfig::new("t")
            .with("yes", "true")
            .with("no", "false")
            .with("bad", "1");
        assert!(config.get_bool("yes", false).unwrap());
        assert!(!config.get_bool("no", true).unwrap());
        assert!(config.get_bool("missing", true).unwrap());
        assert!(config.get_bool("bad", false).is_err());
    }

    #[test]
    fn extend_overrides() {
        let mut config = BackendConfig::memory("t");
        config.extend([("backend", "file"), ("path", "db.log")]);
        assert_eq!(config.kind().unwrap(), BackendKind::File);
        assert_eq!(config.get("path"), Some("db.log"));
    }
}
