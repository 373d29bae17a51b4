//! Backend selection from a JSON file and command-line flags.
//!
//! The file is a flat JSON object. `name` names the configuration; every
//! other member becomes a backend setting:
//!
//! ```json
//! { "name": "home", "backend": "file", "path": "contacts.objdb", "sync_on_write": true }
//! ```

use crate::error::{CliError, CliResult};
use objdb_backend::{BackendConfig, KEY_BACKEND, KEY_PATH};
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Data file used when neither flags nor a config file name one.
pub const DEFAULT_PATH: &str = "contacts.objdb";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    settings: BTreeMap<String, Json>,
}

/// Reads a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON object, or
/// holds a nested value.
pub fn load(path: &Path) -> CliResult<BackendConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|message| CliError::ConfigFormat {
        path: path.to_path_buf(),
        message,
    })
}

fn parse(text: &str) -> Result<BackendConfig, String> {
    let file: ConfigFile = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let mut config = BackendConfig::new(file.name.unwrap_or_else(|| "contacts".to_string()));
    for (key, value) in file.settings {
        let value = match value {
            Json::String(s) => s,
            Json::Bool(b) => b.to_string(),
            Json::Number(n) => n.to_string(),
            Json::Null | Json::Array(_) | Json::Object(_) => {
                return Err(format!("setting {key} must be a string, number or boolean"));
            }
        };
        config.set(key, value);
    }
    Ok(config)
}

/// Builds the backend configuration for one invocation.
///
/// Flags override the file. Without either, contacts live in
/// [`DEFAULT_PATH`] in the working directory.
///
/// # Errors
///
/// Same as [`load`].
pub fn resolve(
    file: Option<&Path>,
    backend: Option<&str>,
    path: Option<&PathBuf>,
) -> CliResult<BackendConfig> {
    let mut config = match file {
        Some(file) => load(file)?,
        None => BackendConfig::new("contacts"),
    };
    if let Some(backend) = backend {
        config.set(KEY_BACKEND, backend);
    }
    if let Some(path) = path {
        config.set(KEY_PATH, path.display().to_string());
    }
    if config.get(KEY_BACKEND).is_none() {
        config.set(KEY_BACKEND, "file");
    }
    if config.get(KEY_BACKEND) == Some("file") && config.get(KEY_PATH).is_none() {
        config.set(KEY_PATH, DEFAULT_PATH);
    }
    Ok(config)
}
