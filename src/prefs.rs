//! User preference storage.
//!
//! A tiny string key-value store, persisted as a flat TOML table:
//!
//! ```text
//! ~/.config/markcard/preferences.toml
//! preferred-language = "ja"
//! ```
//!
//! Reads never fail. A missing file is an empty store; a file that cannot be
//! read or parsed is logged and treated as empty, so a corrupt preference
//! never blocks rendering. Writes update a single key and keep every other
//! entry, whatever its type. A file that does not parse is never
//! overwritten; `set` fails instead.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PREFERENCES_FILE: &str = "preferences.toml";

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML serialize error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("malformed preferences file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no config directory available for preferences")]
    NoConfigDir,
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Preferences stored in a TOML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store at the platform config dir (`$XDG_CONFIG_HOME/markcard` on Linux).
    pub fn user_default() -> Result<Self, PrefsError> {
        let dir = dirs::config_dir().ok_or(PrefsError::NoConfigDir)?;
        Ok(Self::new(dir.join("markcard").join(PREFERENCES_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole file as a TOML table. A missing file is an empty table.
    fn read_table(&self) -> Result<toml::Table, PrefsError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.parse::<toml::Table>()?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(toml::Table::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_table() {
            Ok(mut table) => match table.remove(key)? {
                toml::Value::String(value) => Some(value),
                other => {
                    tracing::warn!(key, value = %other, "ignoring non-string preference");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable preferences");
                None
            }
        }
    }

    /// Update one key, keeping every other entry as it is. Refuses to
    /// overwrite a file it cannot parse.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&table)?)?;
        tracing::debug!(path = %self.path.display(), key, "preference saved");
        Ok(())
    }
}

/// In-memory store, for callers that must not touch the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
