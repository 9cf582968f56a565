//! Named configuration storage.
//!
//! Configurations are stored as opaque JSON blobs keyed by name. Saving an
//! existing name overwrites it, so the latest write wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Error type for configuration storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request did not name a configuration.
    #[error("configuration name is required")]
    MissingName,
    /// No configuration is stored under the name.
    #[error("configuration \"{0}\" not found")]
    NotFound(String),
    /// The name cannot be used as a storage key.
    #[error("invalid configuration name \"{0}\"")]
    InvalidName(String),
    /// Underlying filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    /// A stored blob is not valid JSON.
    #[error("stored configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store of named configurations.
pub trait ConfigStore {
    /// Stores `data` under `name`, replacing any previous entry.
    fn save(&mut self, name: &str, data: serde_json::Value) -> Result<(), StoreError>;

    /// Returns the blob stored under `name`.
    fn load(&self, name: &str) -> Result<serde_json::Value, StoreError>;

    /// Stored names, sorted and without duplicates.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Removes `name`. Returns `false` if nothing was stored under it.
    fn delete(&mut self, name: &str) -> Result<bool, StoreError>;
}

fn check_name(name: &str) -> Result<&str, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::MissingName);
    }
    Ok(name)
}

/// In-memory store, used by tests and by the API server when no directory
/// is configured.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn save(&mut self, name: &str, data: serde_json::Value) -> Result<(), StoreError> {
        let name = check_name(name)?;
        self.entries.insert(name.to_string(), data);
        debug!(name, "saved configuration in memory");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<serde_json::Value, StoreError> {
        let name = check_name(name)?;
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> Result<bool, StoreError> {
        let name = check_name(name)?;
        Ok(self.entries.remove(name).is_some())
    }
}

/// Directory-backed store: one pretty-printed `<name>.json` file per entry.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let name = check_name(name)?;
        if name.contains(['/', '\\']) || name.contains("..") || name.starts_with('.') {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl ConfigStore for FileStore {
    fn save(&mut self, name: &str, data: serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::write(&path, serde_json::to_string_pretty(&data)?)?;
        info!(path = %path.display(), "saved configuration");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<serde_json::Value, StoreError> {
        let path = self.path_for(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.trim().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn delete(&mut self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "deleted configuration");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
