use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid slot name: {0:?}")]
    InvalidKey(String),
    #[error("could not create data directory {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// A synchronous string key-value store.
///
/// Reads fail soft (`None`); writes report errors and leave the old value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Directory for the recovery log, if this store is backed by disk
    fn recovery_dir(&self) -> Option<&Path> {
        None
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn recovery_dir(&self) -> Option<&Path> {
        (**self).recovery_dir()
    }
}

/// Slot names become file names, so keep them to a safe alphabet.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// One `<key>.json` file per slot inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::CreateError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        validate_key(key).ok()?;
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                eprintln!("warning: could not read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.slot_path(key);
        if let Err(e) = recovery::atomic_write(&path, value.as_bytes()) {
            recovery::log_recovery(
                &self.dir,
                RecoveryEntry {
                    timestamp: chrono::Utc::now(),
                    category: RecoveryCategory::Write,
                    description: format!("{} write failed", key),
                    fields: vec![
                        ("Target".to_string(), path.display().to_string()),
                        ("Error".to_string(), e.to_string()),
                    ],
                    body: value.to_string(),
                },
            );
            return Err(StoreError::WriteError { path, source: e });
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::WriteError { path, source: e }),
        }
    }

    fn recovery_dir(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store keeping slots in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: IndexMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every `set` fails, for exercising save-failure paths.
    pub fn read_only() -> Self {
        MemoryStore {
            read_only: true,
            ..Default::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        if self.read_only {
            return Err(StoreError::WriteError {
                path: PathBuf::from(key),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
            });
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.slots.shift_remove(key);
        Ok(())
    }
}
