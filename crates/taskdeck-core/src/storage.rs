//! On-device key/value storage.
//!
//! Values are plain strings, one file per key under the data directory. The
//! in-memory variant backs tests and scripted runs.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StorageError;

/// Key holding the opaque session token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key holding the JSON-serialized task list.
pub const TASKS_KEY: &str = "tasks";

#[derive(Debug, Clone)]
pub enum LocalStorage {
    /// One file per key inside a directory.
    Dir(PathBuf),

    /// Process-local map.
    Memory(Arc<Mutex<HashMap<String, String>>>),
}

impl LocalStorage {
    /// Open directory-backed storage, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Write {
            key: dir.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!("Local storage at {:?}", dir);
        Ok(Self::Dir(dir))
    }

    pub fn in_memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Dir(dir) => {
                let path = Self::key_path(dir, key)?;
                match fs::read_to_string(&path) {
                    Ok(value) => Ok(Some(value)),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(StorageError::Read {
                        key: key.to_string(),
                        message: e.to_string(),
                    }),
                }
            }
            Self::Memory(map) => Ok(map.lock().get(key).cloned()),
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Dir(dir) => {
                let path = Self::key_path(dir, key)?;
                fs::write(&path, value).map_err(|e| StorageError::Write {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
            Self::Memory(map) => {
                map.lock().insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    /// Remove a key. Removing a missing key is not an error.
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Dir(dir) => {
                let path = Self::key_path(dir, key)?;
                match fs::remove_file(&path) {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(StorageError::Write {
                        key: key.to_string(),
                        message: e.to_string(),
                    }),
                }
            }
            Self::Memory(map) => {
                map.lock().remove(key);
                Ok(())
            }
        }
    }

    pub fn has_item(&self, key: &str) -> bool {
        matches!(self.get_item(key), Ok(Some(_)))
    }

    /// Read and deserialize a JSON value. Missing key yields `Ok(None)`.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    pub fn save_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set_item(key, &raw)
    }

    fn key_path(dir: &Path, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(dir.join(key))
    }
}
