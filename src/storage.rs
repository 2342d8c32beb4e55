//! Durable key-value storage for the client session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plays the role browser `localStorage` plays for a web storefront: a flat
//! string-to-string area that survives restarts. The session slice is the only
//! writer; the cart never persists.
//!
//! DESIGN
//! ======
//! Storage is an injected capability (`Arc<dyn DurableStorage>`) so tests can
//! swap the file-backed area for an in-memory one.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ErrorCode;

/// Key holding the raw access token string.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the JSON-serialized current user record.
pub const CURRENT_USER_KEY: &str = "current_user";

/// Errors produced by durable storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value (or the backing file) is not valid JSON.
    #[error("storage serde failed: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_STORAGE_IO",
            Self::Serde(_) => "E_STORAGE_SERDE",
        }
    }
}

/// A persistent string key-value area scoped to one client.
pub trait DurableStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key in the area, including keys this crate never wrote.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Load and decode a JSON value stored under `key`.
///
/// Returns `Ok(None)` when the key is absent.
///
/// # Errors
///
/// Returns a [`StorageError`] if the read fails or the value is not valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn DurableStorage, key: &str) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if encoding or the write fails.
pub fn save_json<T: Serialize>(storage: &dyn DurableStorage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw)
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Process-local storage. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map; keep serving it.
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock().clear();
        Ok(())
    }
}

// =============================================================================
// FILE-BACKED
// =============================================================================

/// Storage backed by a single JSON object file.
///
/// Every mutation rewrites the whole file through a sibling `.tmp` file and a
/// rename. A missing file reads as an empty area, and the parent directory is
/// created on first write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), guard: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(items)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read-modify-write. A file that no longer parses is replaced rather
    /// than blocking every later write.
    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let _held = self.guard.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(StorageError::Serde(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "storage file is corrupt; starting from empty");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut items);
        self.write_all(&items)
    }
}

impl DurableStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _held = self.guard.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|items| {
            items.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _held = self.guard.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.write_all(&BTreeMap::new())
    }
}
