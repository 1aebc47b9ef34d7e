//! Key-value persistence backends.
//!
//! Every store serialises its whole collection to JSON and writes it under a
//! fixed key. Backends only move bytes; they know nothing about entities.
//!
//! # Keys
//!
//! - `user` - the signed-in user, absent when logged out
//! - `orders`, `messages`, `threads`, `shops` - entity collections
//! - `cart`, `payouts` - session cart and seller payout requests

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Persisted key for the signed-in user.
pub const USER_KEY: &str = "user";
/// Persisted key for orders.
pub const ORDERS_KEY: &str = "orders";
/// Persisted key for chat messages.
pub const MESSAGES_KEY: &str = "messages";
/// Persisted key for chat threads.
pub const THREADS_KEY: &str = "threads";
/// Persisted key for shops.
pub const SHOPS_KEY: &str = "shops";
/// Persisted key for the session cart.
pub const CART_KEY: &str = "cart";
/// Persisted key for payout requests.
pub const PAYOUTS_KEY: &str = "payouts";

/// Every key the marketplace writes.
pub const ALL_KEYS: [&str; 7] = [
    USER_KEY,
    ORDERS_KEY,
    MESSAGES_KEY,
    THREADS_KEY,
    SHOPS_KEY,
    CART_KEY,
    PAYOUTS_KEY,
];

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A collection could not be serialised.
    #[error("failed to encode key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key is not usable by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend lock was poisoned by a panicking writer.
    #[error("storage backend lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// Byte-level key-value storage behind every store.
///
/// Implementations must be usable from a single writer; concurrent writers
/// are not coordinated.
pub trait KeyValuePersistence: Send + Sync {
    /// Read the bytes stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryPersistence
// =============================================================================

/// In-process storage; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPersistence {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValuePersistence for MemoryPersistence {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .lock()?
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// FilePersistence
// =============================================================================

/// One JSON file per key under a root directory.
///
/// Writes land in `<key>.json.tmp` and are renamed over `<key>.json`, so a
/// crash mid-write never leaves a truncated collection behind.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    root: PathBuf,
}

impl FilePersistence {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValuePersistence for FilePersistence {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            key: key.to_owned(),
            source,
        };

        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        debug!(key, bytes = value.len(), "Persisted key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_put_remove() {
        let store = MemoryPersistence::new();
        assert!(store.get(ORDERS_KEY).unwrap().is_none());

        store.put(ORDERS_KEY, b"[]").unwrap();
        assert_eq!(store.get(ORDERS_KEY).unwrap().as_deref(), Some(&b"[]"[..]));

        store.remove(ORDERS_KEY).unwrap();
        assert!(store.get(ORDERS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::open(dir.path()).unwrap();

        store.put(THREADS_KEY, br#"[{"id":"t001"}]"#).unwrap();
        let bytes = store.get(THREADS_KEY).unwrap().unwrap();
        assert_eq!(bytes, br#"[{"id":"t001"}]"#);
        assert!(dir.path().join("threads.json").exists());
        assert!(!dir.path().join("threads.json.tmp").exists());
    }

    #[test]
    fn test_file_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::open(dir.path()).unwrap();
        assert!(store.get(USER_KEY).unwrap().is_none());
        store.remove(USER_KEY).unwrap();
    }

    #[test]
    fn test_file_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::open(dir.path()).unwrap();
        assert!(matches!(
            store.put("../escape", b"x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_file_open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FilePersistence::open(&nested).unwrap();
        assert_eq!(store.root(), nested.as_path());
        assert!(nested.is_dir());
    }
}
