//! Persisted in-memory collections.
//!
//! A [`PersistentStore`] holds an ordered collection, loads it from a
//! [`KeyValuePersistence`] backend (falling back to seed data) and writes the
//! whole collection back after every mutation.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::persistence::{KeyValuePersistence, StorageError};

/// Entity-level invariants checked when loading persisted data.
///
/// Persisted data that parses but violates these is discarded in favour of
/// the seed collection.
pub trait Validate {
    /// Describe the first violated invariant, if any.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the entity is invalid.
    fn validate(&self) -> Result<(), String>;
}

/// Where a store's initial contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the persistence backend.
    Persisted,
    /// Nothing persisted under the key.
    SeedMissing,
    /// Persisted bytes were undecodable or violated invariants.
    SeedRejected,
}

/// Decode and validate persisted bytes, returning the reason on failure.
fn decode_validated<T: DeserializeOwned + Validate>(bytes: &[u8]) -> Result<T, String> {
    let value: T = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    value.validate()?;
    Ok(value)
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate().map_err(|e| format!("item {i}: {e}")))
    }
}

// =============================================================================
// PersistentStore
// =============================================================================

/// An ordered entity collection with load / mutate / persist semantics.
pub struct PersistentStore<T> {
    key: &'static str,
    items: Vec<T>,
    persistence: Arc<dyn KeyValuePersistence>,
    source: LoadSource,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned + Validate + Clone,
{
    /// Load the collection stored under `key`, or `seed` when absent or malformed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself cannot be read.
    pub fn load(
        persistence: Arc<dyn KeyValuePersistence>,
        key: &'static str,
        seed: Vec<T>,
    ) -> Result<Self, StorageError> {
        let (items, source) = match persistence.get(key)? {
            None => {
                debug!(key, "No persisted data, using seed");
                (seed, LoadSource::SeedMissing)
            }
            Some(bytes) => match decode_validated::<Vec<T>>(&bytes) {
                Ok(items) => {
                    debug!(key, count = items.len(), "Loaded persisted collection");
                    (items, LoadSource::Persisted)
                }
                Err(reason) => {
                    warn!(key, %reason, "Discarding malformed persisted data, using seed");
                    (seed, LoadSource::SeedRejected)
                }
            },
        };

        Ok(Self {
            key,
            items,
            persistence,
            source,
        })
    }

    /// The persistence key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Where the initial contents came from.
    #[must_use]
    pub const fn source(&self) -> LoadSource {
        self.source
    }

    /// The current collection, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// First item matching `pred`.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|&item| pred(item))
    }

    /// All items matching `pred`, cloned.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.items.iter().filter(|&item| pred(item)).cloned().collect()
    }

    /// Apply `update` to the collection and persist the result.
    ///
    /// The update runs on a working copy; the in-memory collection is only
    /// replaced once the write succeeds, so a storage failure leaves both
    /// memory and storage at the previous state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be encoded or written.
    pub fn mutate<R>(&mut self, update: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, StorageError> {
        let mut next = self.items.clone();
        let result = update(&mut next);
        self.write(&next)?;
        self.items = next;
        Ok(result)
    }

    /// Persist the current collection without changing it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be encoded or written.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.write(&self.items)
    }

    fn write(&self, items: &[T]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(items).map_err(|source| StorageError::Encode {
            key: self.key.to_owned(),
            source,
        })?;
        self.persistence.put(self.key, &bytes)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PersistentStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("key", &self.key)
            .field("len", &self.items.len())
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// PersistentSlot
// =============================================================================

/// A single optional persisted value; clearing it removes the key.
pub struct PersistentSlot<T> {
    key: &'static str,
    value: Option<T>,
    persistence: Arc<dyn KeyValuePersistence>,
}

impl<T> PersistentSlot<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    /// Load the value stored under `key`; malformed data loads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself cannot be read.
    pub fn load(
        persistence: Arc<dyn KeyValuePersistence>,
        key: &'static str,
    ) -> Result<Self, StorageError> {
        let value = match persistence.get(key)? {
            None => None,
            Some(bytes) => match decode_validated::<T>(&bytes) {
                Ok(value) => Some(value),
                Err(reason) => {
                    warn!(key, %reason, "Discarding malformed persisted value");
                    None
                }
            },
        };

        Ok(Self {
            key,
            value,
            persistence,
        })
    }

    /// The current value.
    #[must_use]
    pub const fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Store a new value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be encoded or written.
    pub fn set(&mut self, value: T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(&value).map_err(|source| StorageError::Encode {
            key: self.key.to_owned(),
            source,
        })?;
        self.persistence.put(self.key, &bytes)?;
        self.value = Some(value);
        Ok(())
    }

    /// Remove the value and its persisted key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.persistence.remove(self.key)?;
        self.value = None;
        Ok(())
    }
}
