//! JSON-encoding key-value store with self-healing reads.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use super::error::{StorageError, StorageResult};
use super::keys;
use super::traits::KeyValueBackend;

/// Persistent key-value store layered over a platform [`KeyValueBackend`].
///
/// Values are stored as JSON text. Reads never fail: a backend read error
/// resolves to `None`, and an entry that no longer decodes is deleted before
/// `None` is returned. The token entry is the exception, it is an opaque
/// string and is handed back verbatim when it is not valid JSON.
///
/// Writes and removals propagate backend failures to the caller.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl KeyValueStore {
    /// Creates a store over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Encodes `value` as JSON and writes it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded or the backend write fails.
    pub fn set<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.backend.write(key.to_string(), encoded)
    }

    /// Writes `value` under `key` without any encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn set_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        self.backend.write(key.to_string(), value.to_string())
    }

    /// Reads and decodes the value under `key`.
    ///
    /// Returns `None` when the key is absent, when the backend cannot be read,
    /// or when the stored text does not decode into `T`. In the last case the
    /// entry is removed so the next read starts clean.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = self.get_raw(key)?;
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Some(value),
            Err(err) if key == keys::TOKEN => {
                serde_json::from_value(serde_json::Value::String(raw)).map_or_else(
                    |_| {
                        log::warn!("token entry does not decode into the requested type: {err}");
                        None
                    },
                    Some,
                )
            }
            Err(err) => {
                log::warn!("discarding corrupted storage entry '{key}': {err}");
                if let Err(remove_err) = self.backend.delete(key.to_string()) {
                    log::warn!("failed to remove corrupted entry '{key}': {remove_err}");
                }
                None
            }
        }
    }

    /// Reads the raw text stored under `key`.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.read(key.to_string()) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("failed to read storage entry '{key}': {err}");
                None
            }
        }
    }

    /// Removes the entry under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.backend.delete(key.to_string())
    }

    /// Removes every entry in `keys`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first backend delete failure.
    pub fn remove_many<I, K>(&self, keys: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.remove(key.as_ref())?;
        }
        Ok(())
    }

    /// Removes every entry in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the keys cannot be listed or an entry cannot be removed.
    pub fn clear_all(&self) -> StorageResult<()> {
        let keys = self.backend.keys()?;
        self.remove_many(keys)
    }

    /// Lists every key in the store. Returns an empty list if the backend
    /// cannot enumerate its keys.
    #[must_use]
    pub fn list_keys(&self) -> Vec<String> {
        self.backend.keys().unwrap_or_else(|err| {
            log::warn!("failed to list storage keys: {err}");
            Vec::new()
        })
    }

    /// Returns `true` if an entry exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore").finish_non_exhaustive()
    }
}
