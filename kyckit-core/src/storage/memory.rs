//! In-memory backend, used by tests and by ephemeral (non-persisted) sessions.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueBackend;

/// Key-value backend held entirely in memory. Keys are listed in sorted order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |guard| guard.len())
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Lock("memory backend mutex poisoned".to_string())
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: String) -> StorageResult<Option<String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.get(&key).cloned())
    }

    fn write(&self, key: String, value: String) -> StorageResult<()> {
        self.entries
            .write()
            .map_err(|_| poisoned())?
            .insert(key, value);
        Ok(())
    }

    fn delete(&self, key: String) -> StorageResult<()> {
        self.entries.write().map_err(|_| poisoned())?.remove(&key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.keys().cloned().collect())
    }
}
