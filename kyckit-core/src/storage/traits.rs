//! Platform interface for the persistent key-value store.

use super::error::StorageResult;

/// Durable string storage provided by the host platform.
///
/// On iOS this is typically backed by `UserDefaults` or a file in the
/// application support directory, on Android by `SharedPreferences` or
/// internal storage. The store layers JSON encoding and self-healing on top,
/// so implementations only move opaque strings around.
#[uniffi::export(with_foreign)]
pub trait KeyValueBackend: Send + Sync {
    /// Reads the raw value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform storage cannot be read.
    fn read(&self, key: String) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (storage exhausted, permission denied, ...).
    fn write(&self, key: String, value: String) -> StorageResult<()>;

    /// Deletes the value stored under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete(&self, key: String) -> StorageResult<()>;

    /// Lists every key currently present.
    ///
    /// # Errors
    ///
    /// Returns an error if the keys cannot be enumerated.
    fn keys(&self) -> StorageResult<Vec<String>>;
}
