//! Error types for the persistent key-value store.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the persistent key-value store and its backends.
#[derive(Debug, Error, uniffi::Error)]
pub enum StorageError {
    /// The platform backend refused or failed a read.
    #[error("storage read error: {0}")]
    Read(String),

    /// The platform backend refused or failed a write (e.g. storage exhausted, permission denied).
    #[error("storage write error: {0}")]
    Write(String),

    /// A value could not be encoded for persistence.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An in-memory lock guarding storage state was poisoned.
    #[error("storage lock error: {0}")]
    Lock(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StorageError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}
