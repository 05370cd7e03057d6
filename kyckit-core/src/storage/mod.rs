//! Persistent key-value storage: platform backend interface, JSON store and
//! the names of the persisted entries.

use std::sync::Arc;

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod store;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::KeyValueStore;
pub use traits::KeyValueBackend;

/// Creates a backend that persists each entry as a file under `root`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
#[uniffi::export]
pub fn new_file_backend(root: String) -> StorageResult<Arc<dyn KeyValueBackend>> {
    Ok(Arc::new(FileBackend::open(root)?))
}

/// Creates a backend that keeps entries in memory only.
#[uniffi::export]
#[must_use]
pub fn new_memory_backend() -> Arc<dyn KeyValueBackend> {
    Arc::new(MemoryBackend::new())
}
