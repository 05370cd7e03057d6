//! Local cache mirrors of backend data.
//!
//! Mirrors are write-through copies kept in the key-value store. Reads go to
//! the backend first and fall back to the mirror when the backend cannot be
//! reached: stale data is preferred over no data. Writes are last-write-wins,
//! there is a single writer per device.

use std::future::Future;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::storage::{KeyValueStore, StorageError, StorageResult};
use crate::types::Document;

/// An entity that can live in a [`CacheMirror`].
pub trait CacheEntity: Serialize + DeserializeOwned + Clone {
    /// Identifier unique within the mirrored collection.
    fn cache_id(&self) -> &str;
}

impl CacheEntity for Document {
    fn cache_id(&self) -> &str {
        &self.id
    }
}

/// Mirror of a collection of entities stored under one key, in insertion order.
pub struct CacheMirror<T> {
    store: KeyValueStore,
    key: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T: CacheEntity> CacheMirror<T> {
    /// Creates a mirror stored under `key`.
    #[must_use]
    pub const fn new(store: KeyValueStore, key: &'static str) -> Self {
        Self {
            store,
            key,
            _entity: PhantomData,
        }
    }

    /// Returns the cached collection, empty if absent.
    #[must_use]
    pub fn read(&self) -> Vec<T> {
        self.store.get(self.key).unwrap_or_default()
    }

    /// Replaces the whole cached collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn replace(&self, entities: &[T]) -> StorageResult<()> {
        self.store.set(self.key, entities)
    }

    /// Replaces the entity with the same id, or appends it.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn upsert(&self, entity: T) -> StorageResult<()> {
        let mut entities = self.read();
        match entities
            .iter_mut()
            .find(|existing| existing.cache_id() == entity.cache_id())
        {
            Some(existing) => *existing = entity,
            None => entities.push(entity),
        }
        self.replace(&entities)
    }

    /// Drops the entity with `id`, if cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn remove(&self, id: &str) -> StorageResult<()> {
        let mut entities = self.read();
        entities.retain(|entity| entity.cache_id() != id);
        self.replace(&entities)
    }

    /// Fetches the collection live and mirrors it.
    ///
    /// On success the cache is replaced by the fetched collection. On failure
    /// the cached collection is returned if it is non-empty, otherwise the
    /// fetch error is propagated.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when nothing is cached, or a storage error if
    /// the fetched collection cannot be mirrored.
    pub async fn read_through<F, Fut, E>(&self, fetch: F) -> Result<Vec<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: From<StorageError> + std::fmt::Display,
    {
        match fetch().await {
            Ok(entities) => {
                self.replace(&entities)?;
                Ok(entities)
            }
            Err(err) => {
                let cached = self.read();
                if cached.is_empty() {
                    return Err(err);
                }
                log::warn!("serving cached '{}' after fetch failure: {err}", self.key);
                Ok(cached)
            }
        }
    }
}

/// Mirror of a single value stored under one key.
pub struct ValueMirror<T> {
    store: KeyValueStore,
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> ValueMirror<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a mirror stored under `key`.
    #[must_use]
    pub const fn new(store: KeyValueStore, key: &'static str) -> Self {
        Self {
            store,
            key,
            _value: PhantomData,
        }
    }

    /// Returns the cached value, if any.
    #[must_use]
    pub fn read(&self) -> Option<T> {
        self.store.get(self.key)
    }

    /// Replaces the cached value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    pub fn write(&self, value: &T) -> StorageResult<()> {
        self.store.set(self.key, value)
    }

    /// Fetches the value live and mirrors it, falling back to the cached value
    /// on failure.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when nothing is cached, or a storage error if
    /// the fetched value cannot be mirrored.
    pub async fn read_through<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<StorageError> + std::fmt::Display,
    {
        match fetch().await {
            Ok(value) => {
                self.write(&value)?;
                Ok(value)
            }
            Err(err) => match self.read() {
                Some(cached) => {
                    log::warn!("serving cached '{}' after fetch failure: {err}", self.key);
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }
}
