// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Key/value storage port and the typed JSON service layered on top of it.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage port for raw values keyed by logical name.
///
/// Writes are synchronous and immediately visible to the next read, which is
/// what lets a fresh process observe everything the previous one wrote.
pub trait KvStore {
    /// Load a raw value. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StoreError>;
    /// Persist a raw value, replacing any previous one.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;
    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Remove every value in this store.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).load_raw(key)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        (**self).save_raw(key, data)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes values as JSON and delegates storage to a `KvStore`.
pub struct StoreService<S> {
    store: S,
}

impl<S> StoreService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the inner store.
    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S> StoreService<S>
where
    S: KvStore,
{
    /// Load raw bytes for `key`. Returns `Ok(None)` if missing or empty.
    pub fn load_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load and deserialize a value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        match self.load_bytes(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load a value as text, accepting both a JSON string and a bare string.
    pub fn load_text(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load_bytes(key)?.map(|bytes| {
            serde_json::from_slice::<String>(&bytes)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned())
        }))
    }

    /// Serialize and persist a value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value)?;
        self.store.save_raw(key, &data)
    }

    /// Remove the value stored for `key`.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(key)
    }

    /// Remove every value in the underlying store.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}
