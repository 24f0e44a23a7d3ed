// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory key/value store fake for testing without filesystem I/O.

use seatrush_app_core::store::{KvStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of [`KvStore`] for testing.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another. Writes are counted per key so tests can assert that a
/// record was written exactly once.
///
/// # Example
///
/// ```
/// use seatrush_dry_tests::InMemoryKvStore;
/// use seatrush_app_core::store::StoreService;
///
/// let store = InMemoryKvStore::new();
/// let service = StoreService::new(store.clone());
///
/// service.save("page", "courses").unwrap();
/// assert_eq!(store.save_count(), 1);
/// assert_eq!(store.text("page").as_deref(), Some("\"courses\""));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    data: HashMap<String, Vec<u8>>,
    writes: HashMap<String, usize>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryKvStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed a raw value without counting it as a write.
    pub fn seed(&self, key: &str, raw: &[u8]) {
        self.lock().data.insert(key.to_owned(), raw.to_vec());
    }

    /// Raw value for `key` as UTF-8 text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.lock()
            .data
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    /// Configure the store to fail on load operations.
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Configure the store to fail on save operations.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_on_save = fail;
    }

    /// Number of `load_raw` calls (attempted, not successful).
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Number of `save_raw` calls (attempted, not successful).
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Number of successful writes to `key`.
    pub fn writes_to(&self, key: &str) -> usize {
        self.lock().writes.get(key).copied().unwrap_or(0)
    }

    /// Check if a key exists in the store.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().data.contains_key(key)
    }

    /// Return all keys currently present, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.lock().data.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KvStore for InMemoryKvStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let mut inner = self.lock();
        inner.load_count += 1;
        if inner.fail_on_load {
            return Err(StoreError::Other("simulated load failure".into()));
        }
        inner.data.get(key).cloned().ok_or(StoreError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.save_count += 1;
        if inner.fail_on_save {
            return Err(StoreError::Other("simulated save failure".into()));
        }
        inner.data.insert(key.to_owned(), data.to_vec());
        *inner.writes.entry(key.to_owned()).or_default() += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_on_save {
            return Err(StoreError::Other("simulated save failure".into()));
        }
        inner.data.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_on_save {
            return Err(StoreError::Other("simulated save failure".into()));
        }
        inner.data.clear();
        Ok(())
    }
}
