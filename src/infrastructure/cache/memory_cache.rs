//! Process-local cache backed by a map.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Entries {
    values: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, String>>,
}

/// In-memory [`CacheService`] with Redis key semantics.
///
/// Plain keys and hashes share one key space, as in Redis: deleting a key
/// removes whichever kind it names. Intended for tests and single-process
/// runs. An outage can be simulated with [`InMemoryCache::set_available`].
pub struct InMemoryCache {
    entries: Mutex<Entries>,
    available: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggles a simulated outage. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns true if `key` exists as a plain key or a hash.
    pub fn contains_key(&self, key: &str) -> bool {
        let entries = self.lock();
        entries.values.contains_key(key) || entries.hashes.contains_key(key)
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        let entries = self.lock();
        entries.values.len() + entries.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_available(&self) -> CacheResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::ConnectionError(
                "in-memory cache marked unavailable".to_string(),
            ))
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.lock().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.ensure_available()?;
        let mut entries = self.lock();
        entries.hashes.remove(key);
        entries.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<()> {
        self.ensure_available()?;
        let mut entries = self.lock();
        for key in keys {
            entries.values.remove(key);
            entries.hashes.remove(key);
        }
        Ok(())
    }

    async fn hash_get(&self, hash: &str, field: &str) -> CacheResult<Option<String>> {
        self.ensure_available()?;
        Ok(self
            .lock()
            .hashes
            .get(hash)
            .and_then(|fields| fields.get(field))
            .cloned())
    }

    async fn hash_set(&self, hash: &str, field: &str, value: &str) -> CacheResult<()> {
        self.ensure_available()?;
        let mut entries = self.lock();
        entries.values.remove(hash);
        entries
            .hashes
            .entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
