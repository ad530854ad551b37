//! Cache that stores nothing.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;

/// Stand-in when Redis is not configured or unreachable at startup.
///
/// Writes are dropped and every read misses, so the look-aside repository
/// always falls through to the store and invalidation is trivially
/// successful.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _keys: &[String]) -> CacheResult<()> {
        Ok(())
    }

    async fn hash_get(&self, _hash: &str, _field: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn hash_set(&self, _hash: &str, _field: &str, _value: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
