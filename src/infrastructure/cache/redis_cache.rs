//! Redis-backed cache.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// [`CacheService`] over a Redis `ConnectionManager`, which reconnects on
/// its own after a dropped connection.
///
/// Book entries and counts are plain keys; list pages are fields of one
/// hash so a single `DEL` drops every cached page.
pub struct RedisCache {
    conn: ConnectionManager,
    ttl_seconds: Option<u64>,
}

impl RedisCache {
    /// Opens a managed connection and checks it with `PING`.
    ///
    /// `ttl_seconds` is applied to every write; `None` keeps entries until
    /// they are invalidated.
    ///
    /// # Errors
    ///
    /// [`CacheError::ConnectionError`] for a malformed URL, a refused
    /// connection or a failed `PING`.
    pub async fn connect(redis_url: &str, ttl_seconds: Option<u64>) -> CacheResult<Self> {
        let unreachable = |stage: &str, e: redis::RedisError| {
            CacheError::ConnectionError(format!("{stage}: {e}"))
        };

        let client = Client::open(redis_url).map_err(|e| unreachable("invalid Redis URL", e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| unreachable("connect", e))?;

        let cache = Self { conn, ttl_seconds };
        cache
            .connection()
            .ping::<()>()
            .await
            .map_err(|e| unreachable("PING", e))?;

        info!(ttl_seconds = ?ttl_seconds, "Connected to Redis");
        Ok(cache)
    }

    fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value: Option<String> = self.connection().get(key).await?;
        debug!(key, hit = value.is_some(), "GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.connection();
        match self.ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        debug!(key, "SET");
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let removed: i64 = self.connection().del(keys.to_vec()).await?;
        debug!(?keys, removed, "DEL");
        Ok(())
    }

    async fn hash_get(&self, hash: &str, field: &str) -> CacheResult<Option<String>> {
        let value: Option<String> = self.connection().hget(hash, field).await?;
        debug!(hash, field, hit = value.is_some(), "HGET");
        Ok(value)
    }

    async fn hash_set(&self, hash: &str, field: &str, value: &str) -> CacheResult<()> {
        let mut pipe = redis::pipe();
        pipe.atomic().hset(hash, field, value).ignore();
        // One expiry for the whole hash, pushed forward by every page write.
        if let Some(ttl) = self.ttl_seconds {
            pipe.expire(hash, ttl as i64).ignore();
        }
        pipe.query_async::<()>(&mut self.connection()).await?;

        debug!(hash, field, "HSET");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.connection().ping::<()>().await.is_ok()
    }
}
