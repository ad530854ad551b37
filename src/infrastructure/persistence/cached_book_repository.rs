//! Look-aside cache decorator for any [`BookRepository`].

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::entities::{Book, BookUpdate};
use crate::domain::repositories::{BookRepository, RepositoryError};
use crate::infrastructure::cache::{CacheKeys, CacheResult, CacheService};

/// Cache-aside book repository.
///
/// Reads check the cache first and populate it from the inner repository on
/// a miss. Writes go to the inner repository and, once it has committed,
/// drop every cache entry the write made stale.
///
/// Cache failures are asymmetric:
/// - a failed cache **read** is returned to the caller,
/// - a failed **write-back** after a store read is logged and ignored,
/// - a failed **invalidation** after a committed write is logged and
///   returned as [`RepositoryError::Cache`].
///
/// A payload that fails to decode is logged and treated as a miss.
///
/// The write-back after a miss is not ordered against concurrent writes. A
/// read that loads a row, then loses the race to an update whose
/// invalidation runs first, stores the old row. That entry stays stale until
/// the cache TTL expires it (`CACHE_TTL_SECONDS`, one hour by default) or
/// the next write to the same book invalidates it.
pub struct CachedBookRepository {
    inner: Arc<dyn BookRepository>,
    cache: Arc<dyn CacheService>,
    keys: CacheKeys,
}

impl CachedBookRepository {
    pub fn new(inner: Arc<dyn BookRepository>, cache: Arc<dyn CacheService>, keys: CacheKeys) -> Self {
        Self { inner, cache, keys }
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    fn decode<T: DeserializeOwned>(&self, op: &'static str, key: &str, raw: Option<String>) -> Option<T> {
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!("cache_hits_total", "op" => op).increment(1);
                debug!(op, key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                counter!("cache_corrupt_total", "op" => op).increment(1);
                warn!(op, key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    fn encode<T: Serialize>(&self, op: &'static str, key: &str, value: &T) -> Option<String> {
        match serde_json::to_string(value) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(op, key, error = %e, "Failed to encode cache entry");
                None
            }
        }
    }

    fn write_back_failed(&self, op: &'static str, key: &str, result: CacheResult<()>) {
        if let Err(e) = result {
            counter!("cache_write_back_failures_total", "op" => op).increment(1);
            warn!(op, key, error = %e, "Cache write-back failed");
        }
    }

    async fn invalidate(&self, op: &'static str, keys: Vec<String>) -> Result<(), RepositoryError> {
        self.cache.delete(&keys).await.map_err(|e| {
            counter!("cache_invalidation_failures_total", "op" => op).increment(1);
            error!(op, keys = ?keys, error = %e, "Cache invalidation failed after committed write");
            RepositoryError::Cache(e)
        })
    }
}

#[async_trait]
impl BookRepository for CachedBookRepository {
    async fn create(&self, book: &Book) -> Result<(), RepositoryError> {
        self.inner.create(book).await?;

        self.invalidate("create", vec![self.keys.group(), self.keys.count()])
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, RepositoryError> {
        const OP: &str = "find_by_id";
        let key = self.keys.by_id(id);

        let cached = self.cache.get(&key).await?;
        if let Some(book) = self.decode::<Book>(OP, &key, cached) {
            return Ok(book);
        }
        counter!("cache_misses_total", "op" => OP).increment(1);

        let book = self.inner.find_by_id(id).await?;

        if let Some(payload) = self.encode(OP, &key, &book) {
            let result = self.cache.set(&key, &payload).await;
            self.write_back_failed(OP, &key, result);
        }

        Ok(book)
    }

    async fn find_all(&self, page: i64, size: i64) -> Result<Vec<Book>, RepositoryError> {
        const OP: &str = "find_all";
        let group = self.keys.group();
        let field = self.keys.list_field(page, size);

        let cached = self.cache.hash_get(&group, &field).await?;
        if let Some(books) = self.decode::<Vec<Book>>(OP, &field, cached) {
            return Ok(books);
        }
        counter!("cache_misses_total", "op" => OP).increment(1);

        let books = self.inner.find_all(page, size).await?;

        if let Some(payload) = self.encode(OP, &field, &books) {
            let result = self.cache.hash_set(&group, &field, &payload).await;
            self.write_back_failed(OP, &field, result);
        }

        Ok(books)
    }

    async fn count_all(&self) -> Result<i64, RepositoryError> {
        const OP: &str = "count_all";
        let key = self.keys.count();

        let cached = self.cache.get(&key).await?;
        if let Some(count) = self.decode::<i64>(OP, &key, cached) {
            return Ok(count);
        }
        counter!("cache_misses_total", "op" => OP).increment(1);

        let count = self.inner.count_all().await?;

        let result = self.cache.set(&key, &count.to_string()).await;
        self.write_back_failed(OP, &key, result);

        Ok(count)
    }

    async fn update(&self, update: &BookUpdate) -> Result<Book, RepositoryError> {
        self.inner.update(update).await?;

        self.invalidate(
            "update",
            vec![self.keys.group(), self.keys.count(), self.keys.by_id(update.id)],
        )
        .await?;

        self.find_by_id(update.id).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.inner.delete_by_id(id).await?;

        self.invalidate(
            "delete",
            vec![self.keys.by_id(id), self.keys.group(), self.keys.count()],
        )
        .await
    }
}
