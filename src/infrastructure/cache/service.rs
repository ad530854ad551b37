//! Cache service trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the cache backend. A miss is not an error.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend unreachable or the connection dropped.
    #[error("cache connection error: {0}")]
    ConnectionError(String),

    /// Backend reachable but the command failed.
    #[error("cache operation error: {0}")]
    OperationError(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
            Self::ConnectionError(e.to_string())
        } else {
            Self::OperationError(e.to_string())
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// String key/value cache with hash support.
///
/// A miss is `Ok(None)`, never an error. Backend failures are returned as
/// [`CacheError`] and the caller decides whether they matter: the look-aside
/// repository propagates read failures and swallows write-back failures.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::InMemoryCache`] - process-local map
/// - [`crate::infrastructure::cache::NullCache`] - always misses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Reads a plain key.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Writes a plain key.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Removes keys. Missing keys are not an error.
    ///
    /// Used when a book is created, modified, or deleted.
    async fn delete(&self, keys: &[String]) -> CacheResult<()>;

    /// Reads one field of a hash.
    async fn hash_get(&self, hash: &str, field: &str) -> CacheResult<Option<String>>;

    /// Writes one field of a hash.
    async fn hash_set(&self, hash: &str, field: &str, value: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
