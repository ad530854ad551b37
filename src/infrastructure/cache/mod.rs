//! Caching layer for book lookups.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`InMemoryCache`] - Process-local map for tests and single-node runs
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! Key layout is defined by [`CacheKeys`].

mod keys;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use keys::{CacheKeys, DEFAULT_NAMESPACE};
pub use memory_cache::InMemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
