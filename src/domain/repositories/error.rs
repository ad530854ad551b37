//! Errors surfaced by book repositories and forwarded by the service layer.

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::cache::CacheError;
use crate::infrastructure::database::ConnectionError;

/// Failure of a repository operation.
///
/// Repositories return these unmodified; the usecase layer logs and forwards
/// them, and [`crate::error::AppError`] decides the HTTP status.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("book {id} not found")]
    NotFound { id: i64 },

    #[error("book {id} already exists")]
    AlreadyExists { id: i64 },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("cache payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(#[from] ConnectionError),

    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl RepositoryError {
    /// Returns true for the "no such live book" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
