//! Repository trait for book data access.

use crate::domain::entities::{Book, BookUpdate};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;

/// Repository interface for books.
///
/// Every read excludes soft-deleted rows.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBookRepository`] - PostgreSQL store
/// - [`crate::infrastructure::persistence::CachedBookRepository`] - look-aside
///   cache decorator over any other implementation
/// - [`crate::infrastructure::persistence::InMemoryBookRepository`] - in-process
///   store for tests and local runs
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Persists a new book.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::AlreadyExists`] if the id is taken.
    async fn create(&self, book: &Book) -> Result<(), RepositoryError>;

    /// Finds a live book by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no live book has this id.
    async fn find_by_id(&self, id: i64) -> Result<Book, RepositoryError>;

    /// Lists live books, newest id first.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed, lower values clamp to 1)
    /// - `size` - Number of items per page
    async fn find_all(&self, page: i64, size: i64) -> Result<Vec<Book>, RepositoryError>;

    /// Counts live books.
    async fn count_all(&self) -> Result<i64, RepositoryError>;

    /// Applies a partial update and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no live book has `update.id`.
    async fn update(&self, update: &BookUpdate) -> Result<Book, RepositoryError>;

    /// Soft-deletes a book by setting `deleted_at`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the book is missing or already
    /// deleted.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}
