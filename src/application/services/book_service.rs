//! Book usecases.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::domain::entities::{Book, BookChanges, BookUpdate, NewBook};
use crate::domain::repositories::{BookRepository, RepositoryError};
use crate::utils::id_generator::IdGenerator;

/// Orchestrates book operations over a [`BookRepository`].
///
/// Mints ids and timestamps, bounds every call with a deadline, and logs
/// failures with the operation name and book id. Repository errors are
/// returned unchanged; mapping to HTTP happens in [`crate::error::AppError`].
pub struct BookService<R: BookRepository + ?Sized> {
    repository: Arc<R>,
    ids: IdGenerator,
    request_timeout: Duration,
}

impl<R: BookRepository + ?Sized> BookService<R> {
    pub fn new(repository: Arc<R>, ids: IdGenerator, request_timeout: Duration) -> Self {
        Self {
            repository,
            ids,
            request_timeout,
        }
    }

    /// Creates a book with a fresh id and `created_at = updated_at = now`.
    pub async fn create(&self, input: NewBook) -> Result<Book, RepositoryError> {
        let book = Book::new(self.ids.next_id(), input, Utc::now());

        self.deadline(self.repository.create(&book))
            .await
            .inspect_err(|e| report("create", Some(book.id), e))?;

        Ok(book)
    }

    pub async fn get(&self, id: i64) -> Result<Book, RepositoryError> {
        self.deadline(self.repository.find_by_id(id))
            .await
            .inspect_err(|e| report("get", Some(id), e))
    }

    /// Returns one page of books and the live book count.
    ///
    /// The count is only queried once the page read has succeeded.
    pub async fn list_with_total(&self, page: i64, size: i64) -> Result<(Vec<Book>, i64), RepositoryError> {
        self.deadline(async {
            let books = self.repository.find_all(page, size).await?;
            let total = self.repository.count_all().await?;
            Ok((books, total))
        })
        .await
        .inspect_err(|e| report("list", None, e))
    }

    /// Applies `changes` and returns the stored result.
    pub async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, RepositoryError> {
        let update = BookUpdate::new(id, changes, Utc::now());

        self.deadline(self.repository.update(&update))
            .await
            .inspect_err(|e| report("update", Some(id), e))
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.deadline(self.repository.delete_by_id(id))
            .await
            .inspect_err(|e| report("delete", Some(id), e))
    }

    /// Runs `fut` under the request deadline. On expiry the future is dropped,
    /// cancelling any store query or cache call it had in flight.
    async fn deadline<T>(
        &self,
        fut: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, RepositoryError> {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .unwrap_or(Err(RepositoryError::DeadlineExceeded(self.request_timeout)))
    }
}

fn report(operation: &'static str, book_id: Option<i64>, e: &RepositoryError) {
    if e.is_not_found() {
        warn!(operation, book_id, error = %e, "Book not found");
    } else {
        error!(operation, book_id, error = %e, "Book operation failed");
    }
}
