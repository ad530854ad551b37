//! In-process book store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::entities::{Book, BookUpdate};
use crate::domain::pagination;
use crate::domain::repositories::{BookRepository, RepositoryError};

/// [`BookRepository`] over a sorted map, with the same soft-delete and
/// ordering rules as [`super::PgBookRepository`].
///
/// Counts the reads that reach it, which lets tests assert that a cached
/// lookup never touched the store.
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: Mutex<BTreeMap<i64, Book>>,
    reads: AtomicUsize,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_by_id`, `find_all` and `count_all` calls served.
    pub fn store_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns the stored row, tombstones included.
    pub fn raw(&self, id: i64) -> Option<Book> {
        self.lock().get(&id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<i64, Book>> {
        self.books.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create(&self, book: &Book) -> Result<(), RepositoryError> {
        let mut books = self.lock();
        if books.contains_key(&book.id) {
            return Err(RepositoryError::AlreadyExists { id: book.id });
        }
        books.insert(book.id, book.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, RepositoryError> {
        self.record_read();
        self.lock()
            .get(&id)
            .filter(|book| !book.is_deleted())
            .cloned()
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn find_all(&self, page: i64, size: i64) -> Result<Vec<Book>, RepositoryError> {
        self.record_read();
        let offset = usize::try_from(pagination::offset(page, size)).unwrap_or(usize::MAX);
        let limit = usize::try_from(size.max(0)).unwrap_or(usize::MAX);

        Ok(self
            .lock()
            .values()
            .rev()
            .filter(|book| !book.is_deleted())
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_all(&self) -> Result<i64, RepositoryError> {
        self.record_read();
        let live = self.lock().values().filter(|book| !book.is_deleted()).count();
        Ok(live as i64)
    }

    async fn update(&self, update: &BookUpdate) -> Result<Book, RepositoryError> {
        let mut books = self.lock();
        let book = books
            .get_mut(&update.id)
            .filter(|book| !book.is_deleted())
            .ok_or(RepositoryError::NotFound { id: update.id })?;

        book.apply(update);
        Ok(book.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let mut books = self.lock();
        let book = books
            .get_mut(&id)
            .filter(|book| !book.is_deleted())
            .ok_or(RepositoryError::NotFound { id })?;

        let now = chrono::Utc::now();
        book.deleted_at = Some(now);
        book.updated_at = now;
        Ok(())
    }
}
