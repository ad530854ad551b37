//! Book entity and its write-side inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A book record.
///
/// `id` is minted by [`crate::utils::id_generator::IdGenerator`] before the row
/// reaches the store and never changes afterwards. A book with `deleted_at`
/// set is a tombstone: it is excluded from every read.
///
/// The entity round-trips through the cache as JSON, so the serde shape is
/// part of the cache format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub published_date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Builds a live book with both timestamps set to `now`.
    pub fn new(id: i64, input: NewBook, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            author: input.author,
            description: input.description,
            published_date: input.published_date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the book has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies the present fields of `update` and refreshes `updated_at`.
    pub fn apply(&mut self, update: &BookUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(author) = &update.author {
            self.author = author.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(published_date) = &update.published_date {
            self.published_date = published_date.clone();
        }
        self.updated_at = update.updated_at;
    }
}

/// Input data for creating a new book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub published_date: String,
}

/// Partial update for an existing book.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUpdate {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl BookUpdate {
    pub fn new(id: i64, changes: BookChanges, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: changes.title,
            author: changes.author,
            description: changes.description,
            published_date: changes.published_date,
            updated_at,
        }
    }
}

/// Field changes requested by a caller, before the write timestamp is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
}
