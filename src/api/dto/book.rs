//! DTOs for the book endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Book, BookChanges, NewBook};

/// Request body for `POST /v1/books`.
///
/// Missing fields default to empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub description: String,
    pub published_date: String,
}

impl From<CreateBookRequest> for NewBook {
    fn from(req: CreateBookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            description: req.description,
            published_date: req.published_date,
        }
    }
}

/// Request body for `PUT /v1/books`.
///
/// Absent, `null` and empty-string fields all leave the stored value
/// unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
}

impl UpdateBookRequest {
    pub fn into_changes(self) -> (i64, BookChanges) {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        (
            self.id,
            BookChanges {
                title: present(self.title),
                author: present(self.author),
                description: present(self.description),
                published_date: present(self.published_date),
            },
        )
    }
}

/// JSON representation of a book.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub published_date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            published_date: book.published_date,
            created_at: book.created_at,
            updated_at: book.updated_at,
            deleted_at: book.deleted_at,
        }
    }
}
