//! Pagination query parameters and envelope.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::pagination::total_pages;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_SIZE: i64 = 10;

/// Query parameters of `GET /v1/books`.
///
/// Uses `serde_with` to parse numbers from query strings. Values are not
/// range-checked: a page below 1 reads the first page and a non-positive
/// size yields an empty page with `total_pages = 0`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub size: Option<i64>,
}

impl ListBooksQuery {
    /// `(page, size)` with defaults applied.
    pub fn resolve(&self) -> (i64, i64) {
        (
            self.page.unwrap_or(DEFAULT_PAGE),
            self.size.unwrap_or(DEFAULT_SIZE),
        )
    }
}

/// Paginated list response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, size: i64, total: i64) -> Self {
        Self {
            data,
            page,
            size,
            total_pages: total_pages(total, size),
        }
    }
}
