//! Pagination arithmetic shared by the store and the HTTP layer.

/// Row offset for a 1-indexed `page` of `size` rows.
///
/// Pages below 1 clamp to the first page.
pub fn offset(page: i64, size: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(size).max(0)
}

/// Number of pages needed to hold `count` rows, `ceil(count / size)`.
///
/// Returns 0 when `size` is not positive. Does not overflow for any `size`.
pub fn total_pages(count: i64, size: i64) -> i64 {
    if size <= 0 || count <= 0 {
        return 0;
    }
    count / size + i64::from(count % size != 0)
}
