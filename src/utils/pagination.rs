//! Translation between `page`/`size` query parameters and `limit`/`offset`.
use serde::Serialize;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A resolved page request. Pages are numbered from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Requested page.
    pub page: i64,
    /// Rows per page.
    pub limit: i64,
    /// Rows to skip.
    pub offset: i64,
}

impl Pagination {
    /// Resolve optional `page` and `size` parameters.
    ///
    /// Missing or non-positive sizes fall back to `default_size`; sizes are
    /// capped at [`MAX_PAGE_SIZE`]. Negative pages are treated as page 0.
    #[must_use]
    pub fn new(page: Option<i64>, size: Option<i64>, default_size: i64) -> Self {
        let limit = size
            .filter(|size| *size > 0)
            .unwrap_or(default_size)
            .clamp(1, MAX_PAGE_SIZE);
        let page = page.unwrap_or(0).max(0);
        Self {
            page,
            limit,
            offset: page.saturating_mul(limit),
        }
    }
}

/// A page of results with the figures a client needs to page through them.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Paged<T> {
    /// Total number of matching rows.
    pub count: i64,
    /// Number of pages at the current size.
    pub total_pages: i64,
    /// The page returned.
    pub current_page: i64,
    /// Rows on this page.
    pub results: Vec<T>,
}

impl<T> Paged<T> {
    /// Wrap a page of `results` out of `count` matching rows.
    #[must_use]
    pub fn new(results: Vec<T>, count: i64, pagination: Pagination) -> Self {
        Self {
            count,
            total_pages: (count + pagination.limit - 1) / pagination.limit,
            current_page: pagination.page,
            results,
        }
    }
}
