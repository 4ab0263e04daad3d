//! Pagination arithmetic and the result envelope returned by list endpoints.

use serde::{Deserialize, Serialize};

/// Derived paging metadata for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetrics {
    /// Number of pages needed to show `total` rows.
    pub total_pages: u64,
    /// Highest addressable page.
    pub max_page: u64,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

impl PageMetrics {
    /// Compute paging metadata from a row count and the window that was read.
    ///
    /// `limit` must be at least 1; a zero limit is treated as 1.
    pub fn compute(total: u64, limit: u64, offset: u64, page: u64) -> Self {
        let limit = limit.max(1);
        let mut total_pages = total.div_ceil(limit);
        let mut max_page = total_pages;
        if total < 1 {
            total_pages = 0;
            max_page = 0;
        }

        Self {
            total_pages,
            max_page,
            first: offset < 1,
            last: page == total_pages,
        }
    }
}

/// Paginated result envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T = serde_json::Value> {
    /// The rows on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Requested page size.
    pub size: u64,
    /// Highest addressable page.
    pub max_page: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of matching rows before limiting.
    pub total: u64,
    /// Whether this is the last page.
    pub last: bool,
    /// Whether this is the first page.
    pub first: bool,
    /// Rows actually returned.
    pub visible: u64,
    /// Set when the underlying query failed and error surfacing is enabled.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    /// Failure description accompanying `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<T> Page<T> {
    /// Assemble an envelope from the rows read and the total row count.
    pub fn assemble(items: Vec<T>, page: u64, size: u64, offset: u64, total: u64) -> Self {
        let metrics = PageMetrics::compute(total, size, offset, page);
        let visible = items.len() as u64;
        Self {
            items,
            page,
            size,
            max_page: metrics.max_page,
            total_pages: metrics.total_pages,
            total,
            last: metrics.last,
            first: metrics.first,
            visible,
            error: false,
            error_message: None,
        }
    }

    /// An empty envelope carrying an execution failure.
    pub fn failed(page: u64, size: u64, offset: u64, message: impl Into<String>) -> Self {
        let mut envelope = Self::assemble(Vec::new(), page, size, offset, 0);
        envelope.error = true;
        envelope.error_message = Some(message.into());
        envelope
    }
}
