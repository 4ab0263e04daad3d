//! The resolved, per-request listing descriptor.

use serde::{Deserialize, Serialize};

use super::filter::FilterNode;
use super::sorting::SortSpec;

/// Page size used when neither the request nor the configuration gives one.
pub const FALLBACK_PAGE_SIZE: u64 = 10;

/// Largest value a `LIMIT` or `OFFSET` may take (SQL `BIGINT`).
pub const MAX_SQL_INTEGER: u64 = i64::MAX as u64;

/// Everything a list request asked for, after defaults are applied.
///
/// Built once per request and immutable thereafter. Its JSON form is the
/// input of the full-page cache key, so every field that changes the
/// result must be serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Page number (1-based).
    pub page: u64,
    /// Page size.
    pub size: u64,
    /// Requested ordering, in priority order.
    pub sorts: Vec<SortSpec>,
    /// Requested field names (whitelisted characters only).
    pub fields: Vec<String>,
    /// Parsed filter tree.
    pub filters: FilterNode,
}

impl RequestDescriptor {
    /// SQL `LIMIT` for this request.
    pub fn limit(&self) -> u64 {
        self.size
    }

    /// SQL `OFFSET` for this request.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            page: 1,
            size: FALLBACK_PAGE_SIZE,
            sorts: Vec::new(),
            fields: Vec::new(),
            filters: FilterNode::empty(),
        }
    }
}
