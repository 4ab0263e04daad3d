//! Cache key builders for paginated results.
//!
//! Centralising key construction keeps the page and count namespaces
//! apart and makes every key the gateway writes easy to find.

use querypage_core::result::AppResult;
use querypage_core::types::{CompiledQuery, RequestDescriptor};

/// Namespace for cached row counts.
const COUNT_NAMESPACE: &str = "count";

// ── Page keys ──────────────────────────────────────────────

/// Cache key for a full page envelope.
///
/// The digest covers the whole resolved descriptor, so requests that differ
/// in page, size, ordering, fields or filters never share an entry.
pub fn page_key(prefix: &str, descriptor: &RequestDescriptor) -> AppResult<String> {
    let payload = serde_json::to_vec(descriptor)?;
    Ok(format!("{prefix}{:x}", md5::compute(payload)))
}

// ── Count keys ─────────────────────────────────────────────

/// Cache key for the row count of `source` under a compiled predicate.
///
/// Ordering and the page window do not change the count and are excluded.
pub fn count_key(source: &str, query: &CompiledQuery) -> AppResult<String> {
    let params = serde_json::to_vec(&query.params)?;
    let mut payload = Vec::with_capacity(query.where_string.len() + params.len() + 1);
    payload.extend_from_slice(query.where_string.as_bytes());
    payload.push(0);
    payload.extend_from_slice(&params);
    Ok(format!(
        "{}{:x}",
        count_prefix(source),
        md5::compute(payload)
    ))
}

/// Prefix shared by every cached count of `source`.
pub fn count_prefix(source: &str) -> String {
    format!("{COUNT_NAMESPACE}:{source}:")
}
