//! List source whitelist.

use serde::{Deserialize, Serialize};

/// A table or view exposed through the list endpoint.
///
/// Clients address sources by `name`; only configured sources can be read,
/// and only the configured `fields` can be selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Public resource name used in request paths.
    pub name: String,
    /// Table or view the rows come from.
    pub table: String,
    /// Fields the response may contain. Empty means all columns.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Prefix for cached pages of this source. Empty disables page caching.
    #[serde(default)]
    pub cache_prefix: String,
}
