//! Pagination and filter-compiler configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::traits::dialect::SqlDialect;
use crate::types::filter::Connector;
use crate::types::request::{FALLBACK_PAGE_SIZE, MAX_SQL_INTEGER};

/// Wrapper applied to pattern-matched columns when the dialect has no entry.
const FALLBACK_FIELD_WRAPPER: &str = "LOWER(%s)";

/// Process-wide defaults for list requests.
///
/// Shared read-only across requests. Use [`PaginateConfig::resolved`] to
/// obtain a copy with defaults filled in; the original is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginateConfig {
    /// Page size used when the request gives none (0 means 10).
    #[serde(default = "default_size")]
    pub default_size: u64,
    /// Upper bound for a requested page size (0 means no bound beyond SQL `BIGINT`).
    #[serde(default)]
    pub max_size: u64,
    /// Connector inserted between siblings that have none.
    #[serde(default)]
    pub operator: Connector,
    /// printf-style (`%s`) template wrapping pattern-matched columns.
    #[serde(default)]
    pub field_wrapper: Option<String>,
    /// printf-style (`%s`) template wrapping pattern-matched values.
    #[serde(default)]
    pub value_wrapper: Option<String>,
    /// Field wrapper per dialect name, consulted when neither wrapper is set.
    #[serde(default = "default_field_wrappers")]
    pub field_wrappers: HashMap<String, String>,
    /// Fold whitespace runs in pattern values into `%`.
    #[serde(default)]
    pub smart_search: bool,
    /// Read parameters through the alias lists below.
    #[serde(default)]
    pub custom_params_enabled: bool,
    /// Aliases for the `page` parameter.
    #[serde(default)]
    pub page_params: Vec<String>,
    /// Aliases for the `size` parameter.
    #[serde(default)]
    pub size_params: Vec<String>,
    /// Aliases for the `sort` parameter.
    #[serde(default)]
    pub sort_params: Vec<String>,
    /// Aliases for the `order` parameter.
    #[serde(default)]
    pub order_params: Vec<String>,
    /// Aliases for the `filters` parameter.
    #[serde(default)]
    pub filter_params: Vec<String>,
    /// Aliases for the `fields` parameter.
    #[serde(default)]
    pub fields_params: Vec<String>,
    /// Let clients choose returned fields with the `fields` parameter.
    #[serde(default)]
    pub field_selector_enabled: bool,
    /// Report query failures inside the envelope instead of failing the call.
    #[serde(default)]
    pub error_enabled: bool,
    /// TTL for cached pages and row counts, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Cache row counts per table and predicate.
    #[serde(default)]
    pub count_cache_enabled: bool,
}

impl PaginateConfig {
    /// Return a copy with every defaulted field resolved for `dialect`.
    pub fn resolved(&self, dialect: Option<&dyn SqlDialect>) -> Self {
        let mut resolved = self.clone();
        if resolved.default_size == 0 {
            resolved.default_size = FALLBACK_PAGE_SIZE;
        }
        if resolved.field_wrapper.is_none() && resolved.value_wrapper.is_none() {
            let wrapper = dialect
                .and_then(|d| self.field_wrappers.get(d.name()))
                .map(String::as_str)
                .unwrap_or(FALLBACK_FIELD_WRAPPER);
            resolved.field_wrapper = Some(wrapper.to_string());
        }
        resolved
    }

    /// Effective default page size.
    pub fn page_size_or_default(&self) -> u64 {
        if self.default_size > 0 {
            self.default_size
        } else {
            FALLBACK_PAGE_SIZE
        }
    }

    /// Largest page size a request may ask for.
    pub fn page_size_limit(&self) -> u64 {
        match self.max_size {
            0 => MAX_SQL_INTEGER,
            max => max.min(MAX_SQL_INTEGER),
        }
    }
}

impl Default for PaginateConfig {
    fn default() -> Self {
        Self {
            default_size: default_size(),
            max_size: 0,
            operator: Connector::default(),
            field_wrapper: None,
            value_wrapper: None,
            field_wrappers: default_field_wrappers(),
            smart_search: false,
            custom_params_enabled: false,
            page_params: Vec::new(),
            size_params: Vec::new(),
            sort_params: Vec::new(),
            order_params: Vec::new(),
            filter_params: Vec::new(),
            fields_params: Vec::new(),
            field_selector_enabled: false,
            error_enabled: false,
            cache_ttl_seconds: default_cache_ttl(),
            count_cache_enabled: false,
        }
    }
}

fn default_size() -> u64 {
    FALLBACK_PAGE_SIZE
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_field_wrappers() -> HashMap<String, String> {
    HashMap::from([
        ("postgres".to_string(), "LOWER((%s)::text)".to_string()),
        ("sqlite".to_string(), "LOWER(%s)".to_string()),
        ("mysql".to_string(), "LOWER(%s)".to_string()),
    ])
}
