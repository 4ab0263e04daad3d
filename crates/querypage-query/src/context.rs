//! Per-call compilation context.

use querypage_core::config::PaginateConfig;
use querypage_core::traits::SqlDialect;

/// Read-only inputs shared by the parser and compiler for one request.
///
/// The dialect is optional: without one, identifiers are emitted unquoted
/// and pattern values are not escaped.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    /// Resolved list configuration.
    pub config: &'a PaginateConfig,
    /// Target dialect, when known.
    pub dialect: Option<&'a dyn SqlDialect>,
}

impl<'a> QueryContext<'a> {
    /// Create a context for a known dialect.
    pub fn new(config: &'a PaginateConfig, dialect: &'a dyn SqlDialect) -> Self {
        Self {
            config,
            dialect: Some(dialect),
        }
    }

    /// Create a context with no dialect.
    pub fn without_dialect(config: &'a PaginateConfig) -> Self {
        Self {
            config,
            dialect: None,
        }
    }

    /// Escape character the dialect requires on pattern matches.
    pub fn like_escape(&self) -> Option<char> {
        self.dialect.and_then(|d| d.like_escape())
    }
}
