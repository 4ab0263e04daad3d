//! Compiled query artifacts handed to the data-access layer.

use serde::{Deserialize, Serialize};

use super::sorting::SortSpec;

/// The parameterized output of the filter compiler.
///
/// `where_string` uses `?` positional placeholders; `params` is aligned
/// with them left to right. Produced fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// SQL predicate fragment, empty when no filter applies.
    pub where_string: String,
    /// Bound parameters in placeholder order.
    pub params: Vec<serde_json::Value>,
    /// Row limit.
    pub limit: u64,
    /// Row offset.
    pub offset: u64,
    /// Ordering with resolved, quoted column references.
    pub sorts: Vec<SortSpec>,
}

impl CompiledQuery {
    /// Whether a `WHERE` clause should be emitted.
    pub fn has_predicate(&self) -> bool {
        !self.where_string.is_empty() || !self.params.is_empty()
    }
}

/// A complete read request for the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectPlan {
    /// Table or view to read from.
    pub source: String,
    /// Resolved, quoted column references; empty means all columns.
    pub columns: Vec<String>,
    /// Compiled predicate, ordering, and window.
    pub query: CompiledQuery,
}
