//! Filter tree types produced by the grammar parser and consumed by the
//! predicate compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean connector joining two sibling filter nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    /// Both neighbours must match.
    And,
    /// Either neighbour may match.
    #[default]
    Or,
}

impl Connector {
    /// Return the SQL keyword for this connector.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Parse a connector keyword, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("AND") {
            Some(Self::And)
        } else if trimmed.eq_ignore_ascii_case("OR") {
            Some(Self::Or)
        } else {
            None
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Canonical comparison operator.
///
/// Higher-level aliases (`CONTAINS`, `STARTSWITH`, ...) never appear here;
/// the parser folds them into one of the pattern-matching variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `=`
    Eq,
    /// `IS`
    Is,
    /// `IS NOT`
    IsNot,
    /// `BETWEEN ? AND ?`
    Between,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `ILIKE`
    ILike,
    /// `NOT ILIKE`
    NotILike,
    /// Any other sanitized operator (`>`, `<=`, `<>`, ...), emitted verbatim.
    Other(String),
}

impl Operator {
    /// Map an already sanitized, upper-cased operator to its canonical form.
    pub fn from_sanitized(op: &str) -> Self {
        match op {
            "=" => Self::Eq,
            "IS" => Self::Is,
            "IS NOT" => Self::IsNot,
            "BETWEEN" => Self::Between,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            "ILIKE" => Self::ILike,
            "NOT ILIKE" => Self::NotILike,
            other => Self::Other(other.to_string()),
        }
    }

    /// Return the SQL text for this operator.
    pub fn as_sql(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::Other(op) => op,
        }
    }

    /// Whether this is one of the pattern-matching operators.
    pub fn is_like_family(&self) -> bool {
        matches!(
            self,
            Self::Like | Self::NotLike | Self::ILike | Self::NotILike
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single leaf predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Column reference as sent by the client (may be dotted).
    pub column: String,
    /// Canonical operator.
    pub operator: Operator,
    /// Transformed value to bind.
    pub value: serde_json::Value,
    /// Trailing SQL appended after the placeholder (e.g. `ESCAPE '\'`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_suffix: Option<String>,
}

impl Comparison {
    /// Create a comparison without a value suffix.
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
            value_suffix: None,
        }
    }
}

/// Parsed, typed representation of a client filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    /// Leaf predicate.
    Comparison(Comparison),
    /// Parenthesized list of siblings. Connectors alternate with
    /// non-connector children once the parser has resolved the group.
    Group(Vec<FilterNode>),
    /// Boolean connector sitting between two siblings.
    Connector(Connector),
}

impl FilterNode {
    /// A filter that applies no predicate.
    pub fn empty() -> Self {
        Self::Group(Vec::new())
    }

    /// Whether this node compiles to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Group(children) => children.is_empty(),
            _ => false,
        }
    }

    /// Number of leaf comparisons anywhere below this node.
    pub fn comparison_count(&self) -> usize {
        match self {
            Self::Comparison(_) => 1,
            Self::Group(children) => children.iter().map(Self::comparison_count).sum(),
            Self::Connector(_) => 0,
        }
    }
}

impl Default for FilterNode {
    fn default() -> Self {
        Self::empty()
    }
}
