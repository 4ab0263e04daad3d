//! Filter grammar parser.
//!
//! Filters arrive as nested JSON arrays:
//!
//! - `["AND"]` / `["OR"]` is a connector between siblings,
//! - `[column, value]` is an equality test (`IS` when `value` is null),
//! - `[column, operator, value]` is an explicit comparison,
//! - an array whose first element is itself an array is a group of
//!   siblings, parsed recursively.
//!
//! Anything that does not fit is dropped rather than rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use querypage_core::types::{Comparison, Connector, FilterNode, Operator};

use crate::column;
use crate::context::QueryContext;
use crate::normalize::{Wildcards, escape_like, fold_whitespace, render_text};

static OPERATOR_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z=<>\-+^/*%&! ]+").expect("Invalid operator strip regex")
});

/// Parse a decoded filter payload into a filter tree.
///
/// Non-array payloads and payloads that reduce to nothing yield an empty
/// filter.
pub fn parse_filters(raw: &Value, ctx: &QueryContext<'_>) -> FilterNode {
    let Value::Array(items) = raw else {
        if !raw.is_null() {
            tracing::debug!("Ignoring non-array filter payload");
        }
        return FilterNode::empty();
    };

    match parse_array(items, ctx) {
        Some(FilterNode::Connector(_)) | None => FilterNode::empty(),
        Some(node) => node,
    }
}

/// Parse filter JSON text. Unparseable text yields an empty filter.
pub fn parse_filter_text(text: &str, ctx: &QueryContext<'_>) -> FilterNode {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FilterNode::empty();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => parse_filters(&value, ctx),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding unparseable filter text");
            FilterNode::empty()
        }
    }
}

fn parse_array(items: &[Value], ctx: &QueryContext<'_>) -> Option<FilterNode> {
    match items.first() {
        Some(Value::String(head)) => parse_leaf(head, items, ctx),
        Some(Value::Array(_)) => parse_group(items, ctx),
        _ => None,
    }
}

fn parse_group(items: &[Value], ctx: &QueryContext<'_>) -> Option<FilterNode> {
    let children: Vec<FilterNode> = items
        .iter()
        .filter_map(|item| match item {
            Value::Array(nested) => parse_array(nested, ctx),
            other => {
                tracing::debug!(element = %other, "Ignoring scalar inside filter group");
                None
            }
        })
        .collect();

    let joined = join_siblings(children, ctx.config.operator);
    if joined.is_empty() {
        None
    } else {
        Some(FilterNode::Group(joined))
    }
}

/// Interleave connectors between non-connector siblings.
///
/// An explicit connector wins over the default; leading, repeated and
/// trailing connectors are dropped.
fn join_siblings(children: Vec<FilterNode>, default: Connector) -> Vec<FilterNode> {
    let mut joined = Vec::with_capacity(children.len() * 2);
    let mut pending: Option<Connector> = None;

    for child in children {
        match child {
            FilterNode::Connector(connector) => {
                if joined.is_empty() {
                    tracing::debug!(%connector, "Dropping leading connector");
                } else if pending.is_none() {
                    pending = Some(connector);
                }
            }
            node => {
                if !joined.is_empty() {
                    joined.push(FilterNode::Connector(pending.take().unwrap_or(default)));
                }
                joined.push(node);
            }
        }
    }

    if let Some(connector) = pending {
        tracing::debug!(%connector, "Dropping trailing connector");
    }
    joined
}

fn parse_leaf(head: &str, items: &[Value], ctx: &QueryContext<'_>) -> Option<FilterNode> {
    match items {
        [_] => match Connector::parse(&sanitize_operator(head)) {
            Some(connector) => Some(FilterNode::Connector(connector)),
            None => {
                tracing::debug!(token = %head, "Dropping unknown connector token");
                None
            }
        },
        [_, value] => {
            let operator = if value.is_null() { "IS" } else { "=" };
            build_comparison(head, operator, value, ctx)
        }
        [_, Value::String(operator), value, ..] => {
            let sanitized = sanitize_operator(operator);
            if sanitized.is_empty() {
                tracing::debug!(column = %head, operator = %operator, "Dropping comparison with empty operator");
                return None;
            }
            if is_comment_token(&sanitized) {
                tracing::debug!(column = %head, operator = %operator, "Dropping comparison with SQL comment in operator");
                return None;
            }
            build_comparison(head, &sanitized, value, ctx)
        }
        _ => {
            tracing::debug!(column = %head, "Dropping malformed comparison");
            None
        }
    }
}

/// Strip characters outside the operator alphabet, upper-case, and collapse
/// inner whitespace.
pub fn sanitize_operator(raw: &str) -> String {
    let stripped = OPERATOR_STRIP.replace_all(raw, "");
    stripped
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a sanitized operator still carries an SQL comment marker.
fn is_comment_token(op: &str) -> bool {
    op.contains("--") || op.contains("/*") || op.contains("*/")
}

/// Map a sanitized operator to its canonical form and the wildcards a
/// pattern operator adds.
fn canonical_operator(op: &str) -> (Operator, Option<Wildcards>) {
    match op {
        "LIKE" => (Operator::Like, Some(Wildcards::Both)),
        "NOT LIKE" => (Operator::NotLike, Some(Wildcards::Both)),
        "ILIKE" => (Operator::ILike, Some(Wildcards::Both)),
        "NOT ILIKE" => (Operator::NotILike, Some(Wildcards::Both)),
        "CONTAINS" => (Operator::Like, Some(Wildcards::Both)),
        "NOT CONTAINS" => (Operator::NotLike, Some(Wildcards::Both)),
        "STARTSWITH" => (Operator::Like, Some(Wildcards::Trailing)),
        "ENDSWITH" => (Operator::Like, Some(Wildcards::Leading)),
        "IEXACT" => (Operator::Like, Some(Wildcards::None)),
        other => (Operator::from_sanitized(other), None),
    }
}

fn build_comparison(
    column: &str,
    operator: &str,
    value: &Value,
    ctx: &QueryContext<'_>,
) -> Option<FilterNode> {
    if !column::is_valid_reference(column) {
        tracing::debug!(column = %column, "Dropping comparison on invalid column");
        return None;
    }

    let (operator, wildcards) = canonical_operator(operator);
    let mut comparison = Comparison::new(column, operator, Value::Null);

    if let Some(wildcards) = wildcards {
        let escape = ctx.like_escape();
        let mut text = escape_like(&render_text(value), escape);
        if ctx.config.smart_search {
            text = fold_whitespace(&text);
        }
        comparison.value = Value::String(wildcards.apply(&text));
        comparison.value_suffix = escape.map(|c| format!("ESCAPE '{c}'"));
        return Some(FilterNode::Comparison(comparison));
    }

    comparison.value = match (&comparison.operator, value) {
        (Operator::Between, Value::Array(bounds)) if bounds.len() == 2 => value.clone(),
        (Operator::Between, _) => {
            tracing::debug!(column = %column, "Dropping BETWEEN without exactly two bounds");
            return None;
        }
        (Operator::In | Operator::NotIn, Value::Array(_)) => value.clone(),
        (Operator::In | Operator::NotIn, scalar) => Value::Array(vec![scalar.clone()]),
        _ => value.clone(),
    };
    Some(FilterNode::Comparison(comparison))
}

#[cfg(test)]
mod tests {
    use super::*;
    use querypage_core::config::PaginateConfig;
    use querypage_core::traits::SqlDialect;
    use serde_json::json;

    #[derive(Debug)]
    struct Backslash;

    impl SqlDialect for Backslash {
        fn name(&self) -> &str {
            "postgres"
        }

        fn quote_identifier(&self, ident: &str) -> String {
            format!("\"{ident}\"")
        }
    }

    fn leaf(node: &FilterNode) -> &Comparison {
        match node {
            FilterNode::Comparison(c) => c,
            other => panic!("expected comparison, got {other:?}"),
        }
    }

    fn children(node: &FilterNode) -> &[FilterNode] {
        match node {
            FilterNode::Group(children) => children,
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_like_value_is_escaped_and_wrapped() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::new(&config, &Backslash);
        let node = parse_filters(&json!(["user.average_point", "like", "seventy %"]), &ctx);
        let cmp = leaf(&node);
        assert_eq!(cmp.operator, Operator::Like);
        assert_eq!(cmp.value, json!("%seventy \\%%"));
        assert_eq!(cmp.value_suffix.as_deref(), Some("ESCAPE '\\'"));
    }

    #[test]
    fn test_like_without_dialect_skips_escaping() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!(["x", "like", "seventy %"]), &ctx);
        let cmp = leaf(&node);
        assert_eq!(cmp.value, json!("%seventy %%"));
        assert!(cmp.value_suffix.is_none());
    }

    #[test]
    fn test_explicit_connector_between_groups() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!([["a", "1"], ["AND"], ["b", "2"]]), &ctx);
        let kids = children(&node);
        assert_eq!(kids.len(), 3);
        assert_eq!(leaf(&kids[0]).column, "a");
        assert_eq!(kids[1], FilterNode::Connector(Connector::And));
        assert_eq!(leaf(&kids[2]).value, json!("2"));
    }

    #[test]
    fn test_default_connector_inserted() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!([["a", 1], ["b", 2], ["c", 3]]), &ctx);
        let kids = children(&node);
        assert_eq!(kids.len(), 5);
        assert_eq!(kids[1], FilterNode::Connector(Connector::Or));
        assert_eq!(kids[3], FilterNode::Connector(Connector::Or));

        let config = PaginateConfig {
            operator: Connector::And,
            ..Default::default()
        };
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!([["a", 1], ["b", 2]]), &ctx);
        assert_eq!(children(&node)[1], FilterNode::Connector(Connector::And));
    }

    #[test]
    fn test_stray_connectors_dropped() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);

        let node = parse_filters(&json!([["a", 1], ["OR"]]), &ctx);
        assert_eq!(children(&node).len(), 1);

        let node = parse_filters(&json!([["AND"], ["a", 1], ["AND"], ["OR"], ["b", 2]]), &ctx);
        let kids = children(&node);
        assert_eq!(kids.len(), 3);
        assert_eq!(kids[1], FilterNode::Connector(Connector::And));

        assert!(parse_filters(&json!(["AND"]), &ctx).is_empty());
        assert!(parse_filters(&json!([["AND"], ["OR"]]), &ctx).is_empty());
        assert!(parse_filters(&json!([["XOR"]]), &ctx).is_empty());
    }

    #[test]
    fn test_null_value_becomes_is() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!(["deleted_at", null]), &ctx);
        let cmp = leaf(&node);
        assert_eq!(cmp.operator, Operator::Is);
        assert!(cmp.value.is_null());
    }

    #[test]
    fn test_operator_is_sanitized() {
        assert_eq!(sanitize_operator(" >=; "), ">=");
        assert_eq!(sanitize_operator("not   like"), "NOT LIKE");
        assert_eq!(sanitize_operator("= 1) OR (1"), "= OR");
        assert_eq!(sanitize_operator("'\""), "");

        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        assert!(parse_filters(&json!(["age", "'\"", 18]), &ctx).is_empty());
        let node = parse_filters(&json!(["age", "<=;", 18]), &ctx);
        assert_eq!(leaf(&node).operator, Operator::Other("<=".into()));
    }

    #[test]
    fn test_comment_operators_dropped() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);

        assert!(parse_filters(&json!(["is_active", "--", 1]), &ctx).is_empty());
        assert!(parse_filters(&json!(["is_active", "/*", 1]), &ctx).is_empty());
        assert!(parse_filters(&json!(["is_active", "= 1 */", 1]), &ctx).is_empty());

        let node = parse_filters(&json!([["is_active", "--", 1], ["OR"], ["id", 2]]), &ctx);
        let kids = children(&node);
        assert_eq!(kids.len(), 1);
        assert_eq!(leaf(&kids[0]).column, "id");

        let node = parse_filters(&json!(["total", "-", 1]), &ctx);
        assert_eq!(leaf(&node).operator, Operator::Other("-".into()));
    }

    #[test]
    fn test_connector_token_is_sanitized() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!([["a", 1], ["AND;"], ["b", 2]]), &ctx);
        let kids = children(&node);
        assert_eq!(kids.len(), 3);
        assert_eq!(kids[1], FilterNode::Connector(Connector::And));

        let node = parse_filters(&json!([["a", 1], [" or "], ["b", 2]]), &ctx);
        assert_eq!(children(&node)[1], FilterNode::Connector(Connector::Or));
    }

    #[test]
    fn test_invalid_column_dropped() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        assert!(parse_filters(&json!(["id = 1 OR 1", 1]), &ctx).is_empty());

        let node = parse_filters(&json!([["id;--", 1], ["ok", 2]]), &ctx);
        let kids = children(&node);
        assert_eq!(kids.len(), 1);
        assert_eq!(leaf(&kids[0]).column, "ok");
    }

    #[test]
    fn test_pattern_aliases() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);

        let cases = [
            ("contains", Operator::Like, "%ab%"),
            ("not contains", Operator::NotLike, "%ab%"),
            ("startswith", Operator::Like, "ab%"),
            ("endswith", Operator::Like, "%ab"),
            ("iexact", Operator::Like, "ab"),
            ("not ilike", Operator::NotILike, "%ab%"),
        ];
        for (alias, operator, pattern) in cases {
            let node = parse_filters(&json!(["name", alias, "ab"]), &ctx);
            let cmp = leaf(&node);
            assert_eq!(cmp.operator, operator, "alias {alias}");
            assert_eq!(cmp.value, json!(pattern), "alias {alias}");
        }
    }

    #[test]
    fn test_smart_search_folds_whitespace() {
        let config = PaginateConfig {
            smart_search: true,
            ..Default::default()
        };
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(&json!(["name", "contains", "john   doe"]), &ctx);
        assert_eq!(leaf(&node).value, json!("%john%doe%"));
    }

    #[test]
    fn test_between_and_in_shapes() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);

        let node = parse_filters(&json!(["age", "between", [18, 30]]), &ctx);
        assert_eq!(leaf(&node).operator, Operator::Between);
        assert!(parse_filters(&json!(["age", "between", [18]]), &ctx).is_empty());
        assert!(parse_filters(&json!(["age", "between", 18]), &ctx).is_empty());

        let node = parse_filters(&json!(["id", "in", 7]), &ctx);
        assert_eq!(leaf(&node).value, json!([7]));
        let node = parse_filters(&json!(["id", "not in", [1, 2]]), &ctx);
        assert_eq!(leaf(&node).operator, Operator::NotIn);
        assert_eq!(leaf(&node).value, json!([1, 2]));
    }

    #[test]
    fn test_nested_groups_keep_depth() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        let node = parse_filters(
            &json!([["status", "active"], ["AND"], [["age", ">", 18], ["vip", true]]]),
            &ctx,
        );
        let kids = children(&node);
        assert_eq!(kids.len(), 3);
        let inner = children(&kids[2]);
        assert_eq!(inner.len(), 3);
        assert_eq!(inner[1], FilterNode::Connector(Connector::Or));
        assert_eq!(node.comparison_count(), 3);
    }

    #[test]
    fn test_filter_text_degrades_to_empty() {
        let config = PaginateConfig::default();
        let ctx = QueryContext::without_dialect(&config);
        assert!(parse_filter_text("", &ctx).is_empty());
        assert!(parse_filter_text("[[\"a\",", &ctx).is_empty());
        assert!(parse_filter_text("{\"a\": 1}", &ctx).is_empty());
        assert!(parse_filter_text("\"name\"", &ctx).is_empty());

        let node = parse_filter_text(r#"[["name","like","x"]]"#, &ctx);
        assert_eq!(node.comparison_count(), 1);
    }
}
