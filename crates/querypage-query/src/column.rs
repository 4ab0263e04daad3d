//! Column-reference resolution and field selection.

use std::sync::LazyLock;

use convert_case::{Case, Casing};
use regex::Regex;

use querypage_core::traits::SqlDialect;

use crate::context::QueryContext;

static COLUMN_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("Invalid column reference regex")
});

/// Separator between a joined relation alias and its field.
pub const RELATION_SEPARATOR: &str = "__";

/// Whether `column` is a plain or dotted identifier that may reach SQL.
pub fn is_valid_reference(column: &str) -> bool {
    COLUMN_REFERENCE.is_match(column)
}

/// Rewrite a dotted `relation.field` reference into the joined-alias form.
///
/// The first segment goes through the dialect's relation naming rule, the
/// remaining segments are kept as-is, and all are joined with `__`.
/// Single-segment references are returned unchanged.
pub fn resolve(column: &str, dialect: Option<&dyn SqlDialect>) -> String {
    let mut segments = column.split('.');
    let Some(relation) = segments.next() else {
        return column.to_string();
    };
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        return column.to_string();
    }

    let alias = match dialect {
        Some(d) => d.relation_alias(relation),
        None => relation.to_case(Case::Pascal),
    };

    let mut resolved = alias;
    for segment in rest {
        resolved.push_str(RELATION_SEPARATOR);
        resolved.push_str(segment);
    }
    resolved
}

/// Resolve and quote a column reference for emission into SQL.
pub fn reference(column: &str, ctx: &QueryContext<'_>) -> String {
    let resolved = resolve(column, ctx.dialect);
    match ctx.dialect {
        Some(d) => d.quote_identifier(&resolved),
        None => resolved,
    }
}

/// Decide which columns a response carries.
///
/// `allowed` is the caller's whitelist, `requested` the client's `fields`
/// parameter. Client choice only counts when the field selector is enabled,
/// and never widens the whitelist. An empty result means all columns.
pub fn select_columns(
    requested: &[String],
    allowed: &[String],
    ctx: &QueryContext<'_>,
) -> Vec<String> {
    let selector = ctx.config.field_selector_enabled && !requested.is_empty();

    let chosen: Vec<&String> = if !allowed.is_empty() {
        let picked: Vec<&String> = if selector {
            requested.iter().filter(|f| allowed.contains(f)).collect()
        } else {
            Vec::new()
        };
        if picked.is_empty() {
            allowed.iter().collect()
        } else {
            picked
        }
    } else if selector {
        requested.iter().collect()
    } else {
        Vec::new()
    };

    let mut columns: Vec<String> = Vec::with_capacity(chosen.len());
    for field in chosen {
        if !is_valid_reference(field) {
            tracing::debug!(field = %field, "Skipping invalid field reference");
            continue;
        }
        let column = reference(field, ctx);
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    columns
}
