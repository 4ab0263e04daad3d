//! Turns raw list parameters into a [`RequestDescriptor`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use querypage_core::types::request::MAX_SQL_INTEGER;
use querypage_core::types::{FilterNode, RequestDescriptor, SortDirection, SortSpec};

use super::params::RawParams;
use super::source::RequestSource;
use crate::column;
use crate::context::QueryContext;
use crate::parser::{parse_filter_text, parse_filters};

static FIELD_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.]+").expect("Invalid field strip regex"));

/// Build the descriptor for one list request.
///
/// Never fails: unparseable numbers fall back to defaults and unparseable
/// filters to no filter.
pub fn describe_request(source: &impl RequestSource, ctx: &QueryContext<'_>) -> RequestDescriptor {
    let params = RawParams::extract(source, ctx.config);
    describe_params(&params, ctx)
}

/// Build the descriptor from already extracted parameters.
pub fn describe_params(params: &RawParams, ctx: &QueryContext<'_>) -> RequestDescriptor {
    let size = match params.size.trim().parse::<u64>() {
        Ok(size) if size > 0 => size,
        _ => ctx.config.page_size_or_default(),
    };
    let size = clamp(size, ctx.config.page_size_limit(), "size");
    let page = match params.page.trim().parse::<u64>() {
        Ok(page) if page > 0 => page,
        _ => 1,
    };
    // Keep (page - 1) * size inside BIGINT.
    let page = clamp(page, MAX_SQL_INTEGER / size + 1, "page");

    RequestDescriptor {
        page,
        size,
        sorts: parse_sorts(&params.sort, &params.order),
        fields: parse_fields(&params.fields),
        filters: parse_filter_param(&params.filters, ctx),
    }
}

fn clamp(value: u64, limit: u64, param: &'static str) -> u64 {
    if value > limit {
        tracing::debug!(param, value, limit, "Clamping oversized list parameter");
        limit
    } else {
        value
    }
}

/// Split a `sort` parameter such as `user.name,-id`.
///
/// A leading `-` sorts that column descending; other columns take the
/// direction of the `order` parameter.
pub fn parse_sorts(sort: &str, order: &str) -> Vec<SortSpec> {
    let default_direction = SortDirection::from_param(order);
    sort.split(',')
        .map(str::trim)
        .filter(|col| !col.is_empty())
        .filter_map(|col| {
            let spec = match col.strip_prefix('-') {
                Some(rest) => SortSpec::desc(rest.trim()),
                None => SortSpec::new(col, default_direction),
            };
            if column::is_valid_reference(&spec.column) {
                Some(spec)
            } else {
                tracing::debug!(column = %spec.column, "Dropping invalid sort column");
                None
            }
        })
        .collect()
}

/// Split a `fields` parameter, keeping only identifier characters.
pub fn parse_fields(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(|f| FIELD_STRIP.replace_all(f, "").into_owned())
        .filter(|f| !f.is_empty())
        .collect()
}

fn parse_filter_param(raw: &Value, ctx: &QueryContext<'_>) -> FilterNode {
    match raw {
        Value::String(text) => parse_filter_text(text, ctx),
        Value::Array(_) => parse_filters(raw, ctx),
        _ => FilterNode::empty(),
    }
}
