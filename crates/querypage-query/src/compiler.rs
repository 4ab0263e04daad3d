//! Filter tree compiler.
//!
//! Walks a [`FilterNode`] tree and emits predicate pieces with `?`
//! placeholders, plus the parameters aligned with them left to right.

use serde_json::Value;

use querypage_core::types::{
    Comparison, CompiledQuery, Connector, FilterNode, Operator, RequestDescriptor, SortSpec,
};

use crate::column;
use crate::context::QueryContext;
use crate::normalize::{apply_template, coerce_integral};

/// Compile a filter tree into predicate pieces and ordered parameters.
///
/// Every `(` pushed is matched by a `)`; groups that compile to nothing
/// emit nothing.
pub fn compile_filters(node: &FilterNode, ctx: &QueryContext<'_>) -> (Vec<String>, Vec<Value>) {
    let mut pieces = Vec::new();
    let mut params = Vec::new();
    emit(node, ctx, &mut pieces, &mut params);
    (pieces, params)
}

/// Compile a full request: predicate, window and resolved ordering.
pub fn compile_request(descriptor: &RequestDescriptor, ctx: &QueryContext<'_>) -> CompiledQuery {
    let (pieces, params) = compile_filters(&descriptor.filters, ctx);

    let sorts = descriptor
        .sorts
        .iter()
        .filter(|s| column::is_valid_reference(&s.column))
        .map(|s| SortSpec::new(column::reference(&s.column, ctx), s.direction))
        .collect();

    CompiledQuery {
        where_string: pieces.join(" "),
        params,
        limit: descriptor.limit(),
        offset: descriptor.offset(),
        sorts,
    }
}

fn emit(node: &FilterNode, ctx: &QueryContext<'_>, pieces: &mut Vec<String>, params: &mut Vec<Value>) {
    match node {
        FilterNode::Group(children) => {
            let mut inner = Vec::new();
            let mut pending: Option<Connector> = None;
            for child in children {
                if let FilterNode::Connector(connector) = child {
                    if !inner.is_empty() && pending.is_none() {
                        pending = Some(*connector);
                    }
                    continue;
                }

                let mut piece = Vec::new();
                emit(child, ctx, &mut piece, params);
                if piece.is_empty() {
                    continue;
                }
                if !inner.is_empty() {
                    let connector = pending.take().unwrap_or(ctx.config.operator);
                    inner.push(connector.as_sql().to_string());
                }
                inner.append(&mut piece);
            }
            if inner.is_empty() {
                return;
            }
            pieces.push("(".to_string());
            pieces.append(&mut inner);
            pieces.push(")".to_string());
        }
        // Connectors only have meaning between two emitted siblings.
        FilterNode::Connector(_) => {}
        FilterNode::Comparison(comparison) => emit_comparison(comparison, ctx, pieces, params),
    }
}

fn emit_comparison(
    cmp: &Comparison,
    ctx: &QueryContext<'_>,
    pieces: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    let field = column::reference(&cmp.column, ctx);
    let op = cmp.operator.as_sql().to_string();

    match &cmp.operator {
        Operator::Is | Operator::IsNot => {
            if is_null_literal(&cmp.value) {
                pieces.extend([field, op, "NULL".to_string()]);
            } else {
                pieces.extend([field, op, "?".to_string()]);
                params.push(cmp.value.clone());
            }
        }
        Operator::Between => {
            let bound = |i: usize| {
                cmp.value
                    .as_array()
                    .and_then(|b| b.get(i))
                    .map(coerce_integral)
                    .unwrap_or(Value::Null)
            };
            pieces.extend([
                "(".to_string(),
                field,
                op,
                "?".to_string(),
                "AND".to_string(),
                "?".to_string(),
                ")".to_string(),
            ]);
            params.push(bound(0));
            params.push(bound(1));
        }
        Operator::In | Operator::NotIn => {
            pieces.extend([field, op, "?".to_string()]);
            params.push(coerce_integral(&cmp.value));
        }
        operator if operator.is_like_family() => {
            let field = match ctx.config.field_wrapper.as_deref() {
                Some(template) => apply_template(template, &field),
                None => field,
            };
            pieces.extend([field, op, "?".to_string()]);
            if let Some(suffix) = &cmp.value_suffix {
                pieces.push(suffix.clone());
            }

            let value = match &cmp.value {
                Value::String(text) => match ctx.config.value_wrapper.as_deref() {
                    Some(template) => Value::String(apply_template(template, text)),
                    None => Value::String(text.to_lowercase()),
                },
                other => other.clone(),
            };
            params.push(value);
        }
        _ => {
            pieces.extend([field, op, "?".to_string()]);
            params.push(coerce_integral(&cmp.value));
        }
    }
}

fn is_null_literal(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.eq_ignore_ascii_case("null"),
        _ => false,
    }
}
