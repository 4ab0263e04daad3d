//! Rendering of select plans into executable SQL.

use serde_json::Value;

use querypage_core::types::SelectPlan;

use crate::dialect::Dialect;

/// SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// `SELECT COUNT(*)` over the plan's predicate.
pub fn count_statement(plan: &SelectPlan, dialect: Dialect) -> Statement {
    let (predicate, params) = where_clause(plan, dialect);
    Statement {
        sql: format!(
            "SELECT COUNT(*) FROM {}{predicate}",
            dialect.quote_relation(&plan.source)
        ),
        params,
    }
}

/// Windowed, ordered row select for the plan.
pub fn select_statement(plan: &SelectPlan, dialect: Dialect) -> Statement {
    let (predicate, params) = where_clause(plan, dialect);
    let columns = if plan.columns.is_empty() {
        "*".to_string()
    } else {
        plan.columns.join(", ")
    };
    let order = if plan.query.sorts.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = plan.query.sorts.iter().map(|s| s.to_sql()).collect();
        format!(" ORDER BY {}", items.join(", "))
    };

    Statement {
        sql: format!(
            "SELECT {columns} FROM {}{predicate}{order} LIMIT {} OFFSET {}",
            dialect.quote_relation(&plan.source),
            plan.query.limit,
            plan.query.offset
        ),
        params,
    }
}

fn where_clause(plan: &SelectPlan, dialect: Dialect) -> (String, Vec<Value>) {
    if plan.query.where_string.trim().is_empty() {
        return (String::new(), Vec::new());
    }
    let (sql, params) = bind_placeholders(&plan.query.where_string, &plan.query.params, dialect);
    (format!(" WHERE {sql}"), params)
}

/// Rewrite `?` placeholders into the dialect's positional form.
///
/// A placeholder bound to an array expands into a parenthesized list with
/// one placeholder per element; an empty array becomes `(NULL)`.
/// Question marks inside quoted literals or identifiers are left alone.
pub fn bind_placeholders(predicate: &str, params: &[Value], dialect: Dialect) -> (String, Vec<Value>) {
    let mut sql = String::with_capacity(predicate.len() + params.len() * 2);
    let mut bound: Vec<Value> = Vec::with_capacity(params.len());
    let mut pending = params.iter();
    let mut quote: Option<char> = None;

    for ch in predicate.chars() {
        if let Some(q) = quote {
            sql.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                sql.push(ch);
            }
            '?' => match pending.next() {
                Some(Value::Array(items)) if items.is_empty() => sql.push_str("(NULL)"),
                Some(Value::Array(items)) => {
                    sql.push('(');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        bound.push(item.clone());
                        sql.push_str(&dialect.placeholder(bound.len()));
                    }
                    sql.push(')');
                }
                Some(value) => {
                    bound.push(value.clone());
                    sql.push_str(&dialect.placeholder(bound.len()));
                }
                None => sql.push(ch),
            },
            _ => sql.push(ch),
        }
    }

    (sql, bound)
}
