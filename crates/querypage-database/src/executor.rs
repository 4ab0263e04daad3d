//! PostgreSQL query executor.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgPool, Postgres};
use tracing::debug;

use querypage_core::error::{AppError, ErrorKind};
use querypage_core::result::AppResult;
use querypage_core::traits::{QueryExecutor, SqlDialect};
use querypage_core::types::SelectPlan;

use crate::dialect::Dialect;
use crate::statement::{Statement, count_statement, select_statement};

/// Runs compiled list queries against a PostgreSQL pool.
///
/// Rows come back as JSON objects built by `to_jsonb`, so any table or view
/// can be listed without a Rust row type.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
    dialect: Dialect,
}

impl PgExecutor {
    /// Create an executor over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            dialect: Dialect::Postgres,
        }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    async fn count(&self, plan: &SelectPlan) -> AppResult<u64> {
        let Statement { sql, params } = count_statement(plan, self.dialect);
        debug!(sql = %sql, params = params.len(), "Counting rows");

        let total: i64 = sqlx::query_scalar_with::<Postgres, i64, _>(&sql, arguments(&params)?)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to count rows of {}", plan.source),
                    e,
                )
            })?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch(&self, plan: &SelectPlan) -> AppResult<Vec<Value>> {
        let Statement { sql, params } = select_statement(plan, self.dialect);
        let sql = format!("SELECT to_jsonb(t) FROM ({sql}) AS t");
        debug!(sql = %sql, params = params.len(), "Fetching rows");

        sqlx::query_scalar_with::<Postgres, Value, _>(&sql, arguments(&params)?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to read rows of {}", plan.source),
                    e,
                )
            })
    }
}

/// Bind decoded JSON values with their natural PostgreSQL types.
fn arguments(params: &[Value]) -> AppResult<PgArguments> {
    let mut args = PgArguments::default();
    for value in params {
        let added = match value {
            Value::Null => args.add(None::<String>),
            Value::Bool(b) => args.add(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => args.add(i),
                (None, Some(f)) => args.add(f),
                (None, None) => args.add(n.to_string()),
            },
            Value::String(s) => args.add(s.clone()),
            other => args.add(sqlx::types::Json(other.clone())),
        };
        added.map_err(|e| {
            AppError::new(
                ErrorKind::Database,
                format!("Failed to bind query parameter: {e}"),
            )
        })?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_json_shape_binds() {
        let params = vec![
            Value::Null,
            json!(true),
            json!(7),
            json!(u64::MAX),
            json!(1.5),
            json!("text"),
            json!({"nested": [1]}),
        ];
        let args = arguments(&params).expect("bind");
        assert_eq!(args.len(), params.len());
    }
}
