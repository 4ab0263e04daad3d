//! Data-access collaborator that runs compiled queries.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::dialect::SqlDialect;
use crate::types::query::SelectPlan;

/// Executes a [`SelectPlan`] against a backing data set.
///
/// Implementations expand array parameters bound to a single placeholder
/// (the `IN` family) into as many placeholders as the array has elements.
#[async_trait]
pub trait QueryExecutor: Send + Sync + std::fmt::Debug + 'static {
    /// The dialect compiled queries must target.
    fn dialect(&self) -> &dyn SqlDialect;

    /// Count rows matching the plan's predicate, ignoring limit and offset.
    async fn count(&self, plan: &SelectPlan) -> AppResult<u64>;

    /// Read the rows of the plan's window as JSON objects.
    async fn fetch(&self, plan: &SelectPlan) -> AppResult<Vec<serde_json::Value>>;
}
