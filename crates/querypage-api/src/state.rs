//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use querypage_cache::provider::CacheManager;
use querypage_core::config::{AppConfig, SourceConfig};
use querypage_core::error::AppError;
use querypage_database::DatabasePool;
use querypage_service::Paginator;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// List query orchestrator
    pub paginator: Arc<Paginator>,
    /// PostgreSQL connection pool, absent when the executor is not SQL backed
    pub db_pool: Option<DatabasePool>,
    /// Result cache, absent when caching is disabled
    pub cache: Option<Arc<CacheManager>>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create state for a paginator with no pool or cache attached.
    pub fn new(config: Arc<AppConfig>, paginator: Arc<Paginator>) -> Self {
        Self {
            config,
            paginator,
            db_pool: None,
            cache: None,
            started_at: Instant::now(),
        }
    }

    /// Attach the database pool used for health checks.
    pub fn with_db_pool(mut self, pool: DatabasePool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the cache manager used for health checks.
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Look up a whitelisted list source by its public name.
    pub fn source(&self, resource: &str) -> Result<&SourceConfig, AppError> {
        self.config
            .source(resource)
            .ok_or_else(|| AppError::not_found(format!("Unknown list source '{resource}'")))
    }
}
