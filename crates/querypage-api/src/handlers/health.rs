//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use querypage_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /health/detailed
///
/// Answers 503 when a configured collaborator is unreachable.
pub async fn health_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<DetailedHealthResponse>>) {
    let database = match &state.db_pool {
        Some(pool) => component_status(pool.health_check().await),
        None => "disabled",
    };
    let cache = match &state.cache {
        Some(cache) => component_status(cache.health_check().await),
        None => "disabled",
    };

    let healthy = database != "unavailable" && cache != "unavailable";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = DetailedHealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        cache: cache.to_string(),
        sources: state.config.sources.iter().map(|s| s.name.clone()).collect(),
    };
    (status, Json(ApiResponse::ok(body)))
}

fn component_status<E: std::fmt::Display>(result: Result<bool, E>) -> &'static str {
    match result {
        Ok(true) => "connected",
        Ok(false) => "unavailable",
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            "unavailable"
        }
    }
}
