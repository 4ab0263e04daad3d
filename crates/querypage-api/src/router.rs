//! Route definitions for the QueryPage HTTP API.
//!
//! List routes are mounted under `/api`, health checks at the root.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let api_routes = Router::new()
        .merge(list_routes())
        .merge(cache_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(middleware::compression::build_compression_layer())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Paginated listing of whitelisted sources
fn list_routes() -> Router<AppState> {
    Router::new().route(
        "/{resource}",
        get(handlers::list::list).post(handlers::list::list),
    )
}

/// Cache invalidation
fn cache_routes() -> Router<AppState> {
    Router::new()
        .route("/cache", delete(handlers::cache::clear_all))
        .route("/{resource}/cache", delete(handlers::cache::clear_source))
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
