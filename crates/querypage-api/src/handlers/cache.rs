//! Cache invalidation handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use querypage_core::error::AppError;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::state::AppState;

/// DELETE /api/{resource}/cache
///
/// Drops the cached pages of one source. The purge runs in the background.
pub async fn clear_source(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), AppError> {
    let source = state.source(&resource)?;
    if source.cache_prefix.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(MessageResponse::new(format!(
                "Source '{resource}' is not cached"
            )))),
        ));
    }

    match state.paginator.clear_cache([source.cache_prefix.as_str()]) {
        Some(_) => Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse::ok(MessageResponse::new(format!(
                "Clearing cached pages of '{resource}'"
            )))),
        )),
        None => Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(MessageResponse::new("Caching is disabled"))),
        )),
    }
}

/// DELETE /api/cache
///
/// Drops every cached page and row count.
pub async fn clear_all(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<MessageResponse>>) {
    match state.paginator.clear_all_cache() {
        Some(_) => (
            StatusCode::ACCEPTED,
            Json(ApiResponse::ok(MessageResponse::new("Clearing all cached results"))),
        ),
        None => (
            StatusCode::OK,
            Json(ApiResponse::ok(MessageResponse::new("Caching is disabled"))),
        ),
    }
}
