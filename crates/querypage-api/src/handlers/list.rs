//! Paginated list handler.

use axum::Json;
use axum::extract::{Path, Request, State};
use bytes::Bytes;
use tracing::debug;

use querypage_core::error::AppError;
use querypage_core::types::Page;

use crate::state::AppState;

/// GET|POST /api/{resource}
///
/// GET reads list parameters from the query string, POST from a JSON body.
/// Only whitelisted sources are served, restricted to their configured
/// fields and cached under their configured prefix.
pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    request: Request,
) -> Result<Json<Page>, AppError> {
    let source = state.source(&resource)?;

    let (parts, body) = request.into_parts();
    let body: Bytes = axum::body::to_bytes(body, state.config.server.max_body_bytes)
        .await
        .map_err(|e| AppError::validation(format!("Failed to read request body: {e}")))?;
    let request = http::Request::from_parts(parts, body);

    debug!(resource = %resource, table = %source.table, method = %request.method(), "List request");

    let page = state
        .paginator
        .with(source.table.as_str())
        .request(&request)
        .cache(source.cache_prefix.as_str())
        .fields(source.fields.iter().map(String::as_str))
        .response()
        .await?;

    Ok(Json(page))
}
