//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse` impl must live in `querypage-core` (the crate that owns
//! `AppError`) because of the orphan rule; it is re-exported here.

#[allow(unused_imports)]
use axum::http::StatusCode;
#[allow(unused_imports)]
use axum::response::IntoResponse;

#[allow(unused_imports)]
use querypage_core::error::{AppError, ErrorKind};
pub use querypage_core::error::{ApiErrorResponse, status_for};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert_eq!(status_for(ErrorKind::NotFound).0, StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Validation).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_collaborator_failures_are_server_errors() {
        for kind in [
            ErrorKind::Database,
            ErrorKind::Cache,
            ErrorKind::Configuration,
            ErrorKind::Internal,
        ] {
            assert!(status_for(kind).0.is_server_error(), "{kind}");
        }
    }

    #[test]
    fn test_response_status() {
        let response = AppError::not_found("Unknown list source 'x'").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
