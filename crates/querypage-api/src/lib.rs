//! # querypage-api
//!
//! HTTP API layer for QueryPage built on Axum.
//!
//! Exposes every configured list source under `/api/{resource}` (GET with a
//! query string, POST with a JSON body), cache invalidation routes, health
//! checks, middleware, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
