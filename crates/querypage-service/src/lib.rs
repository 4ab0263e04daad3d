//! # querypage-service
//!
//! Orchestrates one list request end to end: build the descriptor, consult
//! the page cache, compile and execute the query, assemble the envelope,
//! and write the cache back.
//!
//! Dependencies are injected at construction time via `Arc` references.

pub mod gateway;
pub mod paginator;

pub use gateway::CacheGateway;
pub use paginator::{ListRequest, Paginator, SourceContext};
