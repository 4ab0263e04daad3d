//! Collaborator traits defined in `querypage-core` and implemented by
//! other crates.

pub mod cache;
pub mod codec;
pub mod dialect;
pub mod executor;

pub use cache::CacheProvider;
pub use codec::{EnvelopeCodec, JsonCodec};
pub use dialect::SqlDialect;
pub use executor::QueryExecutor;
