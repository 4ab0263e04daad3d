//! # querypage-database
//!
//! PostgreSQL connection management and the data-access collaborator that
//! runs compiled list queries: dialect conventions, placeholder rewriting
//! and array expansion, and the `sqlx` executor.

pub mod connection;
pub mod dialect;
pub mod executor;
pub mod statement;

pub use connection::DatabasePool;
pub use dialect::Dialect;
pub use executor::PgExecutor;
