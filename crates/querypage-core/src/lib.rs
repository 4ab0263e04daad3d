//! # querypage-core
//!
//! Core crate for QueryPage. Contains configuration schemas, the filter
//! tree and pagination types, the collaborator traits (cache, dialect,
//! executor), and the unified error system.
//!
//! This crate has **no** internal dependencies on other QueryPage crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
