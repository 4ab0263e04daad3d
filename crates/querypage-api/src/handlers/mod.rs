//! Route handlers.

pub mod cache;
pub mod health;
pub mod list;
