//! # querypage-cache
//!
//! Cache providers for paginated results. Supports three modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//! - **none**: caching disabled
//!
//! The provider is selected at runtime based on configuration. Key
//! derivation for full pages and row counts lives in [`keys`].

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
