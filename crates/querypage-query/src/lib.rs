//! # querypage-query
//!
//! Turns client-supplied list parameters into a parameterized SQL
//! predicate. The pipeline is pure and synchronous:
//!
//! 1. [`request`] reads page/size/sort/fields/filters from a request and
//!    builds a [`RequestDescriptor`](querypage_core::types::RequestDescriptor).
//! 2. [`parser`] decodes the array-based filter expression into a
//!    [`FilterNode`](querypage_core::types::FilterNode) tree.
//! 3. [`compiler`] emits the `?`-placeholder predicate and its parameters.
//!
//! Malformed input never fails; it degrades to permissive defaults.

pub mod column;
pub mod compiler;
pub mod context;
pub mod normalize;
pub mod parser;
pub mod request;

pub use compiler::{compile_filters, compile_request};
pub use context::QueryContext;
pub use parser::{parse_filter_text, parse_filters};
pub use request::{RawRequest, RequestSource, describe_request};
