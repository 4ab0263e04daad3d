//! Core type definitions used across the QueryPage workspace.

pub mod filter;
pub mod pagination;
pub mod query;
pub mod request;
pub mod sorting;

pub use filter::{Comparison, Connector, FilterNode, Operator};
pub use pagination::{Page, PageMetrics};
pub use query::{CompiledQuery, SelectPlan};
pub use request::RequestDescriptor;
pub use sorting::{SortDirection, SortSpec};
