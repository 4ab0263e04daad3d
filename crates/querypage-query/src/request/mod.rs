//! Request descriptor building from inbound HTTP requests.

pub mod builder;
pub mod params;
pub mod source;

pub use builder::describe_request;
pub use params::RawParams;
pub use source::{RawRequest, RequestSource};
