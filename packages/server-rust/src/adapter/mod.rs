//! Framework adapters implementing the report capability set.
//!
//! One adapter per supported request type. Each adapter only translates its
//! framework's request into `RequestSource` accessors.

pub mod http_request;

pub use http_request::HttpRequestSource;
