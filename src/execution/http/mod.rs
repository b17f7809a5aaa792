//! HTTP helpers: header construction and JSON POST execution.

pub mod headers;
pub mod request;

pub use headers::HttpHeaderBuilder;
pub use request::{JsonResponse, post_json};
