//! Retry module
//! - policy.rs: policy-based retries with exponential backoff and jitter
//!
//! Retries are opt-in; clients make a single attempt unless a policy is set.

pub mod policy;

pub use policy::*;
