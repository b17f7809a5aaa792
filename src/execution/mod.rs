//! Execution layer
//!
//! HTTP plumbing shared by the remote clients.

pub mod http;
