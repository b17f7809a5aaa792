//! Core Data Type Definitions
//!
//! All values here are transient: they live for a single request/response
//! exchange.
//!
//! ## Module Organization
//!
//! - **`chat`** - Chat messages, requests and responses
//! - **`guardrail`** - Verdicts and guarded responses
//! - **`search`** - Vector-search requests and records
//!
//! Most types are re-exported at the module root:
//!
//! ```rust,ignore
//! use railguard::types::{ChatMessage, ChatRequest, GuardedResponse};
//! ```

pub mod chat;
pub mod guardrail;
pub mod search;

pub use chat::*;
pub use guardrail::*;
pub use search::*;
