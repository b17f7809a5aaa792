//! Core Trait Definitions
//!
//! Capability traits for the remote services and the guardrail seams.
//!
//! - **`chat`** - Chat completion (`ChatCapability`, `ChatExtensions`)
//! - **`search`** - Generative vector search (`GenerativeSearchCapability`)
//! - **`guardrail`** - Input and output checks (`InputGuardrail`, `OutputGuardrail`)
//!
//! ```rust,ignore
//! use railguard::prelude::*;
//! ```

pub mod chat;
pub mod guardrail;
pub mod search;

pub use chat::*;
pub use guardrail::*;
pub use search::*;
