//! # Railguard - Guarded LLM Chat and Generative Search
//!
//! Railguard wraps a chat-completion service with guardrails and provides a
//! thin generative-search helper over a vector database.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Input guardrails**: classifiers such as the topical guardrail run
//!   concurrently with generation; a veto cancels the in-flight generation.
//! - **Output guardrails**: rubric-based moderation of the generated text.
//! - **Capability traits**: chat, search and guardrails are trait objects,
//!   so any backend (or a test double) can be plugged in.
//! - **Generative search**: near-text search with per-record or grouped
//!   generation over the Weaviate GraphQL API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use railguard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(OpenAiClient::from_env()?);
//!     let guarded = GuardedChat::from_config(client, &GuardrailConfig::default());
//!
//!     let response = guarded
//!         .execute_with_output_checks("What are the best breeds of dog for people that like cats?")
//!         .await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod guardrails;
pub mod providers;
pub mod retry;
pub mod search;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::LlmError;

/// Commonly used types and traits
pub mod prelude {
    pub use crate::error::LlmError;
    pub use crate::guardrails::{
        GuardedChat, GuardrailConfig, ModerationGuardrail, ModerationRubric, RacePolicy,
        TopicalGuardrail,
    };
    pub use crate::retry::RetryPolicy;
    pub use crate::search::{GenerativeSearch, SearchSettings};
    pub use crate::traits::{
        ChatCapability, ChatExtensions, GenerativeSearchCapability, InputGuardrail,
        OutputGuardrail,
    };
    pub use crate::types::{
        ChatMessage, ChatRequest, ChatResponse, GenerativeInstruction, GuardedResponse,
        GuardrailVerdict, MessageRole, NearText, SearchRecord, SearchRequest,
    };
    pub use crate::utils::CancelHandle;

    #[cfg(feature = "openai")]
    pub use crate::providers::openai::{OpenAiClient, OpenAiConfig};
    #[cfg(feature = "weaviate")]
    pub use crate::providers::weaviate::{WeaviateClient, WeaviateConfig};
}
