//! Remote service clients
//!
//! - **`openai`** - Chat completion over the OpenAI-style `/chat/completions` API
//! - **`weaviate`** - Generative near-text search over the Weaviate GraphQL API

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "weaviate")]
pub mod weaviate;
