//! Generative search capability trait

use crate::error::LlmError;
use crate::types::{SearchRecord, SearchRequest};
use async_trait::async_trait;

#[async_trait]
pub trait GenerativeSearchCapability: Send + Sync {
    /// Execute a near-text search with an optional generation instruction and
    /// return the unwrapped record list.
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchRecord>, LlmError>;
}
