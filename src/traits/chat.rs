//! Chat capability traits and extensions

use crate::error::LlmError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;

#[async_trait]
pub trait ChatCapability: Send + Sync {
    /// Full chat request. Unset model/temperature fall back to the client's defaults.
    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        self.chat_request(ChatRequest::new(messages)).await
    }
}

/// Convenience helpers layered over [`ChatCapability`].
#[async_trait]
pub trait ChatExtensions: ChatCapability {
    /// One system prompt plus one user turn, returning only the text.
    async fn ask_with_system(
        &self,
        system: &str,
        user: &str,
        model: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String, LlmError> {
        let mut builder = ChatRequest::builder()
            .message(ChatMessage::system(system))
            .message(ChatMessage::user(user));
        if let Some(model) = model {
            builder = builder.model(model);
        }
        if let Some(t) = temperature {
            builder = builder.temperature(t);
        }
        Ok(self.chat_request(builder.build()).await?.into_text())
    }
}

impl<T: ChatCapability + ?Sized> ChatExtensions for T {}
