//! `OpenAI` Chat Client
//!
//! Implements [`ChatCapability`] over `POST {base_url}/chat/completions`.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::config::OpenAiConfig;
use super::errors::classify_http_error;
use crate::error::LlmError;
use crate::execution::http::headers::DEFAULT_USER_AGENT;
use crate::execution::http::{HttpHeaderBuilder, post_json};
use crate::retry::maybe_retry;
use crate::traits::ChatCapability;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, FinishReason, Usage};

/// Wire body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<FinishReason>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// `OpenAI` chat client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client with a fresh HTTP client honouring `config.timeout`.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Self::with_http_client(config, http_client)
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_http_client(
        config: OpenAiConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, LlmError> {
        config.validate()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client from `OPENAI_API_KEY` / `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        Ok(HttpHeaderBuilder::new()
            .with_bearer_auth(self.config.api_key.expose_secret())?
            .with_json_content_type()
            .with_user_agent(DEFAULT_USER_AGENT)?
            .with_custom_headers(&self.config.headers)?
            .build())
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let body = ChatCompletionBody {
            model,
            messages: &request.messages,
            temperature: request.temperature.or(self.config.temperature),
        };
        let url = self.config.chat_url();

        tracing::debug!(
            model,
            messages = request.messages.len(),
            temperature = ?body.temperature,
            "sending chat completion"
        );

        let response = post_json(
            &self.http_client,
            &url,
            self.build_headers()?,
            &body,
            classify_http_error,
        )
        .await?;

        let completion: ChatCompletion = serde_json::from_value(response.body)?;
        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            LlmError::ParseError("chat completion returned no choices".to_string())
        })?;

        Ok(ChatResponse {
            id: completion.id,
            model: completion.model,
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: completion.usage,
        })
    }
}

#[async_trait]
impl ChatCapability for OpenAiClient {
    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        maybe_retry(self.config.retry.as_ref(), || self.send_once(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_request_overrides_before_defaults() {
        let request = ChatRequest::builder()
            .message(ChatMessage::user("hi"))
            .temperature(0.0)
            .build();
        let body = ChatCompletionBody {
            model: request.model.as_deref().unwrap_or("gpt-default"),
            messages: &request.messages,
            temperature: request.temperature.or(Some(0.5)),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-default");
        assert_eq!(value["temperature"], 0.0);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn client_rejects_missing_key() {
        let err = OpenAiClient::with_http_client(OpenAiConfig::default(), reqwest::Client::new())
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
    }
}
