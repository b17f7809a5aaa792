//! Weaviate Client
//!
//! Implements [`GenerativeSearchCapability`] over the GraphQL endpoint.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use super::config::{GENERATIVE_API_KEY_HEADER, WeaviateConfig};
use super::graphql::{parse_response, render_query};
use crate::error::LlmError;
use crate::execution::http::headers::DEFAULT_USER_AGENT;
use crate::execution::http::{HttpHeaderBuilder, post_json};
use crate::retry::maybe_retry;
use crate::traits::GenerativeSearchCapability;
use crate::types::{SearchRecord, SearchRequest};

#[derive(Debug, Clone)]
pub struct WeaviateClient {
    config: WeaviateConfig,
    http_client: reqwest::Client,
}

impl WeaviateClient {
    pub fn new(config: WeaviateConfig) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Self::with_http_client(config, http_client)
    }

    pub fn with_http_client(
        config: WeaviateConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, LlmError> {
        config.validate()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(WeaviateConfig::from_env()?)
    }

    pub fn config(&self) -> &WeaviateConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut builder = HttpHeaderBuilder::new()
            .with_json_content_type()
            .with_user_agent(DEFAULT_USER_AGENT)?;
        if let Some(key) = &self.config.api_key {
            builder = builder.with_bearer_auth(key.expose_secret())?;
        }
        if let Some(key) = &self.config.generative_api_key {
            builder = builder.with_secret_header(GENERATIVE_API_KEY_HEADER, key.expose_secret())?;
        }
        Ok(builder.with_custom_headers(&self.config.headers)?.build())
    }

    async fn send_once(&self, query: &str) -> Result<Value, LlmError> {
        let body = json!({ "query": query });
        let response = post_json(
            &self.http_client,
            &self.config.graphql_url(),
            self.build_headers()?,
            &body,
            classify_http_error,
        )
        .await?;
        Ok(response.body)
    }
}

#[async_trait]
impl GenerativeSearchCapability for WeaviateClient {
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchRecord>, LlmError> {
        let query = render_query(&request)?;
        tracing::debug!(
            collection = %request.collection,
            limit = ?request.limit,
            distance = ?request.near_text.distance,
            grouped = request.generate.as_ref().is_some_and(|g| g.is_grouped()),
            "sending generative search"
        );

        let body = maybe_retry(self.config.retry.as_ref(), || self.send_once(&query)).await?;
        let records = parse_response(&request.collection, &body)?;

        tracing::debug!(
            collection = %request.collection,
            records = records.len(),
            "generative search complete"
        );
        Ok(records)
    }
}

/// Map a non-2xx GraphQL response. Weaviate error bodies look like
/// `{"error": [{"message": "..."}]}`.
fn classify_http_error(status: u16, body_text: &str) -> LlmError {
    let message = serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/0/message")
                .or_else(|| v.pointer("/errors/0/message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.trim().to_string());

    match status {
        401 | 403 => LlmError::AuthenticationError(message),
        404 => LlmError::NotFound(message),
        422 | 400 => LlmError::InvalidInput(message),
        429 => LlmError::RateLimitError(message),
        _ => LlmError::ApiError {
            code: status,
            message: format!("weaviate API error: {message}"),
            details: serde_json::from_str(body_text).ok(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_is_extracted() {
        let err = classify_http_error(401, r#"{"error":[{"message":"anonymous access not enabled"}]}"#);
        match err {
            LlmError::AuthenticationError(msg) => assert_eq!(msg, "anonymous access not enabled"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn headers_carry_both_keys() {
        let client = WeaviateClient::with_http_client(
            WeaviateConfig::new("http://localhost:8080")
                .with_api_key("wv-key")
                .with_generative_api_key("sk-gen"),
            reqwest::Client::new(),
        )
        .unwrap();
        let headers = client.build_headers().unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer wv-key");
        assert_eq!(headers.get("x-openai-api-key").unwrap(), "sk-gen");
    }
}
