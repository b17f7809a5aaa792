//! Weaviate client configuration

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::LlmError;
use crate::retry::RetryPolicy;

pub const URL_ENV: &str = "WEAVIATE_URL";
pub const API_KEY_ENV: &str = "WEAVIATE_API_KEY";
/// Key forwarded to the vector store's generative module
pub const GENERATIVE_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Header the vector store reads the generative-module key from
pub const GENERATIVE_API_KEY_HEADER: &str = "X-OpenAI-Api-Key";

/// Weaviate client configuration
#[derive(Debug, Clone)]
pub struct WeaviateConfig {
    /// Instance URL, e.g. `http://localhost:8080`
    pub url: String,
    /// Instance API key (sent as a bearer token when set)
    pub api_key: Option<SecretString>,
    /// Key for the generative module (sent as `X-OpenAI-Api-Key`)
    pub generative_api_key: Option<SecretString>,
    pub timeout: Option<Duration>,
    pub headers: HashMap<String, String>,
    pub retry: Option<RetryPolicy>,
}

impl WeaviateConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            generative_api_key: None,
            timeout: None,
            headers: HashMap::new(),
            retry: None,
        }
    }

    /// Read `WEAVIATE_URL` (required), `WEAVIATE_API_KEY` and `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, LlmError> {
        let url = non_empty_env(URL_ENV).ok_or_else(|| {
            LlmError::ConfigurationError(format!("{URL_ENV} environment variable not set"))
        })?;
        let mut config = Self::new(url);
        config.api_key = non_empty_env(API_KEY_ENV).map(SecretString::from);
        config.generative_api_key = non_empty_env(GENERATIVE_API_KEY_ENV).map(SecretString::from);
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn with_generative_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.generative_api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/v1/graphql", self.url.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        if self.url.trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "Weaviate URL cannot be empty".to_string(),
            ));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(LlmError::ConfigurationError(format!(
                "Weaviate URL '{}' must start with http:// or https://",
                self.url
            )));
        }
        if let Some(key) = &self.api_key
            && key.expose_secret().trim().is_empty()
        {
            return Err(LlmError::MissingApiKey(
                "Weaviate API key is set but empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
