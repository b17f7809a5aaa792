//! Core error types

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors raised by remote calls, guardrails and search.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success status with no more specific mapping.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceededError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    /// A response was received but its content could not be interpreted
    /// (e.g. a non-numeric moderation score).
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// The vector store reported an error inside a successful response.
    #[error("Search error: {0}")]
    SearchError(String),

    /// A task was cancelled before it produced a result.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse classification used for retry decisions and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    RateLimit,
    Client,
    Server,
    Parsing,
    Configuration,
    Cancelled,
    Internal,
}

impl LlmError {
    /// Shorthand for an `ApiError` without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::AuthenticationError(_) => Some(401),
            Self::RateLimitError(_) => Some(429),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::TimeoutError(_) => ErrorCategory::Network,
            Self::AuthenticationError(_) | Self::MissingApiKey(_) => ErrorCategory::Authentication,
            Self::RateLimitError(_) | Self::QuotaExceededError(_) => ErrorCategory::RateLimit,
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } | Self::InvalidInput(_) | Self::NotFound(_) => {
                ErrorCategory::Client
            }
            Self::JsonError(_) | Self::ParseError(_) | Self::SearchError(_) => {
                ErrorCategory::Parsing
            }
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::Cancelled(_) => ErrorCategory::Cancelled,
            Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::RateLimit | ErrorCategory::Server
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = LlmError::api_error(503, "unavailable");
        assert_eq!(err.category(), ErrorCategory::Server);
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), Some(503));
    }

    #[test]
    fn client_and_parse_errors_are_not_retryable() {
        assert!(!LlmError::api_error(404, "missing").is_retryable());
        assert!(!LlmError::ParseError("not a number".into()).is_retryable());
        assert!(!LlmError::SearchError("bad class".into()).is_retryable());
        assert!(LlmError::RateLimitError("slow down".into()).is_retryable());
    }
}
