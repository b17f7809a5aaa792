use crate::error::LlmError;
use serde_json::Value;

/// Classify an OpenAI HTTP error response.
///
/// OpenAI-style APIs return `{ "error": { "message": "...", "type": "...", "code": "..." } }`.
/// Bodies that don't match the envelope fall back to a status-only mapping.
pub fn classify_http_error(status: u16, body_text: &str) -> LlmError {
    classify_openai_error_envelope(status, body_text).unwrap_or_else(|| {
        let message = if body_text.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body_text.trim().to_string()
        };
        map_status(status, message, None)
    })
}

/// Parse the standard error envelope. Returns `None` when the body is not one.
pub fn classify_openai_error_envelope(status: u16, body_text: &str) -> Option<LlmError> {
    let json: Value = serde_json::from_str(body_text).ok()?;
    let error_obj = json.get("error")?;

    let message = error_obj
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error");
    let error_type = error_obj.get("type").and_then(|v| v.as_str());

    let mapped = match error_type.unwrap_or("") {
        "authentication_error" => LlmError::AuthenticationError(message.to_string()),
        "rate_limit_error" => LlmError::RateLimitError(message.to_string()),
        "insufficient_quota" => LlmError::QuotaExceededError(message.to_string()),
        "invalid_request_error" if status != 401 && status != 404 => {
            LlmError::InvalidInput(message.to_string())
        }
        _ => map_status(status, message.to_string(), Some(json.clone())),
    };

    Some(mapped)
}

fn map_status(status: u16, message: String, details: Option<Value>) -> LlmError {
    let lower = message.to_lowercase();

    if status == 401 || lower.contains("api key") || lower.contains("unauthorized") {
        return LlmError::AuthenticationError(message);
    }
    if lower.contains("quota") {
        return LlmError::QuotaExceededError(message);
    }
    if status == 429 || lower.contains("rate limit") {
        return LlmError::RateLimitError(message);
    }
    if status == 404 {
        return LlmError::NotFound(message);
    }
    if status == 400 {
        return LlmError::InvalidInput(message);
    }

    LlmError::ApiError {
        code: status,
        message: format!("openai API error: {message}"),
        details,
    }
}
