//! JSON POST execution with status classification.

use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::error::LlmError;

/// Raw response body of a successful request.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// POST `body` as JSON to `url`.
///
/// Non-2xx responses are handed to `classify` together with the status and the
/// raw body text; it must turn them into an [`LlmError`].
pub async fn post_json<B, C>(
    http_client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &B,
    classify: C,
) -> Result<JsonResponse, LlmError>
where
    B: Serialize + ?Sized,
    C: FnOnce(u16, &str) -> LlmError,
{
    let response = http_client
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), url, "remote call failed");
        return Err(classify(status.as_u16(), &text));
    }

    let body = serde_json::from_str(&text).map_err(|e| {
        LlmError::ParseError(format!("response from {url} is not valid JSON: {e}"))
    })?;

    Ok(JsonResponse {
        status: status.as_u16(),
        body,
    })
}
