//! Shared HTTP plumbing for the backends.

use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::client::LlmError;

/// Build the HTTP client every backend uses.
pub fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Send a JSON request and return the parsed JSON body, mapping HTTP failures to LlmError.
pub async fn send_json(request: RequestBuilder, body: &Value) -> Result<Value, LlmError> {
    let response = request
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    debug!("Backend responded with {}", status);

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(LlmError::RateLimited {
            retry_after: Duration::from_secs(retry_after),
        });
    }

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Follow a JSON pointer to a string, or explain what was missing.
pub fn string_at(body: &Value, pointer: &str) -> Result<String, LlmError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::InvalidResponse(format!("missing string at {}", pointer)))
}
