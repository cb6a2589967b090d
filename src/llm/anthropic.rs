//! Anthropic API backend
//!
//! This module implements the Backend trait for the Anthropic messages API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::backend::BackendConfig;
use super::client::{Backend, LlmError};
use super::transport::{http_client, send_json};

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API client
pub struct AnthropicBackend {
    client: Client,
    config: BackendConfig,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            config,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/messages", self.config.endpoint)
    }

    /// Build the request body for the Anthropic API
    fn build_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }

    /// Concatenate the text blocks of a response
    fn parse_response(body: &Value) -> Result<String, LlmError> {
        let blocks = body["content"]
            .as_array()
            .ok_or_else(|| LlmError::InvalidResponse("missing content array".to_string()))?;

        let mut content = String::new();
        for block in blocks {
            if block["type"].as_str() == Some("text") {
                if let Some(text) = block["text"].as_str() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(text);
                }
            }
        }

        Ok(content)
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.config.require_api_key()?;
        let body = self.build_request(prompt);
        let request = self
            .client
            .post(self.url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let response = send_json(request, &body).await?;
        Self::parse_response(&response)
    }
}
