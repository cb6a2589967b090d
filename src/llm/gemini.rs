//! Google Gemini `generateContent` backend. The key travels as a query parameter.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::backend::BackendConfig;
use super::client::{Backend, LlmError};
use super::transport::{http_client, send_json};

pub struct GeminiBackend {
    client: Client,
    config: BackendConfig,
}

impl GeminiBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            config,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.endpoint, self.config.model)
    }

    fn build_request(&self, prompt: &str) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        })
    }

    fn parse_response(body: &Value) -> Result<String, LlmError> {
        let parts = body
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .ok_or_else(|| LlmError::InvalidResponse("missing candidates[0].content.parts".to_string()))?;

        Ok(parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.config.require_api_key()?;
        let body = self.build_request(prompt);
        let request = self.client.post(self.url()).query(&[("key", api_key)]);
        let response = send_json(request, &body).await?;
        Self::parse_response(&response)
    }
}
