//! OpenAI-compatible chat completions backend (OpenAI, Groq).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::backend::BackendConfig;
use super::client::{Backend, LlmError};
use super::transport::{http_client, send_json, string_at};

pub struct OpenAiBackend {
    client: Client,
    config: BackendConfig,
}

impl OpenAiBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            config,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint)
    }

    fn build_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        })
    }

    fn parse_response(body: &Value) -> Result<String, LlmError> {
        string_at(body, "/choices/0/message/content")
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn name(&self) -> &str {
        self.config.provider.as_str()
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.config.require_api_key()?;
        let body = self.build_request(prompt);
        let request = self.client.post(self.url()).bearer_auth(api_key);
        let response = send_json(request, &body).await?;
        Self::parse_response(&response)
    }
}
