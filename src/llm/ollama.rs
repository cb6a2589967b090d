//! Local Ollama backend (`/api/generate`, no auth).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::backend::BackendConfig;
use super::client::{Backend, LlmError};
use super::transport::{http_client, send_json, string_at};

pub struct OllamaBackend {
    client: Client,
    config: BackendConfig,
}

impl OllamaBackend {
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        Ok(Self::with_client(http_client(config.request_timeout)?, config))
    }

    pub(crate) fn with_client(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!("{}/api/generate", self.config.endpoint)
    }

    fn build_request(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            }
        })
    }

    fn parse_response(body: &Value) -> Result<String, LlmError> {
        string_at(body, "/response")
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = self.build_request(prompt);
        let response = send_json(self.client.post(self.url()), &body).await?;
        Self::parse_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    fn backend() -> OllamaBackend {
        OllamaBackend::new(BackendConfig::for_provider(Provider::Ollama)).unwrap()
    }

    #[test]
    fn test_url() {
        assert_eq!(backend().url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_build_request() {
        let body = backend().build_request("fix it");
        assert_eq!(body["model"], "qwen2.5-coder:14b");
        assert_eq!(body["prompt"], "fix it");
        assert_eq!(body["stream"], false);
        assert!(body["options"]["temperature"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_parse_response() {
        let body = json!({"model": "m", "response": "```py\nx\n```", "done": true});
        assert_eq!(OllamaBackend::parse_response(&body).unwrap(), "```py\nx\n```");
        assert!(OllamaBackend::parse_response(&json!({"error": "model not found"})).is_err());
    }
}
