//! Backend selection and configuration.
//!
//! The provider, endpoint, model and credential are resolved once at startup
//! into a [`BackendConfig`], which is then shared read-only for the whole run.

use std::time::Duration;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use super::anthropic::AnthropicBackend;
use super::client::{AiPatchClient, Backend, LlmError};
use super::gemini::GeminiBackend;
use super::ollama::OllamaBackend;
use super::openai::OpenAiBackend;
use super::prompt::PromptBuilder;
use super::retry::RetryPolicy;
use crate::config::BackendSettings;

/// Closed set of supported AI providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama server
    #[default]
    Ollama,
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
    Groq,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::Groq => "groq",
        }
    }

    /// `<PROVIDER>_API_KEY`
    pub fn api_key_env(&self) -> String {
        format!("{}_API_KEY", self.as_str().to_uppercase())
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Ollama => "http://localhost:11434",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "qwen2.5-coder:14b",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-latest",
            Provider::Gemini => "gemini-1.5-flash",
            Provider::Groq => "llama-3.3-70b-versatile",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct BackendOverrides {
    pub provider: Option<Provider>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Fully resolved backend configuration. Read-only after startup.
#[derive(Clone)]
pub struct BackendConfig {
    pub provider: Provider,
    /// Base URL; each backend appends its own request path
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl BackendConfig {
    /// Provider defaults with no credential.
    pub fn for_provider(provider: Provider) -> Self {
        let settings = BackendSettings::default();
        Self {
            provider,
            endpoint: provider.default_endpoint().to_string(),
            model: provider.default_model().to_string(),
            api_key: None,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            retry: RetryPolicy::new(settings.max_retries, Duration::from_millis(settings.backoff_base_ms)),
        }
    }

    /// Resolve from CLI overrides, then the config file, then the process environment.
    pub fn resolve(settings: &BackendSettings, overrides: &BackendOverrides) -> Self {
        Self::resolve_with(settings, overrides, |name| std::env::var(name).ok())
    }

    /// Same as [`BackendConfig::resolve`] with an injectable environment lookup.
    pub fn resolve_with(
        settings: &BackendSettings,
        overrides: &BackendOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let provider = overrides.provider.unwrap_or(settings.provider);

        let env_endpoint = match provider {
            // OLLAMA_URL historically names the full generate URL
            Provider::Ollama => env("OLLAMA_URL").map(|url| url.trim_end_matches("/api/generate").to_string()),
            _ => None,
        };
        let endpoint = overrides
            .endpoint
            .clone()
            .or_else(|| settings.endpoint.clone())
            .or(env_endpoint)
            .unwrap_or_else(|| provider.default_endpoint().to_string())
            .trim_end_matches('/')
            .to_string();

        let model = overrides
            .model
            .clone()
            .or_else(|| settings.model.clone())
            .unwrap_or_else(|| provider.default_model().to_string());

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| settings.api_key.clone())
            .or_else(|| env(&provider.api_key_env()))
            .filter(|k| !k.trim().is_empty());

        let config = Self {
            provider,
            endpoint,
            model,
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            retry: RetryPolicy::new(settings.max_retries, Duration::from_millis(settings.backoff_base_ms)),
        };
        info!("Resolved backend: {:?}", config);
        config
    }

    /// The credential, or a terminal MissingApiKey error.
    pub fn require_api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or_else(|| LlmError::MissingApiKey {
            env_var: self.provider.api_key_env(),
        })
    }
}

// Never print the credential
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Factory: one concrete Backend per provider.
pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn Backend>, LlmError> {
    let config = config.clone();
    Ok(match config.provider {
        Provider::Ollama => Box::new(OllamaBackend::new(config)?),
        Provider::OpenAi | Provider::Groq => Box::new(OpenAiBackend::new(config)?),
        Provider::Anthropic => Box::new(AnthropicBackend::new(config)?),
        Provider::Gemini => Box::new(GeminiBackend::new(config)?),
    })
}

/// Build the retrying patch client for a resolved configuration.
pub fn create_patch_client(config: &BackendConfig, prompt: PromptBuilder) -> Result<AiPatchClient, LlmError> {
    let backend = create_backend(config)?;
    info!(
        "Patch client for {}: {} attempt(s), up to {}ms of backoff per request",
        backend.name(),
        config.retry.max_attempts,
        config.retry.total_backoff().as_millis()
    );
    Ok(AiPatchClient::new(backend, config.retry, prompt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_api_key_env_names() {
        assert_eq!(Provider::OpenAi.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(Provider::Groq.api_key_env(), "GROQ_API_KEY");
        assert!(!Provider::Ollama.requires_api_key());
        assert!(Provider::Gemini.requires_api_key());
    }

    #[test]
    fn test_resolve_defaults() {
        let config =
            BackendConfig::resolve_with(&BackendSettings::default(), &BackendOverrides::default(), env_of(&[]));
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.model, "qwen2.5-coder:14b");
        assert!(config.api_key.is_none());
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_resolve_key_from_env() {
        let overrides = BackendOverrides {
            provider: Some(Provider::Anthropic),
            ..Default::default()
        };
        let config = BackendConfig::resolve_with(
            &BackendSettings::default(),
            &overrides,
            env_of(&[("ANTHROPIC_API_KEY", "sk-env")]),
        );
        assert_eq!(config.require_api_key().unwrap(), "sk-env");
        assert_eq!(config.model, Provider::Anthropic.default_model());
    }

    #[test]
    fn test_resolve_precedence() {
        let settings = BackendSettings {
            provider: Provider::OpenAi,
            model: Some("from-file".to_string()),
            api_key: Some("file-key".to_string()),
            ..Default::default()
        };
        let overrides = BackendOverrides {
            model: Some("from-cli".to_string()),
            endpoint: Some("http://proxy.local/v1/".to_string()),
            ..Default::default()
        };
        let config = BackendConfig::resolve_with(&settings, &overrides, env_of(&[("OPENAI_API_KEY", "env-key")]));
        assert_eq!(config.model, "from-cli");
        assert_eq!(config.endpoint, "http://proxy.local/v1");
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_ollama_url_env() {
        let config = BackendConfig::resolve_with(
            &BackendSettings::default(),
            &BackendOverrides::default(),
            env_of(&[("OLLAMA_URL", "http://gpu-box:11434/api/generate")]),
        );
        assert_eq!(config.endpoint, "http://gpu-box:11434");
    }

    #[test]
    fn test_blank_key_is_missing() {
        let overrides = BackendOverrides {
            provider: Some(Provider::Gemini),
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        let config = BackendConfig::resolve_with(&BackendSettings::default(), &overrides, env_of(&[]));
        assert!(matches!(config.require_api_key(), Err(LlmError::MissingApiKey { .. })));
    }

    #[test]
    fn test_debug_hides_key() {
        let mut config = BackendConfig::for_provider(Provider::OpenAi);
        config.api_key = Some("sk-very-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<set>"));
    }

    #[test]
    fn test_factory_names() {
        for provider in [Provider::Ollama, Provider::OpenAi, Provider::Anthropic, Provider::Gemini, Provider::Groq] {
            let backend = create_backend(&BackendConfig::for_provider(provider)).unwrap();
            assert_eq!(backend.name(), provider.as_str());
        }
    }

    #[test]
    fn test_provider_serde() {
        let provider: Provider = serde_yaml::from_str("openai").unwrap();
        assert_eq!(provider, Provider::OpenAi);
        assert_eq!(serde_json::to_string(&Provider::Groq).unwrap(), "\"groq\"");
    }
}
