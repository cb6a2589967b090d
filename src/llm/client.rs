//! Core AI client types and trait definitions

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use super::prompt::PromptBuilder;
use super::retry::RetryPolicy;

/// Every failure handed back as an "answer" starts with this marker.
pub const BACKEND_ERROR_PREFIX: &str = "[bugrescue:backend-error]";

/// One provider's transport: send a prompt, get the model's text back.
///
/// Implementations differ only in URL, auth, payload shape and response path.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Provider name for logs and error strings
    fn name(&self) -> &str;

    /// Single request, no retry
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Asks a model for a patched version of a failing source file.
///
/// Never fails outward: transport problems come back as strings starting
/// with [`BACKEND_ERROR_PREFIX`].
#[async_trait]
pub trait PatchClient: Send + Sync {
    /// The exact prompt that `send_prompt` will be given for this input
    fn build_prompt(&self, source: &str, diagnostic: &str) -> String;

    /// Send a prebuilt prompt and return the raw model output
    async fn send_prompt(&self, prompt: &str) -> String;

    async fn request_patch(&self, source: &str, diagnostic: &str) -> String {
        let prompt = self.build_prompt(source, diagnostic);
        self.send_prompt(&prompt).await
    }
}

/// Errors that can occur while talking to a backend
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing API key: set {env_var} or pass --api-key")]
    MissingApiKey { env_var: String },
}

impl LlmError {
    /// Transport and parsing problems are retried; auth and request problems are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => true,
            LlmError::JsonError(_) => true,
            LlmError::MissingApiKey { .. } => false,
        }
    }
}

/// Whether a raw answer is an error string from the client rather than model output.
pub fn is_backend_error(raw: &str) -> bool {
    raw.trim_start().starts_with(BACKEND_ERROR_PREFIX)
}

/// PatchClient over any Backend, with retry and exponential backoff.
pub struct AiPatchClient {
    backend: Box<dyn Backend>,
    policy: RetryPolicy,
    prompt: PromptBuilder,
}

impl AiPatchClient {
    pub fn new(backend: Box<dyn Backend>, policy: RetryPolicy, prompt: PromptBuilder) -> Self {
        Self { backend, policy, prompt }
    }
}

#[async_trait]
impl PatchClient for AiPatchClient {
    fn build_prompt(&self, source: &str, diagnostic: &str) -> String {
        self.prompt.build(source, diagnostic)
    }

    async fn send_prompt(&self, prompt: &str) -> String {
        let mut attempt = 1;
        loop {
            debug!("Requesting patch from {} (attempt {}/{})", self.backend.name(), attempt, self.policy.max_attempts);

            match self.backend.complete(prompt).await {
                Ok(text) => return text,
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = match &e {
                        LlmError::RateLimited { retry_after } => (*retry_after).max(self.policy.delay_for(attempt)),
                        _ => self.policy.delay_for(attempt),
                    };
                    warn!(
                        "{} request failed ({}); retrying in {}ms ({}/{})",
                        self.backend.name(),
                        e,
                        delay.as_millis(),
                        attempt,
                        self.policy.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("{} request gave up after {} attempt(s): {}", self.backend.name(), attempt, e);
                    return format!(
                        "{} {} request failed after {} attempt(s): {}",
                        BACKEND_ERROR_PREFIX,
                        self.backend.name(),
                        attempt,
                        e
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for AiPatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiPatchClient")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .finish()
    }
}

type Responder = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Scripted PatchClient for tests and offline runs.
///
/// Answers come from a queue (the last answer repeats once the queue
/// drains) or from a function of the prompt.
pub struct MockPatchClient {
    queue: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    responder: Option<Responder>,
    prompt: PromptBuilder,
    prompts: Mutex<Vec<String>>,
}

impl MockPatchClient {
    /// Always answer with `response`
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::sequence(vec![response.into()])
    }

    /// Answer with each response in turn
    pub fn sequence(responses: Vec<String>) -> Self {
        Self {
            queue: Mutex::new(responses.into()),
            last: Mutex::new(String::new()),
            responder: None,
            prompt: PromptBuilder::default(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer by applying `f` to the prompt
    pub fn from_fn(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            responder: Some(Box::new(f)),
            ..Self::sequence(Vec::new())
        }
    }

    /// Number of prompts sent so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Every prompt sent so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PatchClient for MockPatchClient {
    fn build_prompt(&self, source: &str, diagnostic: &str) -> String {
        self.prompt.build(source, diagnostic)
    }

    async fn send_prompt(&self, prompt: &str) -> String {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(responder) = &self.responder {
            return responder(prompt);
        }

        let (Ok(mut queue), Ok(mut last)) = (self.queue.lock(), self.last.lock()) else {
            return format!("{} mock state poisoned", BACKEND_ERROR_PREFIX);
        };
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        last.clone()
    }
}
