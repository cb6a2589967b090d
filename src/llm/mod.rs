//! AI backend layer
//!
//! This module provides:
//! - Backend, one HTTP transport per provider (Ollama, OpenAI, Groq, Anthropic, Gemini)
//! - PatchClient, the seam the repair orchestrator drives
//! - AiPatchClient, retrying any Backend with exponential backoff
//! - MockPatchClient for tests
//! - PromptBuilder, the fixed repair prompt

pub mod anthropic;
pub mod backend;
pub mod client;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod retry;
mod transport;

pub use backend::{BackendConfig, BackendOverrides, Provider, create_backend, create_patch_client};
pub use client::{
    AiPatchClient, BACKEND_ERROR_PREFIX, Backend, LlmError, MockPatchClient, PatchClient, is_backend_error,
};
pub use prompt::{PromptBuilder, head_chars, tail_chars};
pub use retry::RetryPolicy;
