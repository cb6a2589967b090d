//! Error types for BugRescue
//!
//! Centralized error handling using thiserror. These errors only cover
//! whole-run failures; a single artifact's misbehavior is always folded into
//! its terminal status instead.

use thiserror::Error;

/// All run-level error types that can occur in BugRescue
#[derive(Debug, Error)]
pub enum RescueError {
    /// Configuration could not be resolved
    #[error("Config error: {0}")]
    Config(String),

    /// Scan root missing or unreadable
    #[error("Scan error: {0}")]
    Scan(String),

    /// Report or audit log could not be written
    #[error("Report error: {0}")]
    Report(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for BugRescue operations
pub type Result<T> = std::result::Result<T, RescueError>;
