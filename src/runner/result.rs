//! Normalized execution results.

use serde::{Deserialize, Serialize};

/// Classification of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ExecStatus {
    Success,
    /// Non-zero exit, compile failure, or failed static check
    Failure { code: Option<i32> },
    /// Killed after exceeding the wall-clock limit
    Timeout,
    /// Toolchain missing or kind unsupported; never retried
    Skipped,
    /// Could not read, spawn or stage; aborts the artifact
    InternalError,
    /// Aborted by external cancellation
    Cancelled,
}

impl ExecStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecStatus::Success)
    }

    /// Failures a patch might plausibly fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecStatus::Failure { .. } | ExecStatus::Timeout)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExecStatus::Success => "success",
            ExecStatus::Failure { .. } => "failure",
            ExecStatus::Timeout => "timeout",
            ExecStatus::Skipped => "skipped",
            ExecStatus::InternalError => "internal_error",
            ExecStatus::Cancelled => "cancelled",
        }
    }
}

/// Outcome of running or inspecting one artifact once. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(flatten)]
    pub status: ExecStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Success,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn failure(code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Failure { code },
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn timeout(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Timeout,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Skipped,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::InternalError,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: ExecStatus::Cancelled,
            stdout: String::new(),
            stderr: "CANCELLED".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The diagnostic text: stderr when present, otherwise stdout.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let result = ExecutionResult::failure(Some(1), "some output", "  Traceback: boom\n");
        assert_eq!(result.diagnostic(), "Traceback: boom");
    }

    #[test]
    fn test_diagnostic_falls_back_to_stdout() {
        let result = ExecutionResult::failure(Some(2), "usage: x\n", "   ");
        assert_eq!(result.diagnostic(), "usage: x");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(ExecStatus::Failure { code: Some(1) }.is_retryable());
        assert!(ExecStatus::Timeout.is_retryable());
        assert!(!ExecStatus::Skipped.is_retryable());
        assert!(!ExecStatus::InternalError.is_retryable());
        assert!(!ExecStatus::Cancelled.is_retryable());
        assert!(!ExecStatus::Success.is_retryable());
    }

    #[test]
    fn test_constructors() {
        assert!(ExecutionResult::success("ok", "").is_success());
        assert_eq!(ExecutionResult::skipped("no python3").status, ExecStatus::Skipped);
        assert_eq!(ExecutionResult::skipped("no python3").diagnostic(), "no python3");
        assert_eq!(ExecutionResult::timeout("", "TIMEOUT").status, ExecStatus::Timeout);
        assert_eq!(ExecutionResult::cancelled().status.label(), "cancelled");
    }

    #[test]
    fn test_serializes_flat_status() {
        let result = ExecutionResult::failure(Some(3), "", "bad");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["code"], 3);
        assert_eq!(json["stderr"], "bad");
    }
}
