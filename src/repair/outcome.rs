//! Terminal classifications and the aggregate run summary.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::state::RepairAttempt;
use crate::artifact::file_name_of;
use crate::llm::head_chars;

/// Exit code when the run was interrupted.
pub const EXIT_CANCELLED: i32 = 130;

/// Final classification of one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Passed on the first execution
    Clean,
    /// Passed on a staged candidate
    Fixed,
    Failed,
    /// Toolchain missing or kind unsupported
    Skipped,
}

impl OutcomeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Clean => "CLEAN",
            OutcomeStatus::Fixed => "FIXED",
            OutcomeStatus::Failed => "FAILED",
            OutcomeStatus::Skipped => "SKIPPED",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, OutcomeStatus::Clean | OutcomeStatus::Fixed)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One artifact's terminal record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    pub file: String,
    pub path: PathBuf,
    pub status: OutcomeStatus,
    /// Last diagnostic, truncated for reporting
    pub diagnostic: String,
    /// Number of executions performed
    pub attempts: u32,
    pub backup_path: Option<PathBuf>,
    pub staged_path: Option<PathBuf>,
}

impl OutcomeEntry {
    pub fn new(path: impl Into<PathBuf>, status: OutcomeStatus, diagnostic: &str, max_chars: usize) -> Self {
        let path = path.into();
        Self {
            file: file_name_of(&path),
            path,
            status,
            diagnostic: head_chars(diagnostic.trim(), max_chars).to_string(),
            attempts: 0,
            backup_path: None,
            staged_path: None,
        }
    }
}

/// Everything a run produced, in processing order.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub entries: Vec<OutcomeEntry>,
    /// Artifacts never brought to a terminal status because the run was cancelled
    pub not_processed: Vec<PathBuf>,
    pub attempts: Vec<RepairAttempt>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            entries: Vec::new(),
            not_processed: Vec::new(),
            attempts: Vec::new(),
            cancelled: false,
        }
    }

    fn count(&self, pred: impl Fn(OutcomeStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(e.status)).count()
    }

    /// Clean plus Fixed
    pub fn passed(&self) -> usize {
        self.count(|s| s.is_passed())
    }

    pub fn failed(&self) -> usize {
        self.count(|s| s == OutcomeStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| s == OutcomeStatus::Skipped)
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, file: &str) -> Option<&OutcomeEntry> {
        self.entries.iter().find(|e| e.file == file)
    }

    /// 130 if cancelled, 1 if anything Failed, else 0.
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            EXIT_CANCELLED
        } else if self.failed() > 0 {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_of(statuses: &[OutcomeStatus]) -> RunSummary {
        let mut summary = RunSummary::new(Local::now());
        for (i, status) in statuses.iter().enumerate() {
            summary
                .entries
                .push(OutcomeEntry::new(format!("src/f{}.py", i), *status, "", 120));
        }
        summary
    }

    #[test]
    fn test_counts() {
        let summary = summary_of(&[
            OutcomeStatus::Clean,
            OutcomeStatus::Fixed,
            OutcomeStatus::Failed,
            OutcomeStatus::Skipped,
        ]);
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(summary_of(&[OutcomeStatus::Clean, OutcomeStatus::Skipped]).exit_code(), 0);
        assert_eq!(summary_of(&[OutcomeStatus::Fixed, OutcomeStatus::Failed]).exit_code(), 1);

        let mut cancelled = summary_of(&[OutcomeStatus::Failed]);
        cancelled.cancelled = true;
        assert_eq!(cancelled.exit_code(), EXIT_CANCELLED);

        assert_eq!(summary_of(&[]).exit_code(), 0);
    }

    #[test]
    fn test_entry_truncates_diagnostic() {
        let long = format!("  {}  ", "é".repeat(500));
        let entry = OutcomeEntry::new("a/b/c.rs", OutcomeStatus::Failed, &long, 120);
        assert_eq!(entry.file, "c.rs");
        assert_eq!(entry.diagnostic.chars().count(), 120);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&OutcomeStatus::Fixed).unwrap(), "\"fixed\"");
        assert_eq!(OutcomeStatus::Skipped.to_string(), "SKIPPED");
    }
}
