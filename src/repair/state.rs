//! Per-artifact repair state.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::outcome::OutcomeStatus;
use crate::artifact::Artifact;
use crate::runner::{ExecStatus, ExecutionResult};

/// Where an artifact is in the run-diagnose-patch-verify cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairState {
    Pending,
    /// Running the original source
    Executing,
    Diagnosing,
    Patching,
    /// Running a staged candidate
    Verifying,
    Terminal(OutcomeStatus),
}

impl RepairState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RepairState::Terminal(_))
    }
}

/// One patch request and its verdict. Appended to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairAttempt {
    pub artifact: PathBuf,
    /// 1-based index of the execution that triggered this request
    pub attempt: u32,
    pub trigger: ExecStatus,
    pub diagnostic: String,
    pub prompt: String,
    pub raw_output: String,
    pub candidate: String,
    pub candidate_sha256: String,
    pub accepted: bool,
    pub rejection: Option<String>,
    pub staged_path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

impl RepairAttempt {
    pub fn new(
        artifact: &Artifact,
        attempt: u32,
        trigger: &ExecutionResult,
        prompt: String,
        raw_output: String,
        candidate: String,
    ) -> Self {
        Self {
            artifact: artifact.path.clone(),
            attempt,
            trigger: trigger.status,
            diagnostic: trigger.diagnostic(),
            prompt,
            raw_output,
            candidate_sha256: sha256_hex(&candidate),
            candidate,
            accepted: false,
            rejection: None,
            staged_path: None,
            timestamp: Utc::now(),
        }
    }

    pub fn reject(&mut self, reason: impl Into<String>) {
        self.accepted = false;
        self.rejection = Some(reason.into());
    }

    pub fn accept(&mut self, staged_path: PathBuf) {
        self.accepted = true;
        self.rejection = None;
        self.staged_path = Some(staged_path);
    }
}

pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Mutable bookkeeping for one artifact while it is being processed.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    pub artifact: Artifact,
    pub state: RepairState,
    /// Source used for the next execution: the original, then the latest staged candidate
    active_path: PathBuf,
    pub executions: Vec<ExecutionResult>,
    pub attempts: Vec<RepairAttempt>,
    pub backup_path: Option<PathBuf>,
}

impl ArtifactRecord {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            active_path: artifact.path.clone(),
            artifact,
            state: RepairState::Pending,
            executions: Vec::new(),
            attempts: Vec::new(),
            backup_path: None,
        }
    }

    pub fn active_path(&self) -> &PathBuf {
        &self.active_path
    }

    /// Staged copy in use, if a candidate was ever accepted.
    pub fn staged_path(&self) -> Option<&PathBuf> {
        (self.active_path != self.artifact.path).then_some(&self.active_path)
    }

    pub fn transition(&mut self, next: RepairState) {
        debug!("{}: {:?} -> {:?}", self.artifact.path.display(), self.state, next);
        self.state = next;
    }

    /// Patching -> Verifying: the staged candidate becomes the active source.
    pub fn activate(&mut self, staged: PathBuf) {
        self.active_path = staged;
        self.transition(RepairState::Verifying);
    }

    pub fn execution_count(&self) -> u32 {
        self.executions.len() as u32
    }
}
