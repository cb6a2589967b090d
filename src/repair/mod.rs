//! Repair loop: per-artifact state, persisted stores, terminal outcomes and
//! the orchestrator that ties the runner and the AI client together.

mod orchestrator;
mod outcome;
mod state;
mod store;

pub use orchestrator::{AUDIT_FILE, RepairConfig, RepairOrchestrator};
pub use outcome::{EXIT_CANCELLED, OutcomeEntry, OutcomeStatus, RunSummary};
pub use state::{ArtifactRecord, RepairAttempt, RepairState, sha256_hex};
pub use store::{BackupStore, StagingStore};
