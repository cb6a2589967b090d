//! Toolchain runner - executes one artifact and normalizes the result.
//!
//! This module provides:
//! - ExecutionResult / ExecStatus, the normalized outcome of one attempt
//! - Executor, the seam the repair orchestrator drives
//! - ToolchainRunner, dispatching by artifact kind to an interpreter,
//!   a compiler plus binary, or the static inspector

mod process;
mod result;
mod toolchain;

pub use process::{ProcessOutcome, run_captured};
pub use result::{ExecStatus, ExecutionResult};
pub use toolchain::{ToolchainConfig, ToolchainRunner, execute_path};

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::artifact::Artifact;

/// Produces exactly one ExecutionResult per call. Never fails outward.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute `artifact` using the source at `path` (the original or a staged copy).
    async fn execute(&self, artifact: &Artifact, path: &Path, cancel: &CancellationToken) -> ExecutionResult;
}
