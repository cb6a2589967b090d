//! Per-kind execution: interpret, compile-then-run, or inspect.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use super::Executor;
use super::process::{ProcessOutcome, run_captured};
use super::result::ExecutionResult;
use crate::artifact::{Artifact, ArtifactKind, Handler};
use crate::config::{Programs, RunnerSettings};
use crate::inspect::StaticInspector;

/// Configuration for the toolchain runner
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Wall-clock limit for running an artifact
    pub timeout: Duration,
    /// Wall-clock limit for a compile step
    pub compile_timeout: Duration,
    pub programs: Programs,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self::from(&RunnerSettings::default())
    }
}

impl From<&RunnerSettings> for ToolchainConfig {
    fn from(settings: &RunnerSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            compile_timeout: Duration::from_millis(settings.compile_timeout_ms),
            programs: settings.programs.clone(),
        }
    }
}

impl ToolchainConfig {
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Duration::from_millis(ms);
        self
    }

    pub fn programs(mut self, programs: Programs) -> Self {
        self.programs = programs;
        self
    }
}

/// Runs artifacts with their toolchain and normalizes the outcome.
#[derive(Debug, Clone, Default)]
pub struct ToolchainRunner {
    config: ToolchainConfig,
    inspector: StaticInspector,
}

impl ToolchainRunner {
    pub fn new(config: ToolchainConfig) -> Self {
        Self {
            config,
            inspector: StaticInspector::new(),
        }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Deterministic binary location for a compiled artifact: the source path minus its extension.
    pub fn binary_path(source: &Path) -> PathBuf {
        let binary = source.with_extension("");
        // A bare name would be looked up on PATH
        match binary.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => binary,
            _ => Path::new(".").join(binary),
        }
    }

    async fn interpret(
        &self,
        program: &str,
        args: &[String],
        path: &Path,
        cancel: &CancellationToken,
    ) -> ExecutionResult {
        let mut argv: Vec<OsString> = args.iter().map(OsString::from).collect();
        argv.push(path.as_os_str().to_owned());

        let outcome = run_captured(Path::new(program), &argv, self.config.timeout, cancel).await;
        self.classify(outcome, program, self.config.timeout)
    }

    async fn compile_and_run(
        &self,
        compiler: &str,
        label: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> ExecutionResult {
        let binary = Self::binary_path(path);
        let argv = vec![path.as_os_str().to_owned(), OsString::from("-o"), binary.as_os_str().to_owned()];

        let compiled = run_captured(Path::new(compiler), &argv, self.config.compile_timeout, cancel).await;
        match compiled {
            ProcessOutcome::Exited { status, .. } if status.success() => {
                debug!("{} compile ok: {}", label, binary.display());
            }
            ProcessOutcome::Exited { status, stdout, stderr } => {
                return ExecutionResult::failure(
                    status.code(),
                    stdout,
                    format!("{} compile failed:\n{}", label, stderr.trim_end()),
                );
            }
            ProcessOutcome::TimedOut { stdout, stderr } => {
                return ExecutionResult::timeout(
                    stdout,
                    format!(
                        "{}\n{} compile TIMEOUT: exceeded {}ms",
                        stderr.trim_end(),
                        label,
                        self.config.compile_timeout.as_millis()
                    ),
                );
            }
            other => return self.classify(other, compiler, self.config.compile_timeout),
        }

        let outcome = run_captured(&binary, &[], self.config.timeout, cancel).await;
        match outcome {
            // The compiler claimed success but left no binary behind
            ProcessOutcome::NotFound => ExecutionResult::internal_error(format!(
                "{} compiler reported success but {} is missing",
                label,
                binary.display()
            )),
            other => self.classify(other, &binary.to_string_lossy(), self.config.timeout),
        }
    }

    fn classify(&self, outcome: ProcessOutcome, program: &str, limit: Duration) -> ExecutionResult {
        match outcome {
            ProcessOutcome::Exited { status, stdout, stderr } => {
                if status.success() {
                    ExecutionResult::success(stdout, stderr)
                } else {
                    ExecutionResult::failure(status.code(), stdout, stderr)
                }
            }
            ProcessOutcome::TimedOut { stdout, stderr } => ExecutionResult::timeout(
                stdout,
                format!("{}\nTIMEOUT: exceeded {}ms", stderr.trim_end(), limit.as_millis()),
            ),
            ProcessOutcome::Cancelled => ExecutionResult::cancelled(),
            ProcessOutcome::NotFound => {
                info!("Toolchain executable not found: {}", program);
                ExecutionResult::skipped(format!("SKIPPED: required tool '{}' not found", program))
            }
            ProcessOutcome::SpawnFailed(e) => {
                ExecutionResult::internal_error(format!("Failed to start '{}': {}", program, e))
            }
        }
    }
}

#[async_trait]
impl Executor for ToolchainRunner {
    async fn execute(&self, artifact: &Artifact, path: &Path, cancel: &CancellationToken) -> ExecutionResult {
        if cancel.is_cancelled() {
            return ExecutionResult::cancelled();
        }

        match artifact.kind.handler(&self.config.programs) {
            Handler::Interpret { program, args } => self.interpret(&program, &args, path, cancel).await,
            Handler::Compile { compiler, label } => self.compile_and_run(&compiler, label, path, cancel).await,
            Handler::Inspect => self.inspector.inspect(artifact.kind, path).await,
            Handler::Unsupported => ExecutionResult::skipped(format!(
                "SKIPPED: unsupported artifact kind for {}",
                artifact.file_name()
            )),
        }
    }
}

/// Convenience for callers that only know a path.
pub async fn execute_path(runner: &ToolchainRunner, path: &Path) -> ExecutionResult {
    let artifact = Artifact::new(path, ArtifactKind::from_path(path));
    runner.execute(&artifact, path, &CancellationToken::new()).await
}
