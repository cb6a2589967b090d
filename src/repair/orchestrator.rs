//! Repair orchestrator - drives each artifact through run, diagnose, patch, verify.
//!
//! Artifacts are processed one at a time and attempts within an artifact are
//! strictly sequential. Every per-artifact problem is folded into a terminal
//! [`OutcomeStatus`]; nothing here returns an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::outcome::{OutcomeEntry, OutcomeStatus, RunSummary};
use super::state::{ArtifactRecord, RepairAttempt, RepairState};
use super::store::{BackupStore, StagingStore};
use crate::artifact::Artifact;
use crate::config::RepairSettings;
use crate::extract::extract;
use crate::llm::{PatchClient, head_chars, is_backend_error};
use crate::report::AuditLog;
use crate::runner::{ExecStatus, Executor};

/// Name of the audit log inside a run's backup directory.
pub const AUDIT_FILE: &str = "audit.jsonl";

/// Configuration for the RepairOrchestrator.
#[derive(Debug, Clone)]
pub struct RepairConfig {
    /// Execution attempts per artifact, including the first
    pub max_attempts: u32,
    /// Candidates must be longer than this to be staged
    pub min_patch_chars: usize,
    pub report_diagnostic_chars: usize,
    pub backup_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// Execute and classify only
    pub dry_run: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self::from(&RepairSettings::default())
    }
}

impl From<&RepairSettings> for RepairConfig {
    fn from(settings: &RepairSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            min_patch_chars: settings.min_patch_chars,
            report_diagnostic_chars: settings.report_diagnostic_chars,
            backup_dir: settings.backup_dir.clone(),
            staging_dir: settings.staging_dir.clone(),
            dry_run: settings.dry_run,
        }
    }
}

/// RepairOrchestrator runs the per-artifact state machine over a queue of artifacts.
pub struct RepairOrchestrator<E, C>
where
    E: Executor,
    C: PatchClient,
{
    executor: Arc<E>,
    client: Arc<C>,
    config: RepairConfig,
    backups: BackupStore,
    staging: StagingStore,
    cancel: CancellationToken,
    started_at: DateTime<Local>,
    audit: Option<AuditLog>,
}

impl<E, C> RepairOrchestrator<E, C>
where
    E: Executor,
    C: PatchClient,
{
    pub fn new(executor: Arc<E>, client: Arc<C>, config: RepairConfig, cancel: CancellationToken) -> Self {
        let started_at = Local::now();
        Self {
            backups: BackupStore::new(&config.backup_dir, started_at),
            staging: StagingStore::new(config.staging_dir.clone()),
            executor,
            client,
            config,
            cancel,
            started_at,
            audit: None,
        }
    }

    /// Append every RepairAttempt to [`Self::audit_path`] as soon as it is recorded.
    pub fn with_audit_log(mut self) -> Self {
        self.audit = Some(AuditLog::new(self.audit_path()));
        self
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// This run's backup directory (created on first backup).
    pub fn backup_dir(&self) -> &Path {
        self.backups.run_dir()
    }

    pub fn audit_path(&self) -> PathBuf {
        self.backups.run_dir().join(AUDIT_FILE)
    }

    /// Process every artifact in order. Once cancelled, the artifact in flight
    /// and everything after it are reported as not processed.
    pub async fn run(&self, artifacts: Vec<Artifact>) -> RunSummary {
        let mut summary = RunSummary::new(self.started_at);

        for artifact in artifacts {
            if self.cancel.is_cancelled() {
                summary.not_processed.push(artifact.path);
                continue;
            }

            let mut record = ArtifactRecord::new(artifact);
            let entry = self.process(&mut record).await;
            summary.attempts.append(&mut record.attempts);

            match entry {
                Some(entry) => summary.entries.push(entry),
                None => summary.not_processed.push(record.artifact.path),
            }
        }

        summary.cancelled = self.cancel.is_cancelled();
        summary
    }

    /// Drive one artifact to a terminal status, or `None` if cancelled first.
    pub async fn process(&self, record: &mut ArtifactRecord) -> Option<OutcomeEntry> {
        info!("Processing {} ({})", record.artifact.path.display(), record.artifact.kind);

        let budget = if self.config.dry_run { 1 } else { self.config.max_attempts.max(1) };
        let mut last_failure = String::new();

        for attempt in 1..=budget {
            record.transition(if attempt == 1 {
                RepairState::Executing
            } else {
                RepairState::Verifying
            });

            let result = self
                .executor
                .execute(&record.artifact, record.active_path(), &self.cancel)
                .await;
            record.executions.push(result.clone());

            if !result.status.is_retryable() {
                return match result.status {
                    ExecStatus::Success => {
                        let status = if attempt == 1 {
                            OutcomeStatus::Clean
                        } else {
                            OutcomeStatus::Fixed
                        };
                        Some(self.finish(record, status, &last_failure))
                    }
                    ExecStatus::Skipped => Some(self.finish(record, OutcomeStatus::Skipped, &result.diagnostic())),
                    ExecStatus::Cancelled => {
                        info!("Cancelled while executing {}", record.artifact.path.display());
                        None
                    }
                    _ => Some(self.finish(record, OutcomeStatus::Failed, &result.diagnostic())),
                };
            }

            last_failure = result.diagnostic();
            if attempt == budget {
                break;
            }

            record.transition(RepairState::Diagnosing);
            if record.backup_path.is_none() {
                match self.backups.backup(&record.artifact.path) {
                    Ok(path) => record.backup_path = Some(path),
                    Err(e) => {
                        warn!("Backup of {} failed: {}", record.artifact.path.display(), e);
                        let diagnostic = format!("Backup failed: {}", e);
                        return Some(self.finish(record, OutcomeStatus::Failed, &diagnostic));
                    }
                }
            }

            record.transition(RepairState::Patching);
            let source = match tokio::fs::read_to_string(record.active_path()).await {
                Ok(source) => source,
                Err(e) => {
                    let diagnostic = format!("Read failed for {}: {}", record.active_path().display(), e);
                    return Some(self.finish(record, OutcomeStatus::Failed, &diagnostic));
                }
            };

            let prompt = self.client.build_prompt(&source, &last_failure);
            let raw = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Cancelled while waiting for a patch for {}", record.artifact.path.display());
                    return None;
                }
                raw = self.client.send_prompt(&prompt) => raw,
            };

            let candidate = extract(&raw);
            let mut repair = RepairAttempt::new(&record.artifact, attempt, &result, prompt, raw, candidate);

            if let Some(reason) = self.rejection(&repair.raw_output, &repair.candidate) {
                warn!("Rejected candidate for {}: {}", record.artifact.path.display(), reason);
                repair.reject(reason);
                self.record_attempt(record, repair);
                break;
            }

            match self.staging.stage(&record.artifact.path, &repair.candidate) {
                Ok(staged) => {
                    repair.accept(staged.clone());
                    self.record_attempt(record, repair);
                    record.activate(staged);
                }
                Err(e) => {
                    warn!("Staging for {} failed: {}", record.artifact.path.display(), e);
                    repair.reject(format!("staging failed: {}", e));
                    self.record_attempt(record, repair);
                    let diagnostic = format!("Staging failed: {}", e);
                    return Some(self.finish(record, OutcomeStatus::Failed, &diagnostic));
                }
            }
        }

        Some(self.finish(record, OutcomeStatus::Failed, &last_failure))
    }

    fn record_attempt(&self, record: &mut ArtifactRecord, repair: RepairAttempt) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.append(std::slice::from_ref(&repair)) {
                warn!("Audit write to {} failed: {}", audit.path().display(), e);
            }
        }
        record.attempts.push(repair);
    }

    /// Accept/reject gate. `None` means the candidate may be staged.
    fn rejection(&self, raw: &str, candidate: &str) -> Option<String> {
        if is_backend_error(raw) {
            return Some(head_chars(raw.trim(), 200).to_string());
        }
        let len = candidate.chars().count();
        if len <= self.config.min_patch_chars {
            return Some(format!(
                "candidate too short ({} chars, need more than {})",
                len, self.config.min_patch_chars
            ));
        }
        None
    }

    fn finish(&self, record: &mut ArtifactRecord, status: OutcomeStatus, diagnostic: &str) -> OutcomeEntry {
        record.transition(RepairState::Terminal(status));
        info!(
            "{}: {} after {} execution(s)",
            record.artifact.path.display(),
            status,
            record.execution_count()
        );

        let mut entry = OutcomeEntry::new(
            record.artifact.path.clone(),
            status,
            diagnostic,
            self.config.report_diagnostic_chars,
        );
        entry.attempts = record.execution_count();
        entry.backup_path = record.backup_path.clone();
        entry.staged_path = record.staged_path().cloned();
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BACKEND_ERROR_PREFIX, MockPatchClient};
    use crate::runner::ExecutionResult;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Replays canned results and records which path each execution used.
    struct ScriptedExecutor {
        results: Mutex<VecDeque<ExecutionResult>>,
        paths: Mutex<Vec<PathBuf>>,
        cancel_on_call: Option<CancellationToken>,
    }

    impl ScriptedExecutor {
        fn new(results: Vec<ExecutionResult>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                paths: Mutex::new(Vec::new()),
                cancel_on_call: None,
            }
        }

        fn paths(&self) -> Vec<PathBuf> {
            self.paths.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Executor for ScriptedExecutor {
        async fn execute(&self, _artifact: &Artifact, path: &Path, cancel: &CancellationToken) -> ExecutionResult {
            self.paths.lock().unwrap().push(path.to_path_buf());
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            if cancel.is_cancelled() {
                return ExecutionResult::cancelled();
            }
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ExecutionResult::failure(Some(1), "", "script exhausted"))
        }
    }

    /// Answers the first request, then never again.
    #[derive(Default)]
    struct AnswerThenHang {
        answered: AtomicBool,
    }

    #[async_trait]
    impl PatchClient for AnswerThenHang {
        fn build_prompt(&self, source: &str, diagnostic: &str) -> String {
            format!("{}\n{}", diagnostic, source)
        }

        async fn send_prompt(&self, _prompt: &str) -> String {
            if !self.answered.swap(true, Ordering::SeqCst) {
                return GOOD_PATCH.to_string();
            }
            std::future::pending::<()>().await;
            String::new()
        }
    }

    /// Never answers.
    struct HangingClient;

    #[async_trait]
    impl PatchClient for HangingClient {
        fn build_prompt(&self, source: &str, diagnostic: &str) -> String {
            format!("{}\n{}", diagnostic, source)
        }

        async fn send_prompt(&self, _prompt: &str) -> String {
            std::future::pending::<()>().await;
            String::new()
        }
    }

    struct Fixture {
        temp: TempDir,
        config: RepairConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let config = RepairConfig {
                backup_dir: temp.path().join(".bugrescue_backups"),
                staging_dir: temp.path().join(".bugrescue_fixes"),
                ..Default::default()
            };
            Self { temp, config }
        }

        fn artifact(&self, name: &str, content: &str) -> Artifact {
            let path = self.temp.path().join(name);
            fs::write(&path, content).unwrap();
            Artifact::detect(path)
        }

        fn orchestrator<C: PatchClient>(
            &self,
            executor: Arc<ScriptedExecutor>,
            client: Arc<C>,
        ) -> RepairOrchestrator<ScriptedExecutor, C> {
            RepairOrchestrator::new(executor, client, self.config.clone(), CancellationToken::new())
        }

        fn backup_count(&self) -> usize {
            let dir = self.temp.path().join(".bugrescue_backups");
            if !dir.exists() {
                return 0;
            }
            fs::read_dir(dir)
                .unwrap()
                .map(|run| fs::read_dir(run.unwrap().path()).unwrap().count())
                .sum()
        }
    }

    fn fail(msg: &str) -> ExecutionResult {
        ExecutionResult::failure(Some(1), "", msg)
    }

    const GOOD_PATCH: &str = "```sh\necho 'all fixed now'\n```";

    #[tokio::test]
    async fn test_clean_on_first_attempt() {
        let fx = Fixture::new();
        let artifact = fx.artifact("ok.sh", "echo ok\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![ExecutionResult::success("ok", "")]));
        let client = Arc::new(MockPatchClient::fixed(GOOD_PATCH));

        let summary = fx.orchestrator(executor.clone(), client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("ok.sh").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Clean);
        assert_eq!(entry.attempts, 1);
        assert!(entry.backup_path.is_none());
        assert_eq!(fx.backup_count(), 0);
        assert_eq!(client.call_count(), 0);
        assert_eq!(summary.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_fixed_on_staged_candidate() {
        let fx = Fixture::new();
        let artifact = fx.artifact("broken.sh", "echo one\nechoo two\nexit 3\n");
        let original = artifact.path.clone();
        let executor = Arc::new(ScriptedExecutor::new(vec![
            fail("broken.sh: line 3: echoo: not found"),
            ExecutionResult::success("all fixed now", ""),
        ]));
        let client = Arc::new(MockPatchClient::fixed(GOOD_PATCH));

        let summary = fx.orchestrator(executor.clone(), client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("broken.sh").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Fixed);
        assert_eq!(entry.attempts, 2);
        assert_eq!(summary.passed(), 1);
        assert_eq!(fx.backup_count(), 1);
        assert!(entry.diagnostic.contains("echoo"));

        let staged = fx.config.staging_dir.join("broken.sh");
        assert_eq!(executor.paths(), vec![original.clone(), staged.clone()]);
        assert_eq!(entry.staged_path.as_ref(), Some(&staged));
        assert_eq!(fs::read_to_string(&staged).unwrap(), "echo 'all fixed now'");
        assert_eq!(fs::read_to_string(&original).unwrap(), "echo one\nechoo two\nexit 3\n");

        let prompt = &client.prompts()[0];
        assert!(prompt.contains("echoo: not found"));
        assert!(prompt.contains("echoo two"));
    }

    #[tokio::test]
    async fn test_failed_after_budget() {
        let fx = Fixture::new();
        let artifact = fx.artifact("stubborn.py", "raise SystemExit(1)\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("first"), fail("second"), fail("third")]));
        let client = Arc::new(MockPatchClient::fixed("```python\nraise SystemExit(2)\n```"));

        let summary = fx.orchestrator(executor.clone(), client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("stubborn.py").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Failed);
        assert_eq!(entry.attempts, 3);
        assert_eq!(entry.diagnostic, "third");
        assert_eq!(client.call_count(), 2);
        assert_eq!(fx.backup_count(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.attempts.len(), 2);
        assert!(summary.attempts.iter().all(|a| a.accepted));
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_skipped_short_circuits() {
        let fx = Fixture::new();
        let artifact = fx.artifact("main.go", "package main\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![ExecutionResult::skipped(
            "SKIPPED: required tool 'go' not found",
        )]));
        let client = Arc::new(MockPatchClient::fixed(GOOD_PATCH));

        let summary = fx.orchestrator(executor.clone(), client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("main.go").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Skipped);
        assert_eq!(entry.attempts, 1);
        assert!(entry.diagnostic.contains("'go' not found"));
        assert_eq!(client.call_count(), 0);
        assert_eq!(fx.backup_count(), 0);
    }

    #[tokio::test]
    async fn test_short_candidate_aborts() {
        let fx = Fixture::new();
        let artifact = fx.artifact("x.rb", "puts y\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("NameError"), ExecutionResult::success("", "")]));
        let client = Arc::new(MockPatchClient::fixed("Sorry!"));

        let summary = fx.orchestrator(executor.clone(), client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("x.rb").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Failed);
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.diagnostic, "NameError");
        assert!(entry.staged_path.is_none());
        assert_eq!(client.call_count(), 1);
        assert!(!summary.attempts[0].accepted);
        assert!(!fx.config.staging_dir.join("x.rb").exists());
    }

    #[tokio::test]
    async fn test_backend_error_string_rejected() {
        let fx = Fixture::new();
        let artifact = fx.artifact("x.js", "throw new Error('x')\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("Error: x")]));
        let client = Arc::new(MockPatchClient::fixed(format!(
            "{} ollama request failed after 3 attempt(s): connection refused",
            BACKEND_ERROR_PREFIX
        )));

        let summary = fx.orchestrator(executor, client).run(vec![artifact]).await;

        assert_eq!(summary.entry("x.js").unwrap().status, OutcomeStatus::Failed);
        let rejection = summary.attempts[0].rejection.as_deref().unwrap();
        assert!(rejection.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let fx = Fixture::new();
        let artifact = fx.artifact("spin.py", "while True: pass\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![
            ExecutionResult::timeout("", "TIMEOUT: exceeded 10000ms"),
            ExecutionResult::success("", ""),
        ]));
        let client = Arc::new(MockPatchClient::fixed("```python\nprint('done')\n```"));

        let summary = fx.orchestrator(executor, client.clone()).run(vec![artifact]).await;

        assert_eq!(summary.entry("spin.py").unwrap().status, OutcomeStatus::Fixed);
        assert!(client.prompts()[0].contains("TIMEOUT"));
    }

    #[tokio::test]
    async fn test_internal_error_is_terminal() {
        let fx = Fixture::new();
        let artifact = fx.artifact("a.php", "<?php\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![ExecutionResult::internal_error(
            "failed to spawn php: permission denied",
        )]));
        let client = Arc::new(MockPatchClient::fixed(GOOD_PATCH));

        let summary = fx.orchestrator(executor, client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("a.php").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Failed);
        assert!(entry.diagnostic.contains("permission denied"));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_never_patches() {
        let mut fx = Fixture::new();
        fx.config.dry_run = true;
        let artifact = fx.artifact("bad.sh", "exit 1\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("exit 1"), ExecutionResult::success("", "")]));
        let client = Arc::new(MockPatchClient::fixed(GOOD_PATCH));

        let summary = fx.orchestrator(executor.clone(), client.clone()).run(vec![artifact]).await;

        let entry = summary.entry("bad.sh").unwrap();
        assert_eq!(entry.status, OutcomeStatus::Failed);
        assert_eq!(entry.attempts, 1);
        assert_eq!(client.call_count(), 0);
        assert_eq!(fx.backup_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_execution_marks_rest_not_processed() {
        let fx = Fixture::new();
        let first = fx.artifact("a.sh", "sleep 100\n");
        let second = fx.artifact("b.sh", "echo b\n");
        let cancel = CancellationToken::new();
        let mut executor = ScriptedExecutor::new(vec![ExecutionResult::success("", "")]);
        executor.cancel_on_call = Some(cancel.clone());
        let client = Arc::new(MockPatchClient::fixed(GOOD_PATCH));

        let orchestrator = RepairOrchestrator::new(Arc::new(executor), client, fx.config.clone(), cancel);
        let summary = orchestrator.run(vec![first.clone(), second.clone()]).await;

        assert!(summary.entries.is_empty());
        assert_eq!(summary.not_processed, vec![first.path, second.path]);
        assert!(summary.cancelled);
        assert_eq!(summary.exit_code(), 130);
    }

    #[tokio::test]
    async fn test_cancel_during_patch_request() {
        let fx = Fixture::new();
        let artifact = fx.artifact("slow.py", "import nothing\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("ModuleNotFoundError")]));
        let cancel = CancellationToken::new();
        let orchestrator =
            RepairOrchestrator::new(executor, Arc::new(HangingClient), fx.config.clone(), cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let summary = tokio::time::timeout(Duration::from_secs(5), orchestrator.run(vec![artifact.clone()]))
            .await
            .expect("cancellation should interrupt the patch request");

        assert!(summary.entries.is_empty());
        assert_eq!(summary.not_processed, vec![artifact.path]);
        assert_eq!(summary.exit_code(), 130);
    }

    #[tokio::test]
    async fn test_one_backup_per_artifact_and_audit_path() {
        let fx = Fixture::new();
        let artifact = fx.artifact("loop.rs", "fn main() { panic!() }\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("panicked"), fail("panicked again")]));
        let client = Arc::new(MockPatchClient::fixed("```rust\nfn main() { println!(\"hi\"); }\n```"));

        let orchestrator = fx.orchestrator(executor, client);
        let summary = orchestrator.run(vec![artifact]).await;

        assert_eq!(fx.backup_count(), 1);
        let backup = summary.entries[0].backup_path.clone().unwrap();
        assert!(backup.starts_with(orchestrator.backup_dir()));
        assert!(backup.ends_with("loop.rs.bak"));
        assert_eq!(orchestrator.audit_path(), orchestrator.backup_dir().join(AUDIT_FILE));
        assert!(!orchestrator.audit_path().exists());
    }

    #[tokio::test]
    async fn test_audit_record_on_disk_before_run_ends() {
        let fx = Fixture::new();
        let artifact = fx.artifact("flaky.sh", "echoo hi\n");
        let executor = Arc::new(ScriptedExecutor::new(vec![fail("echoo: not found"), fail("still broken")]));
        let cancel = CancellationToken::new();
        let orchestrator = RepairOrchestrator::new(
            executor,
            Arc::new(AnswerThenHang::default()),
            fx.config.clone(),
            cancel.clone(),
        )
        .with_audit_log();
        let audit = AuditLog::new(orchestrator.audit_path());

        // The second patch request hangs, so the first attempt has to be on disk already
        let watcher = async {
            for _ in 0..200 {
                if audit.read_all().map(|r| r.len()).unwrap_or(0) == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            let records = audit.read_all().unwrap();
            cancel.cancel();
            records
        };
        let (summary, records) = tokio::join!(orchestrator.run(vec![artifact]), watcher);

        assert_eq!(records.len(), 1);
        assert!(records[0].accepted);
        assert_eq!(records[0].attempt, 1);
        assert_eq!(summary.exit_code(), 130);
    }
}
