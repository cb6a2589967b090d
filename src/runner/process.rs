//! Child process supervision: spawn, capture, time out, cancel.
//!
//! Each child leads its own process group, so a kill reaches everything it
//! started (background jobs, the program `go run` builds) and not just the
//! direct child.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Upper bound on captured bytes per stream.
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// How long to wait for pipes to drain after the child exits or is killed.
const IO_CAPTURE_TIMEOUT: Duration = Duration::from_secs(2);

/// What happened to a supervised child process.
#[derive(Debug)]
pub enum ProcessOutcome {
    Exited {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    TimedOut {
        stdout: String,
        stderr: String,
    },
    Cancelled,
    /// The executable could not be located
    NotFound,
    SpawnFailed(io::Error),
}

/// Run `program args..` with piped output, killing its process group after
/// `timeout` or on cancellation.
pub async fn run_captured(
    program: &Path,
    args: &[OsString],
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProcessOutcome {
    debug!("Spawning {} {:?} (timeout {}ms)", program.display(), args, timeout.as_millis());

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ProcessOutcome::NotFound,
        Err(e) => return ProcessOutcome::SpawnFailed(e),
    };
    // Still valid after the leader is reaped while any group member lives
    let group = child.id();

    let stdout = child.stdout.take().map(Capture::spawn);
    let stderr = child.stderr.take().map(Capture::spawn);

    enum Waited {
        Exited(ExitStatus),
        TimedOut,
        Cancelled,
    }

    let waited = tokio::select! {
        result = child.wait() => match result {
            Ok(status) => Waited::Exited(status),
            Err(e) => {
                kill_group(group);
                return ProcessOutcome::SpawnFailed(e);
            }
        },
        () = tokio::time::sleep(timeout) => {
            warn!("{} exceeded {}ms; killing", program.display(), timeout.as_millis());
            terminate(&mut child, group).await;
            Waited::TimedOut
        }
        () = cancel.cancelled() => {
            debug!("Cancellation requested; killing {}", program.display());
            terminate(&mut child, group).await;
            Waited::Cancelled
        }
    };

    // Leftover background jobs of a child that exited on its own
    kill_group(group);

    if let Waited::Cancelled = waited {
        return ProcessOutcome::Cancelled;
    }

    let stdout = collect(stdout).await;
    let stderr = collect(stderr).await;

    match waited {
        Waited::Exited(status) => ProcessOutcome::Exited { status, stdout, stderr },
        _ => ProcessOutcome::TimedOut { stdout, stderr },
    }
}

async fn terminate(child: &mut Child, group: Option<u32>) {
    kill_group(group);
    if let Err(e) = child.kill().await {
        warn!("Failed to kill process: {}", e);
    }
}

#[cfg(unix)]
fn kill_group(group: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pgid) = group.and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) => debug!("Killed process group {}", pgid),
        // Nothing left in the group
        Err(Errno::ESRCH) => {}
        Err(e) => debug!("killpg({}) failed: {}", pgid, e),
    }
}

#[cfg(not(unix))]
fn kill_group(_group: Option<u32>) {}

/// One output stream read in the background into a shared buffer, so the
/// bytes already read survive a reader that never sees EOF.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl Capture {
    fn spawn<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = buf.clone();
        let task = tokio::spawn(async move {
            let mut reader = reader;
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        let Ok(mut buf) = sink.lock() else {
                            break;
                        };
                        // Keep draining past the cap so the child never blocks on a full pipe
                        let room = MAX_OUTPUT_BYTES.saturating_sub(buf.len());
                        buf.extend_from_slice(&chunk[..n.min(room)]);
                    }
                    Err(e) => {
                        warn!("Output capture failed: {}", e);
                        break;
                    }
                }
            }
        });
        Self { buf, task }
    }

    fn contents(&self) -> String {
        self.buf
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

async fn collect(capture: Option<Capture>) -> String {
    let Some(mut capture) = capture else {
        return String::new();
    };

    match tokio::time::timeout(IO_CAPTURE_TIMEOUT, &mut capture.task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Output capture task failed: {}", e),
        Err(_) => {
            warn!("Output capture timed out; keeping what was read");
            capture.task.abort();
        }
    }
    capture.contents()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Instant;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    fn sh(script: &str) -> (PathBuf, Vec<OsString>) {
        (PathBuf::from("sh"), vec!["-c".into(), script.into()])
    }

    /// Gone, or a zombie waiting for its new parent to reap it.
    #[cfg(target_os = "linux")]
    fn is_dead(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Err(_) => true,
            Ok(stat) => stat
                .rsplit_once(')')
                .map(|(_, rest)| rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
        }
    }

    #[tokio::test]
    async fn test_exit_with_output() {
        let (program, args) = sh("echo out; echo err >&2; exit 3");
        let outcome = run_captured(&program, &args, Duration::from_secs(5), &CancellationToken::new()).await;
        match outcome {
            ProcessOutcome::Exited { status, stdout, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stdout.trim(), "out");
                assert_eq!(stderr.trim(), "err");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills() {
        let (program, args) = sh("exec sleep 10");
        let started = Instant::now();
        let outcome = run_captured(&program, &args, Duration::from_millis(200), &CancellationToken::new()).await;
        assert!(matches!(outcome, ProcessOutcome::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_timeout_kills_background_jobs() {
        let temp = TempDir::new().unwrap();
        let pid_file = temp.path().join("pid");
        let (program, args) = sh(&format!("sleep 300 & echo $! > {}; wait", pid_file.display()));

        let started = Instant::now();
        let outcome = run_captured(&program, &args, Duration::from_millis(300), &CancellationToken::new()).await;

        assert!(matches!(outcome, ProcessOutcome::TimedOut { .. }));
        // A surviving `sleep` would hold the pipes open until the drain deadline
        assert!(started.elapsed() < IO_CAPTURE_TIMEOUT);

        #[cfg(target_os = "linux")]
        {
            let pid = std::fs::read_to_string(&pid_file).unwrap();
            let deadline = Instant::now() + Duration::from_secs(2);
            while !is_dead(pid.trim()) && Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            assert!(is_dead(pid.trim()), "background job {} outlived the timeout", pid.trim());
        }
    }

    #[tokio::test]
    async fn test_exit_keeps_stderr_despite_background_job() {
        let (program, args) = sh("echo 'line 3: real error' >&2; sleep 5 & exit 1");
        let started = Instant::now();
        let outcome = run_captured(&program, &args, Duration::from_secs(10), &CancellationToken::new()).await;

        match outcome {
            ProcessOutcome::Exited { status, stderr, .. } => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(stderr.trim(), "line 3: real error");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(started.elapsed() < IO_CAPTURE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_collect_keeps_partial_output_at_deadline() {
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"partial diagnostic").await.unwrap();

        // Writer stays open: the reader never sees EOF
        let captured = collect(Some(Capture::spawn(reader))).await;

        assert_eq!(captured, "partial diagnostic");
        drop(writer);
    }

    #[tokio::test]
    async fn test_not_found() {
        let outcome = run_captured(
            Path::new("bugrescue-no-such-program-xyz"),
            &[],
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(outcome, ProcessOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let (program, args) = sh("exec sleep 10");
        let outcome = run_captured(&program, &args, Duration::from_secs(30), &cancel).await;
        assert!(matches!(outcome, ProcessOutcome::Cancelled));
    }
}
