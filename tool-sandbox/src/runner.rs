//! Timeout-bounded subprocess execution with process-group cleanup.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default wall-clock timeout for one command.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-stream capture cap in bytes.
const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Errors surfaced by the process runner.
///
/// Timeouts and non-zero exits are not errors; they are reported on the
/// [`ProcessOutcome`] so partial output survives.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The command could not be spawned at all.
    #[error("failed to launch command: {source}")]
    Launch {
        /// Underlying I/O error from the spawn attempt.
        source: io::Error,
    },

    /// Waiting on the child failed after a successful spawn.
    #[error("failed waiting for command: {source}")]
    Wait {
        /// Underlying I/O error from the wait.
        source: io::Error,
    },
}

/// Limits applied to every execution.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    timeout: Duration,
    max_output_bytes: usize,
}

impl RunnerConfig {
    /// Creates a configuration with the supplied limits.
    #[must_use]
    pub const fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }

    /// Returns the wall-clock timeout.
    #[must_use]
    pub const fn timeout(self) -> Duration {
        self.timeout
    }

    /// Returns the per-stream capture cap in bytes.
    #[must_use]
    pub const fn max_output_bytes(self) -> usize {
        self.max_output_bytes
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES)
    }
}

/// What happened to one executed command.
///
/// Owned by the runner for the duration of a single execution and handed to
/// the caller to fold into a response; never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Real exit status, or `None` when the process was killed on timeout.
    pub exit_code: Option<i32>,
    /// Captured stdout, truncated at the configured cap.
    pub stdout: String,
    /// Captured stderr, truncated at the configured cap.
    pub stderr: String,
    /// `true` when stdout hit the capture cap.
    pub stdout_truncated: bool,
    /// `true` when stderr hit the capture cap.
    pub stderr_truncated: bool,
    /// `true` when the wall-clock timeout expired.
    pub timed_out: bool,
}

impl ProcessOutcome {
    /// Returns `true` when the command ran to completion with status zero.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Executes approved commands under the configured limits.
///
/// Each invocation owns exactly one child process; the process handle, its
/// group, and the capture tasks are all scoped to the call and released on
/// every exit path.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    /// Creates a runner with the supplied limits.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Returns the limits in effect.
    #[must_use]
    pub const fn config(&self) -> RunnerConfig {
        self.config
    }

    /// Runs a command string through the platform shell in `working_dir`.
    ///
    /// The exact string passed here must already have been inspected by the
    /// command guard; no further filtering happens at this layer. On unix the
    /// child is placed in its own process group so that a timeout kills every
    /// descendant, not just the immediate shell.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Launch`] when the process cannot be spawned
    /// and [`ProcessError::Wait`] when the spawned child cannot be awaited.
    /// Timeout is not an error; see [`ProcessOutcome::timed_out`].
    pub async fn run(&self, command: &str, working_dir: &Path) -> Result<ProcessOutcome, ProcessError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ProcessError::Launch { source })?;
        let pid = child.id();

        let cap = self.config.max_output_bytes;
        let stdout_task = capture(child.stdout.take(), cap);
        let stderr_task = capture(child.stderr.take(), cap);

        let (timed_out, exit_code) =
            match tokio::time::timeout(self.config.timeout, child.wait()).await {
                Ok(Ok(status)) => (false, status.code()),
                Ok(Err(source)) => return Err(ProcessError::Wait { source }),
                Err(_) => {
                    debug!(?pid, timeout = ?self.config.timeout, "command timed out, killing process group");
                    kill_process_group(pid);
                    // The group kill is unix-only; kill the immediate child
                    // on every platform so the reap below cannot hang.
                    if let Err(err) = child.start_kill() {
                        debug!(%err, "child already gone before explicit kill");
                    }
                    // Reap the child so no zombie outlives this call.
                    if let Err(err) = child.wait().await {
                        warn!(%err, "failed to reap timed-out child");
                    }
                    (true, None)
                }
            };

        let (stdout, stdout_truncated) = finish_capture(stdout_task).await;
        let (stderr, stderr_truncated) = finish_capture(stderr_task).await;

        Ok(ProcessOutcome {
            exit_code,
            stdout,
            stderr,
            stdout_truncated,
            stderr_truncated,
            timed_out,
        })
    }
}

/// Reads a pipe to exhaustion, storing at most `cap` bytes.
///
/// Reading continues past the cap (discarding) so a chatty child is never
/// blocked on a full pipe; only storage is bounded.
fn capture<R>(reader: Option<R>, cap: usize) -> JoinHandle<(Vec<u8>, bool)>
where
    R: AsyncReadExt + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut reader) = reader else {
            return (Vec::new(), false);
        };

        let mut chunk = vec![0_u8; 8192];
        let mut stored = Vec::new();
        let mut truncated = false;

        loop {
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if stored.len() < cap {
                        let take = n.min(cap - stored.len());
                        stored.extend_from_slice(&chunk[..take]);
                        if take < n {
                            truncated = true;
                        }
                    } else {
                        truncated = true;
                    }
                }
            }
        }

        (stored, truncated)
    })
}

async fn finish_capture(task: JoinHandle<(Vec<u8>, bool)>) -> (String, bool) {
    let (bytes, truncated) = task.await.unwrap_or_default();
    (String::from_utf8_lossy(&bytes).into_owned(), truncated)
}

/// Kills the child's whole process group.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    let Ok(raw) = i32::try_from(pid) else { return };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        warn!(%err, pid, "failed to kill process group");
    }
}

/// No process groups on this platform; the timeout branch kills the
/// immediate child via `start_kill` instead.
#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
