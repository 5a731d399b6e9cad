//! Output-bounded process supervision
//!
//! Runs one child process with piped stdio. Stdout and stderr are drained by
//! two independent tasks while the caller waits for exit, so a child writing
//! heavily to either stream can never block on a full pipe. Each drain task
//! enforces the output ceiling for its own stream and requests a kill when it
//! is exceeded; the wait enforces the wall-clock timeout.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::sandbox::{LaunchSpec, SandboxError};
use crate::types::ExecutionOutcome;

/// Size of each read from a child's output pipe
const CHUNK_SIZE: usize = 4096;

/// Shortest wall-clock timeout ever applied
const MIN_TIMEOUT: Duration = Duration::from_millis(100);

/// How long drain tasks get to finish after the child exits or is killed
const DRAIN_GRACE: Duration = Duration::from_millis(500);

pub const OUTPUT_LIMIT_MESSAGE: &str = "Output limit exceeded";

/// Limits applied to one supervised run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimits {
    /// Wall-clock limit (raised to at least 100 ms)
    pub timeout: Duration,
    /// Per-stream byte ceiling
    pub max_output_bytes: usize,
}

impl OutputLimits {
    pub fn new(timeout_ms: u64, max_output_bytes: usize) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            max_output_bytes,
        }
    }

    fn effective_timeout(&self) -> Duration {
        self.timeout.max(MIN_TIMEOUT)
    }
}

/// State shared between the drain tasks and the waiting caller
#[derive(Debug, Default)]
struct OutputGuard {
    exceeded: AtomicBool,
    kill_requested: Notify,
}

impl OutputGuard {
    fn trip(&self) {
        self.exceeded.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a trip before the caller starts
        // waiting is not lost
        self.kill_requested.notify_one();
    }

    fn is_exceeded(&self) -> bool {
        self.exceeded.load(Ordering::SeqCst)
    }
}

/// Run a child process to completion under the given limits
///
/// Returns [`SandboxError::Timeout`] if the wall-clock limit is hit. A child
/// killed for exceeding the output ceiling yields a synthetic outcome with
/// return code 137 and `stderr` set to "Output limit exceeded".
#[instrument(skip(stdin), fields(program = launch.program()))]
pub async fn run(
    launch: &LaunchSpec,
    stdin: Option<&[u8]>,
    limits: OutputLimits,
) -> Result<ExecutionOutcome, SandboxError> {
    let program = launch
        .program()
        .ok_or_else(|| SandboxError::CommandFailed("empty command".to_owned()))?;

    let mut child = Command::new(program)
        .args(launch.args())
        .current_dir(launch.cwd())
        .envs(launch.env_vars())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SandboxError::SpawnFailed {
            program: program.to_owned(),
            source,
        })?;

    debug!(pid = child.id(), "spawned child");

    let guard = Arc::new(OutputGuard::default());
    let stdout_task = child
        .stdout
        .take()
        .map(|pipe| spawn_drain(pipe, limits.max_output_bytes, guard.clone()));
    let stderr_task = child
        .stderr
        .take()
        .map(|pipe| spawn_drain(pipe, limits.max_output_bytes, guard.clone()));

    // Feed stdin from its own task so a child that never reads cannot stall
    // us before the timeout starts
    let stdin_task = child.stdin.take().map(|mut pipe| {
        let data = stdin.map(<[u8]>::to_vec).unwrap_or_default();
        tokio::spawn(async move {
            if !data.is_empty()
                && let Err(e) = pipe.write_all(&data).await
            {
                debug!(error = %e, "stdin write failed, child likely exited");
            }
            // dropping the pipe closes it so the child sees EOF
        })
    });

    let timeout = limits.effective_timeout();
    let waited = tokio::time::timeout(timeout, async {
        tokio::select! {
            status = child.wait() => Some(status),
            _ = guard.kill_requested.notified() => None,
        }
    })
    .await;

    let exit = match waited {
        Ok(Some(status)) => Some(status?),
        Ok(None) => {
            debug!(
                max_output_bytes = limits.max_output_bytes,
                "output ceiling exceeded, killing child"
            );
            force_kill(&mut child).await;
            None
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "timed out, killing child");
            force_kill(&mut child).await;
            if !guard.is_exceeded() {
                abort_task(stdin_task);
                join_drain(stdout_task).await;
                join_drain(stderr_task).await;
                return Err(SandboxError::Timeout(timeout));
            }
            None
        }
    };

    abort_task(stdin_task);
    let stdout = join_drain(stdout_task).await;
    let stderr = join_drain(stderr_task).await;

    if guard.is_exceeded() {
        // the child may have exited on its own right as the ceiling was hit
        if exit.is_some() {
            force_kill(&mut child).await;
        }
        return Ok(ExecutionOutcome {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: OUTPUT_LIMIT_MESSAGE.to_owned(),
            return_code: ExecutionOutcome::OUTPUT_LIMIT_RETURN_CODE,
            truncated: true,
        });
    }

    let status = match exit {
        Some(status) => status,
        None => child.wait().await?,
    };
    let return_code = return_code(status);

    debug!(return_code, "child exited");

    Ok(ExecutionOutcome {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        return_code,
        truncated: false,
    })
}

/// A running drain task and the signal that stops it early
struct Drain {
    task: JoinHandle<Vec<u8>>,
    stop: Arc<Notify>,
}

fn spawn_drain<R>(reader: R, limit: usize, guard: Arc<OutputGuard>) -> Drain
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let stop = Arc::new(Notify::new());
    let task = tokio::spawn(drain(reader, limit, guard, stop.clone()));
    Drain { task, stop }
}

/// Read a stream in chunks until EOF, until it exceeds `limit` bytes, or
/// until `stop` is notified
///
/// Whatever was captured before stopping is returned.
async fn drain<R>(
    mut reader: R,
    limit: usize,
    guard: Arc<OutputGuard>,
    stop: Arc<Notify>,
) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total = 0usize;

    loop {
        let read = tokio::select! {
            biased;
            _ = stop.notified() => break,
            read = reader.read(&mut chunk) => read,
        };

        match read {
            Ok(0) => break,
            Ok(n) => {
                total = total.saturating_add(n);
                if total > limit {
                    let room = limit.saturating_sub(captured.len());
                    captured.extend_from_slice(&chunk[..room.min(n)]);
                    guard.trip();
                    break;
                }
                captured.extend_from_slice(&chunk[..n]);
            }
            Err(e) => {
                debug!(error = %e, "output pipe read failed");
                break;
            }
        }
    }

    captured
}

async fn join_drain(drain: Option<Drain>) -> Vec<u8> {
    let Some(Drain { mut task, stop }) = drain else {
        return Vec::new();
    };

    let joined = match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            // a grandchild may still hold the pipe open; keep what was read
            debug!("drain task did not finish within grace period, stopping it");
            stop.notify_one();
            task.await
        }
    };

    match joined {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "drain task failed");
            Vec::new()
        }
    }
}

fn abort_task(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        task.abort();
    }
}

/// Kill the child, tolerating one that has already exited
async fn force_kill(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "kill failed, child already gone");
    }
}

#[cfg(unix)]
fn return_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
fn return_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
