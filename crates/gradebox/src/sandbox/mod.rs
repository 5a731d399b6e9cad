//! Child process sandboxing
//!
//! Provides the scratch workspace a submission is prepared in, the launch
//! description handed to the supervisor, and the supervisor itself, which
//! runs one child process under a wall-clock timeout and an output ceiling.
//!
//! There is no OS-level isolation here: no namespaces, seccomp, or
//! containers. Limits come from the runtime (address-space and CPU rlimits
//! where the runtime sets them), the supervisor's timeout and output
//! ceiling, and the static quality heuristics.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub use crate::sandbox::launch::LaunchSpec;
pub use crate::sandbox::supervisor::{OUTPUT_LIMIT_MESSAGE, OutputLimits, run};
pub use crate::sandbox::workspace::Workspace;

mod launch;
mod supervisor;
mod workspace;

/// Errors that occur while preparing or supervising a child process
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to create workspace: {0}")]
    WorkspaceCreation(#[source] std::io::Error),

    #[error("failed to clean up workspace {path}: {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn process '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process exceeded the {} ms time limit", .0.as_millis())]
    Timeout(Duration),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the program in a command to an absolute path using the host's PATH.
///
/// Commands that already contain a `/` (like `./main` or `/usr/bin/node`) are
/// left unchanged. A missing program is reported up front so that it surfaces
/// as a launch error with the program's name instead of a bare `ENOENT`.
pub fn resolve_command(command: &mut [String]) -> Result<(), SandboxError> {
    let first = match command.first_mut() {
        Some(first) => first,
        None => return Err(SandboxError::CommandFailed("empty command".to_owned())),
    };

    if first.contains('/') {
        return Ok(());
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(&*first);
        if is_executable_file(&candidate) {
            *first = candidate.to_string_lossy().into_owned();
            return Ok(());
        }
    }

    Err(SandboxError::CommandFailed(format!(
        "command '{first}' not found in PATH",
    )))
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
