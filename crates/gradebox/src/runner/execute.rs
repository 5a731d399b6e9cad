//! Running a prepared program against one input

use tracing::{debug, instrument};

use crate::config::{Placeholders, Toolchain};
use crate::runner::prepare::{PYTHON_WRAPPER_NAME, python_wrapper};
use crate::runner::{ExecuteError, PreparedProgram};
use crate::sandbox::{self, LaunchSpec, OutputLimits, SandboxError, Workspace};
use crate::types::ExecutionOutcome;

/// Limits for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub timeout_ms: u64,
    /// Address-space limit, honored by runtimes that support it
    pub memory_limit_mb: u64,
    pub max_output_bytes: usize,
}

/// Run a prepared (and, if needed, compiled) program once
#[instrument(skip(workspace, toolchain, program, input), fields(language = %program.language))]
pub async fn execute(
    workspace: &Workspace,
    toolchain: &Toolchain,
    program: &PreparedProgram,
    input: &str,
    limits: RunLimits,
) -> Result<ExecutionOutcome, ExecuteError> {
    // the CPU limit tracks this run's timeout, so the wrapper is rewritten
    if program.uses_wrapper() {
        let wrapper = python_wrapper(&program.source_name, limits.memory_limit_mb, limits.timeout_ms);
        workspace
            .write_file(PYTHON_WRAPPER_NAME, wrapper.as_bytes())
            .await
            .map_err(ExecuteError::Sandbox)?;
    }

    let entry = program.entry.to_string_lossy();
    let values = Placeholders::new(
        workspace.path(),
        &program.source_name,
        &entry,
        &program.class_name,
    )
    .ok_or_else(|| {
        ExecuteError::Sandbox(SandboxError::InvalidPath(
            "workspace path is not valid UTF-8".to_owned(),
        ))
    })?;

    let mut command = Toolchain::expand_command(&toolchain.run.command, &values);
    sandbox::resolve_command(&mut command).map_err(ExecuteError::Sandbox)?;

    debug!(?command, timeout_ms = limits.timeout_ms, "executing program");

    let launch = LaunchSpec::new(workspace.path())
        .command(command)
        .envs(toolchain.run.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let output_limits = OutputLimits::new(limits.timeout_ms, limits.max_output_bytes);

    match sandbox::run(&launch, Some(input.as_bytes()), output_limits).await {
        Ok(outcome) => {
            debug!(
                return_code = outcome.return_code,
                truncated = outcome.truncated,
                "execution complete"
            );
            Ok(outcome)
        }
        Err(SandboxError::Timeout(_)) => Err(ExecuteError::Timeout(limits.timeout_ms)),
        Err(e) => Err(ExecuteError::Sandbox(e)),
    }
}
