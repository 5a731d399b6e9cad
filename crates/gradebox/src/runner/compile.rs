//! Compilation step for compiled languages
//!
//! Runs the toolchain's compiler once per submission, through the same
//! supervisor used for test runs.

use tracing::{debug, instrument};

use crate::config::{Placeholders, Toolchain};
use crate::runner::{CompileError, PreparedProgram};
use crate::sandbox::{self, LaunchSpec, OutputLimits, SandboxError, Workspace};

/// Output ceiling for compiler diagnostics
const COMPILE_OUTPUT_LIMIT: usize = 1024 * 1024;

/// Result of a successful compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    /// Compiler diagnostics (warnings), stderr first
    pub output: String,
}

/// Compile a prepared program if its toolchain has a compile step
///
/// Returns `Ok(None)` for interpreted languages.
#[instrument(skip(workspace, toolchain, program), fields(source = %program.source_name))]
pub async fn compile(
    workspace: &Workspace,
    toolchain: &Toolchain,
    program: &PreparedProgram,
) -> Result<Option<CompileOutput>, CompileError> {
    let Some(ref compile_config) = toolchain.compile else {
        return Ok(None);
    };

    let entry = program.entry.to_string_lossy();
    let values = Placeholders::new(
        workspace.path(),
        &program.source_name,
        &entry,
        &program.class_name,
    )
    .ok_or_else(|| {
        CompileError::Sandbox(SandboxError::InvalidPath(
            "workspace path is not valid UTF-8".to_owned(),
        ))
    })?;

    let mut command = Toolchain::expand_command(&compile_config.command, &values);
    sandbox::resolve_command(&mut command).map_err(CompileError::Sandbox)?;

    debug!(?command, "compiling");

    let launch = LaunchSpec::new(workspace.path())
        .command(command)
        .envs(compile_config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let limits = OutputLimits::new(compile_config.timeout_ms, COMPILE_OUTPUT_LIMIT);

    let outcome = match sandbox::run(&launch, None, limits).await {
        Ok(outcome) => outcome,
        Err(SandboxError::Timeout(_)) => {
            return Err(CompileError::Timeout(compile_config.timeout_ms));
        }
        Err(e) => return Err(CompileError::Sandbox(e)),
    };

    let output = combined_output(&outcome.stderr, &outcome.stdout);

    debug!(
        return_code = outcome.return_code,
        truncated = outcome.truncated,
        "compilation complete"
    );

    if !outcome.is_success() {
        return Err(CompileError::Failed {
            exit_code: outcome.return_code,
            output,
        });
    }

    Ok(Some(CompileOutput { output }))
}

/// Compiler output: stderr, or stdout if stderr is empty
fn combined_output(stderr: &str, stdout: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_owned()
    } else {
        stderr.to_owned()
    }
}
