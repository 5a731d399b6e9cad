//! Code runner for gradebox
//!
//! Provides the per-language steps between a submission and its test runs:
//! writing the program into a workspace, compiling it once where the
//! language needs it, and executing it under limits.

use thiserror::Error;

pub use crate::runner::compile::{CompileOutput, compile};
pub use crate::runner::execute::{RunLimits, execute};
pub use crate::runner::prepare::{
    DEFAULT_JAVA_CLASS, PYTHON_WRAPPER_NAME, PreparedProgram, java_class_name, prepare,
    python_wrapper,
};

mod compile;
mod execute;
mod prepare;

use crate::{
    config::{Config, ConfigError},
    sandbox::{SandboxError, Workspace},
    types::{ExecutionOutcome, Language},
};

/// Errors that occur while writing a submission to disk
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

/// Errors that occur during compilation
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{output}")]
    Failed { exit_code: i32, output: String },

    #[error("compilation timed out after {0} ms")]
    Timeout(u64),

    #[error(transparent)]
    Sandbox(SandboxError),
}

impl CompileError {
    /// Whether the compiler ran and rejected the submission
    pub fn is_rejection(&self) -> bool {
        matches!(self, CompileError::Failed { .. } | CompileError::Timeout(_))
    }
}

/// Errors that occur during execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sandbox(SandboxError),
}

/// High-level runner bound to a toolchain configuration
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a new runner with default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Write a submission into the workspace
    pub async fn prepare(
        &self,
        workspace: &Workspace,
        language: Language,
        code: &str,
    ) -> Result<PreparedProgram, PrepareError> {
        let toolchain = self.config.toolchain(language)?;
        prepare::prepare(workspace, toolchain, language, code).await
    }

    /// Compile a prepared program (a no-op for interpreted languages)
    pub async fn compile(
        &self,
        workspace: &Workspace,
        program: &PreparedProgram,
    ) -> Result<Option<CompileOutput>, CompileError> {
        let toolchain = self
            .config
            .toolchain(program.language)
            .map_err(|e| CompileError::Sandbox(SandboxError::CommandFailed(e.to_string())))?;
        compile::compile(workspace, toolchain, program).await
    }

    /// Run the program once with the given input
    pub async fn execute(
        &self,
        workspace: &Workspace,
        program: &PreparedProgram,
        input: &str,
        limits: RunLimits,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let toolchain = self.config.toolchain(program.language)?;
        execute::execute(workspace, toolchain, program, input, limits).await
    }
}
