use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::toolchain::{
    CompileConfig, DEFAULT_COMPILE_TIMEOUT_MS, FileExtension, Placeholders, RunConfig, Toolchain,
};
use crate::types::{EvaluationOptions, Language};

mod loader;
pub mod toolchain;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../gradebox.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("no toolchain configured for language '{0}'")]
    ToolchainNotFound(Language),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for gradebox
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Parent directory for per-evaluation scratch directories
    /// (the system temp dir if not specified).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Submission-level defaults; callers override per evaluation
    #[serde(default)]
    pub defaults: EvaluationOptions,

    /// Toolchains keyed by language ID
    #[serde(default)]
    pub toolchains: HashMap<String, Toolchain>,
}

impl Config {
    /// Create a new config with the embedded default toolchains
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty config with no toolchains
    pub fn empty() -> Self {
        Self {
            scratch_dir: None,
            defaults: EvaluationOptions::default(),
            toolchains: HashMap::new(),
        }
    }

    /// Get the toolchain for a language
    pub fn toolchain(&self, language: Language) -> Result<&Toolchain, ConfigError> {
        self.toolchains
            .get(language.id())
            .ok_or(ConfigError::ToolchainNotFound(language))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}
