//! Configuration file loading for gradebox
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::{Config, ConfigError};
use crate::types::{EvaluationOptions, Language};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        validate_options(&self.defaults)?;

        for (id, toolchain) in &self.toolchains {
            if id.parse::<Language>().is_err() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{id}' does not name a supported language"
                )));
            }
            if toolchain.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{id}' has empty name"
                )));
            }
            if toolchain.extension.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{id}' has empty extension"
                )));
            }
            if toolchain.run.command.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolchain '{id}' has empty run command"
                )));
            }
            if let Some(ref compile) = toolchain.compile {
                if compile.command.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "toolchain '{id}' has empty compile command"
                    )));
                }
                if compile.timeout_ms == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "toolchain '{id}' has zero compile timeout"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn validate_options(options: &EvaluationOptions) -> Result<(), ConfigError> {
    let range = EvaluationOptions::MIN_TIMEOUT_MS..=EvaluationOptions::MAX_TIMEOUT_MS;
    if !range.contains(&options.timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "default timeout_ms {} is outside {}..={}",
            options.timeout_ms,
            range.start(),
            range.end()
        )));
    }
    if options.memory_limit_mb == 0 {
        return Err(ConfigError::Invalid(
            "memory_limit_mb must be positive".to_owned(),
        ));
    }
    if options.max_output_kb == 0 {
        return Err(ConfigError::Invalid(
            "max_output_kb must be positive".to_owned(),
        ));
    }
    Ok(())
}
