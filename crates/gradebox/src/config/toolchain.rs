use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;

const INVALID_FILE_EXT_CHARS: [char; 2] = ['/', '.'];

/// Default timeout for a compilation step, in milliseconds
pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 30_000;

/// How a language is compiled and launched on the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toolchain {
    /// Human-readable name (e.g., "Python 3")
    pub name: String,

    /// Source file extension
    pub extension: FileExtension,

    /// Compilation step (None for interpreted languages)
    #[serde(default)]
    pub compile: Option<CompileConfig>,

    pub run: RunConfig,
}

/// Values substituted into toolchain command templates
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    /// `{source}`: submission file name inside the workspace
    pub source: &'a str,
    /// `{entry}`: absolute path of the file the interpreter should start
    pub entry: &'a str,
    /// `{class}`: Java class name (or the source stem for other languages)
    pub class: &'a str,
    /// `{dir}`: absolute path of the workspace
    pub dir: &'a str,
}

impl<'a> Placeholders<'a> {
    pub fn new(dir: &'a Path, source: &'a str, entry: &'a str, class: &'a str) -> Option<Self> {
        Some(Self {
            source,
            entry,
            class,
            dir: dir.to_str()?,
        })
    }
}

impl Toolchain {
    /// Check if the language needs a compile step
    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }

    /// Expand placeholders in the given command
    pub fn expand_command(command: &[String], values: &Placeholders<'_>) -> Vec<String> {
        command
            .iter()
            .map(|arg| {
                arg.replace("{source}", values.source)
                    .replace("{entry}", values.entry)
                    .replace("{class}", values.class)
                    .replace("{dir}", values.dir)
            })
            .collect()
    }
}

/// File extension without dot (e.g., "py")
#[derive(Debug, Clone, Serialize)]
pub struct FileExtension(String);

impl FileExtension {
    pub fn new(extension: &str) -> Result<Self, ConfigError> {
        let contains_invalid = extension
            .chars()
            .any(|c| INVALID_FILE_EXT_CHARS.contains(&c));
        if contains_invalid {
            return Err(ConfigError::InvalidFileExtChars);
        }
        Ok(Self(extension.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FileExtension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileExtension::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a file extension without '/' or '.' characters",
            )
        })
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Command and arguments with placeholders
    pub command: Vec<String>,

    /// Wall-clock limit for the compiler, in milliseconds
    #[serde(default = "default_compile_timeout_ms")]
    pub timeout_ms: u64,

    /// Environment variables to set during compilation
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_compile_timeout_ms() -> u64 {
    DEFAULT_COMPILE_TIMEOUT_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Command and arguments with placeholders
    pub command: Vec<String>,

    /// Environment variables to set
    #[serde(default)]
    pub env: HashMap<String, String>,
}
