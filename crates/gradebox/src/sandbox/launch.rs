//! Launch description for a supervised child process

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything the supervisor needs to start a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Program followed by its arguments
    command: Vec<String>,
    /// Working directory of the child
    cwd: PathBuf,
    /// Extra environment variables
    env: HashMap<String, String>,
}

impl LaunchSpec {
    /// Create a launch spec running in `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: Vec::new(),
            cwd: cwd.into(),
            env: HashMap::new(),
        }
    }

    /// Set the command to run
    pub fn command(mut self, cmd: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.command = cmd.into_iter().map(Into::into).collect();
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set several environment variables
    pub fn envs<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Program to execute, if any
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Arguments after the program
    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn env_vars(&self) -> &HashMap<String, String> {
        &self.env
    }
}
