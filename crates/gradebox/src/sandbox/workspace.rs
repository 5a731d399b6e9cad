//! Scratch workspace lifecycle
//!
//! Each evaluation gets its own temporary directory holding the submission
//! and anything generated from it. The directory is removed when the
//! workspace is dropped, so cleanup happens on every exit path.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument};

use crate::sandbox::SandboxError;

const WORKSPACE_PREFIX: &str = "gradebox_eval_";

/// A per-evaluation scratch directory
///
/// Call [`cleanup()`](Self::cleanup) to observe removal errors; dropping the
/// workspace removes the directory too, but silently.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under `parent`, or the system temp dir
    #[instrument]
    pub fn create(parent: Option<&Path>) -> Result<Self, SandboxError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(SandboxError::WorkspaceCreation)?;

        debug!(path = ?dir.path(), "workspace created");
        Ok(Self { dir })
    }

    /// Get the path to the workspace directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the path to a file inside the workspace
    ///
    /// Returns an error if the name would escape the workspace.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, SandboxError> {
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(SandboxError::InvalidPath(format!(
                "not a plain file name: {name:?}"
            )));
        }
        Ok(self.dir.path().join(name))
    }

    /// Write a file into the workspace
    #[instrument(skip(self, content))]
    pub async fn write_file(&self, name: &str, content: &[u8]) -> Result<PathBuf, SandboxError> {
        let path = self.file_path(name)?;
        tokio::fs::write(&path, content).await?;
        debug!(?path, len = content.len(), "wrote file to workspace");
        Ok(path)
    }

    /// Read a file from the workspace
    ///
    /// The evaluation pipeline only writes; this and [`Workspace::file_exists`]
    /// let callers and tests inspect what a run left behind.
    pub async fn read_file(&self, name: &str) -> Result<Vec<u8>, SandboxError> {
        let path = self.file_path(name)?;
        Ok(tokio::fs::read(&path).await?)
    }

    /// Check if a file exists in the workspace
    pub async fn file_exists(&self, name: &str) -> Result<bool, SandboxError> {
        let path = self.file_path(name)?;
        Ok(tokio::fs::metadata(&path).await.is_ok())
    }

    /// Remove the workspace directory and everything in it
    #[must_use = "cleanup errors should be handled"]
    pub fn cleanup(self) -> Result<(), SandboxError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| SandboxError::CleanupFailed {
                path: path.clone(),
                source,
            })?;
        debug!(?path, "workspace removed");
        Ok(())
    }
}
