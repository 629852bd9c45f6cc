//! Ephemeral working directories for toolchain invocations.
//!
//! The toolchain runs with a scratch directory as its working directory so that nothing it
//! writes lands in the caller's tree. The directory is removed exactly once, either through
//! `close` or on drop; a removal failure is logged and never replaces the caller's result.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::ToolchainConfig;
use crate::error::{ModuleError, ModuleResult};

#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchWorkspace {
    /// Create a uniquely named, empty directory under the configured scratch root.
    pub fn create(config: &ToolchainConfig) -> ModuleResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.scratch_prefix);
        let dir = match &config.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(ModuleError::WorkspaceCreationFailed)?;
        let path = dir.path().to_path_buf();
        tracing::debug!(path = %path.display(), "created scratch workspace");
        Ok(Self { dir: Some(dir), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now.
    pub fn close(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if let Err(e) = dir.close() {
            tracing::error!(
                path = %self.path.display(),
                reason = %e,
                "failed to remove temporary folder/files"
            );
        }
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Run `f` inside a fresh scratch workspace and remove it afterwards, whatever `f` returns.
pub fn with_scratch<T>(
    config: &ToolchainConfig,
    f: impl FnOnce(&Path) -> ModuleResult<T>,
) -> ModuleResult<T> {
    let workspace = ScratchWorkspace::create(config)?;
    let result = f(workspace.path());
    workspace.close();
    result
}
