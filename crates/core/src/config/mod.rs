use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default toolchain executable name.
pub const DEFAULT_PROGRAM: &str = "go";

/// Default prefix for scratch directory names.
pub const DEFAULT_SCRATCH_PREFIX: &str = "modtrace";

/// Serializable configuration for locating and invoking the Go toolchain.
///
/// Every field is optional in the file; missing fields fall back to `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Executable name searched for on the search path.
    pub program: String,
    /// `PATH`-style search path. When absent, the process `PATH` is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_path: Option<String>,
    /// Parent directory for scratch workspaces. When absent, the system temp dir is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_root: Option<PathBuf>,
    /// Name prefix for scratch workspaces.
    pub scratch_prefix: String,
    /// Upper bound on a single toolchain invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            search_path: None,
            scratch_root: None,
            scratch_prefix: DEFAULT_SCRATCH_PREFIX.to_string(),
            timeout_secs: None,
        }
    }
}

impl ToolchainConfig {
    /// Search path to use for toolchain lookup.
    pub fn effective_search_path(&self) -> Option<OsString> {
        match &self.search_path {
            Some(p) => Some(OsString::from(p)),
            None => std::env::var_os("PATH"),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load a toolchain config from a JSON or YAML file (by extension).
pub fn load_config(path: &Path) -> Result<ToolchainConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read toolchain config at {}", path.display()))?;
    let is_yaml =
        matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"));
    let config = if is_yaml {
        serde_yaml::from_str(&body).context("Failed to parse toolchain config YAML")?
    } else {
        serde_json::from_str(&body).context("Failed to parse toolchain config JSON")?
    };
    Ok(config)
}
