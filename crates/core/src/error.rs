use std::path::PathBuf;

use thiserror::Error;

use crate::buildinfo::ParseError;
use crate::services::verify::Diagnostics;

/// Errors returned by the extraction and resolution pipelines.
///
/// Environment, invocation and format errors carry a single cause. Completeness errors carry
/// every missing input.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("toolchain executable '{name}' not found in search path")]
    ToolNotFound { name: String },

    #[error("failed to resolve toolchain path {}: {source}", .path.display())]
    ToolResolutionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The search-path match resolved to a file that is not the expected executable.
    #[error("unexpected binary resolved for '{expected}': {}", .resolved.display())]
    UnexpectedBinary { expected: String, resolved: PathBuf },

    #[error("cannot make binary path {} absolute: {source}", .path.display())]
    InvalidBinaryPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create scratch workspace: {0}")]
    WorkspaceCreationFailed(#[source] std::io::Error),

    #[error("error when running '{command}': {detail}{}", render_output(.output))]
    ToolchainInvocationFailed { command: String, detail: String, output: String },

    #[error("'{command}' was cancelled before completion")]
    Cancelled { command: String },

    #[error("failed to parse build info from 'go version' output: {0}")]
    ParseFailed(#[from] ParseError),

    #[error("failed to decode 'go mod download' output: {0}")]
    DecodeFailed(#[source] serde_json::Error),

    #[error("could not extract module information: {0}")]
    IncompleteExtraction(Diagnostics),

    #[error("failed to fetch all modules: {0}")]
    IncompleteResolution(Diagnostics),
}

impl ModuleError {
    /// Per-input causes of a completeness error; `None` for every other kind.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::IncompleteExtraction(d) | Self::IncompleteResolution(d) => Some(d),
            _ => None,
        }
    }
}

fn render_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(" (output: {trimmed})")
    }
}

/// Convenience result type for pipeline operations.
pub type ModuleResult<T> = Result<T, ModuleError>;
