use std::path::PathBuf;

use anyhow::{Context, Result};
use modtrace_core::{extract, BuildInfo, Cancellation, ToolchainConfig};
use serde::Serialize;

use crate::sha256_file;

/// One extracted binary, optionally with its content digest.
#[derive(Debug, Serialize)]
pub struct BinaryReport {
    #[serde(flatten)]
    pub info: BuildInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Extract build info for `binaries`, hashing each one when `hash` is set.
pub fn extract_reports(
    config: &ToolchainConfig,
    binaries: &[PathBuf],
    hash: bool,
) -> Result<Vec<BinaryReport>> {
    let infos = extract(config, &Cancellation::new(), binaries)
        .context("Failed to extract module information")?;
    infos
        .into_iter()
        .map(|info| -> Result<BinaryReport> {
            let sha256 = if hash { Some(sha256_file(&info.path)?) } else { None };
            Ok(BinaryReport { info, sha256 })
        })
        .collect()
}

/// Print extracted build info as pretty JSON.
pub fn extract_command(config: &ToolchainConfig, binaries: &[PathBuf], hash: bool) -> Result<()> {
    let reports = extract_reports(config, binaries, hash)?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
