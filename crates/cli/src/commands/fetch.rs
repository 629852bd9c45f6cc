use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use modtrace_core::{
    extract, fetch, BuildInfo, Cancellation, Module, ModuleReference, ToolchainConfig,
};

/// Effective module references across all binaries, de-duplicated in first-seen order.
pub fn collect_references(infos: &[BuildInfo]) -> Vec<ModuleReference> {
    let mut seen = HashSet::new();
    infos
        .iter()
        .flat_map(BuildInfo::module_references)
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

/// Extract the binaries, then resolve every module they reference.
pub fn fetch_modules(config: &ToolchainConfig, binaries: &[PathBuf]) -> Result<Vec<Module>> {
    let cancel = Cancellation::new();
    let infos =
        extract(config, &cancel, binaries).context("Failed to extract module information")?;
    let refs = collect_references(&infos);
    tracing::debug!(binaries = infos.len(), modules = refs.len(), "resolving modules");
    fetch(config, &cancel, &refs).context("Failed to fetch modules")
}

/// Print resolved modules as pretty JSON.
pub fn fetch_command(config: &ToolchainConfig, binaries: &[PathBuf]) -> Result<()> {
    let modules = fetch_modules(config, binaries)?;
    println!("{}", serde_json::to_string_pretty(&modules)?);
    Ok(())
}
