use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::buildinfo;
use crate::config::ToolchainConfig;
use crate::error::{ModuleError, ModuleResult};
use crate::model::BuildInfo;
use crate::services::verify::{verify_complete, Gap};
use crate::toolchain::{self, Cancellation};
use crate::workspace::with_scratch;

/// Label used for `go version -m` in errors.
pub const VERSION_COMMAND: &str = "go version";

/// Extract build information from the given binaries with `go version -m`.
///
/// Returns exactly one `BuildInfo` per requested path, keyed by the path as given. Any binary
/// the toolchain could not describe makes the whole call fail with `IncompleteExtraction`,
/// naming every such binary.
pub fn extract<P: AsRef<Path>>(
    config: &ToolchainConfig,
    cancel: &Cancellation,
    paths: &[P],
) -> ModuleResult<Vec<BuildInfo>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let go = toolchain::locate(config)?;
    let cancel = cancel.limited_to(config.timeout());

    // The toolchain runs inside the scratch directory, so relative paths must be anchored
    // first. Each distinct binary is passed once; `spellings` maps it back to every path the
    // caller used for it.
    let requested: Vec<&Path> = paths.iter().map(|p| p.as_ref()).collect();
    let mut args: Vec<OsString> = vec!["version".into(), "-m".into()];
    let mut spellings: HashMap<PathBuf, Vec<&Path>> = HashMap::with_capacity(requested.len());
    for &path in &requested {
        let absolute = std::path::absolute(path).map_err(|source| {
            ModuleError::InvalidBinaryPath { path: path.to_path_buf(), source }
        })?;
        match spellings.entry(absolute) {
            Entry::Occupied(mut entry) => entry.get_mut().push(path),
            Entry::Vacant(entry) => {
                args.push(entry.key().clone().into_os_string());
                entry.insert(vec![path]);
            }
        }
    }

    let output =
        with_scratch(config, |dir| toolchain::run(&go, &args, dir, &cancel, VERSION_COMMAND))?;
    if !output.status.success() {
        return Err(ModuleError::ToolchainInvocationFailed {
            command: VERSION_COMMAND.to_string(),
            detail: output.status.to_string(),
            output: output.stderr_lossy(),
        });
    }

    let mut infos = Vec::with_capacity(requested.len());
    for info in buildinfo::parse(&output.stdout_lossy())? {
        match spellings.get(&info.path).map(Vec::as_slice) {
            Some([only]) => infos.push(BuildInfo { path: only.to_path_buf(), ..info }),
            Some(names) => infos.extend(
                names.iter().map(|name| BuildInfo { path: name.to_path_buf(), ..info.clone() }),
            ),
            None => infos.push(info),
        }
    }

    verify_complete(
        infos.iter().map(|info| info.path.as_path()),
        requested.iter().copied(),
        |path: &Path| Gap::MissingBuildInfo {
            path: path.to_path_buf(),
            program: config.program.clone(),
        },
    )
    .map_err(ModuleError::IncompleteExtraction)?;

    Ok(infos)
}
