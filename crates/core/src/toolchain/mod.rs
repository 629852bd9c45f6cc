//! Locating and invoking the external Go toolchain.
//!
//! The toolchain is the only program this crate executes, so the path handed to
//! `process::run` always comes from `locate`, which searches the configured path,
//! resolves every symlink and then checks that the resolved file is really named
//! after the expected executable. A mismatch is a hard failure.

pub mod process;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::ToolchainConfig;
use crate::error::{ModuleError, ModuleResult};

pub use process::{run, Cancellation, Captured};

/// File names accepted for `program` on the current platform.
pub fn accepted_names(program: &str) -> Vec<String> {
    let mut names = vec![program.to_string()];
    let suffix = std::env::consts::EXE_SUFFIX;
    if !suffix.is_empty() && !program.ends_with(suffix) {
        names.push(format!("{program}{suffix}"));
    }
    names
}

/// Resolve the configured toolchain to an absolute, symlink-free, validated path.
pub fn locate(config: &ToolchainConfig) -> ModuleResult<PathBuf> {
    let names = accepted_names(&config.program);
    let search_path = config.effective_search_path().unwrap_or_default();
    let found = find_in_path(&search_path, &names)
        .ok_or_else(|| ModuleError::ToolNotFound { name: config.program.clone() })?;

    let absolute = std::path::absolute(&found)
        .map_err(|source| ModuleError::ToolResolutionFailed { path: found.clone(), source })?;
    // A symlink earlier on the search path could point anywhere; validate the real target.
    let resolved = std::fs::canonicalize(&absolute)
        .map_err(|source| ModuleError::ToolResolutionFailed { path: absolute.clone(), source })?;

    validate_binary_name(&resolved, &names, &config.program)?;
    tracing::debug!(program = %config.program, path = %resolved.display(), "resolved toolchain");
    Ok(resolved)
}

/// Check that the resolved file name is one of `names`.
pub fn validate_binary_name(resolved: &Path, names: &[String], expected: &str) -> ModuleResult<()> {
    let matches = resolved
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| names.iter().any(|accepted| accepted == n));
    if matches {
        Ok(())
    } else {
        Err(ModuleError::UnexpectedBinary {
            expected: expected.to_string(),
            resolved: resolved.to_path_buf(),
        })
    }
}

/// First executable file named one of `names` in a `PATH`-style list.
pub fn find_in_path(search_path: &OsStr, names: &[String]) -> Option<PathBuf> {
    std::env::split_paths(search_path).find_map(|dir| {
        names.iter().map(|name| dir.join(name)).find(|candidate| is_executable(candidate))
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_names_include_program() {
        let names = accepted_names("go");
        assert_eq!(names[0], "go");
        if cfg!(windows) {
            assert_eq!(names, vec!["go".to_string(), "go.exe".to_string()]);
        } else {
            assert_eq!(names.len(), 1);
        }
    }

    #[test]
    fn validate_binary_name_rejects_other_names() {
        let names = accepted_names("go");
        assert!(validate_binary_name(Path::new("/usr/lib/go/bin/go"), &names, "go").is_ok());
        let err = validate_binary_name(Path::new("/tmp/evil"), &names, "go").unwrap_err();
        assert!(matches!(err, ModuleError::UnexpectedBinary { .. }));
        let err = validate_binary_name(Path::new("/tmp/gofmt"), &names, "go").unwrap_err();
        assert!(matches!(err, ModuleError::UnexpectedBinary { .. }));
    }

    #[test]
    fn find_in_path_returns_none_for_empty_search_path() {
        assert!(find_in_path(OsStr::new(""), &accepted_names("go")).is_none());
    }

    #[test]
    fn locate_reports_missing_tool() {
        let temp = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            search_path: Some(temp.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let err = locate(&config).unwrap_err();
        assert!(matches!(err, ModuleError::ToolNotFound { ref name } if name == "go"));
    }
}
