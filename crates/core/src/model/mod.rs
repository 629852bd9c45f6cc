//! Core data model for binary provenance and module resolution.
//!
//! - `BuildInfo`: one record per inspected binary, keyed by its path.
//! - `ModuleDependency`: a module line from the build metadata, with an optional replacement.
//! - `ModuleReference`: a `(path, version)` pair identifying a dependency to resolve.
//! - `Module`: a reference enriched with the resolution toolchain's download metadata.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Build metadata extracted from a single compiled binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Path of the binary, exactly as it was passed to the toolchain.
    pub path: PathBuf,
    /// Toolchain version the binary was built with (e.g. `go1.22.1`).
    pub go_version: String,
    /// Main package path (`path` line).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_path: Option<String>,
    /// Main module (`mod` line).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_module: Option<ModuleDependency>,
    /// Dependency modules (`dep` lines) in the order the toolchain reported them.
    #[serde(default)]
    pub dependencies: Vec<ModuleDependency>,
    /// Build settings (`build` lines).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub settings: Vec<BuildSetting>,
}

impl BuildInfo {
    /// Create an empty record for `path`.
    pub fn new(path: impl Into<PathBuf>, go_version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            go_version: go_version.into(),
            main_path: None,
            main_module: None,
            dependencies: Vec::new(),
            settings: Vec::new(),
        }
    }

    /// Effective module references of every dependency, after replacements.
    ///
    /// Duplicates are dropped; first-seen order is kept.
    pub fn module_references(&self) -> Vec<ModuleReference> {
        let mut refs: Vec<ModuleReference> = Vec::with_capacity(self.dependencies.len());
        for dep in &self.dependencies {
            let reference = dep.effective().reference();
            if !refs.contains(&reference) {
                refs.push(reference);
            }
        }
        refs
    }
}

/// A module line (`mod`, `dep` or `=>`) from the build metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDependency {
    pub path: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Box<ModuleDependency>>,
}

impl ModuleDependency {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self { path: path.into(), version: version.into(), checksum: None, replacement: None }
    }

    /// The module actually linked into the binary: the replacement if any, else `self`.
    pub fn effective(&self) -> &ModuleDependency {
        self.replacement.as_deref().unwrap_or(self)
    }

    pub fn reference(&self) -> ModuleReference {
        ModuleReference::new(&self.path, &self.version)
    }
}

/// A `key=value` build setting recorded in the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSetting {
    pub key: String,
    pub value: String,
}

/// Identifies a module version to resolve.
///
/// Locality is derived from the path, so value equality covers path, version and locality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleReference {
    pub path: String,
    #[serde(default)]
    pub version: String,
}

impl ModuleReference {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self { path: path.into(), version: version.into() }
    }

    /// True for filesystem replacements, which the resolution toolchain never handles.
    pub fn is_local(&self) -> bool {
        let p = self.path.as_str();
        p == "."
            || p == ".."
            || p.starts_with("./")
            || p.starts_with("../")
            || p.starts_with(".\\")
            || p.starts_with("..\\")
            || p.starts_with('/')
            || Path::new(p).is_absolute()
    }
}

impl fmt::Display for ModuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() || self.version.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}@{}", self.path, self.version)
        }
    }
}

/// A resolved module, as reported by `go mod download -json`.
///
/// Local modules carry no resolution metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Module {
    #[serde(flatten)]
    pub reference: ModuleReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_mod: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_mod_sum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Module {
    /// Pass-through module for a local reference.
    pub fn local(reference: ModuleReference) -> Self {
        Self {
            reference,
            info: None,
            go_mod: None,
            zip: None,
            dir: None,
            sum: None,
            go_mod_sum: None,
            error: None,
        }
    }

    /// True when any download location or checksum is populated.
    pub fn has_resolution_metadata(&self) -> bool {
        self.info.is_some()
            || self.go_mod.is_some()
            || self.zip.is_some()
            || self.dir.is_some()
            || self.sum.is_some()
            || self.go_mod_sum.is_some()
    }
}
