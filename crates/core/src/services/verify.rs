use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModuleReference;

/// One requested input missing from a pipeline's output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Gap {
    #[error(
        "modules could not be obtained from {} (hint: run `{program} version -m {:?}`)",
        .path.display(),
        .path.display().to_string()
    )]
    MissingBuildInfo { path: PathBuf, program: String },

    #[error("module {0} could not be resolved")]
    UnresolvedModule(ModuleReference),
}

/// Every gap found in one verification pass, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    gaps: Vec<Gap>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, gap: Gap) {
        self.gaps.push(gap);
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// `Ok(())` when nothing was recorded, otherwise the whole set.
    pub fn into_result(self) -> Result<(), Diagnostics> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.gaps.len() == 1 { "error" } else { "errors" };
        writeln!(f, "{} {} occurred:", self.gaps.len(), noun)?;
        for gap in &self.gaps {
            writeln!(f, "\t* {gap}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

/// Check that every `requested` key appears in `actual`.
///
/// Walks `requested` in order and records one gap per missing key, so the caller sees all of
/// them at once rather than only the first.
pub fn verify_complete<K, A, R, F>(actual: A, requested: R, mut gap: F) -> Result<(), Diagnostics>
where
    K: Eq + Hash,
    A: IntoIterator<Item = K>,
    R: IntoIterator<Item = K>,
    F: FnMut(K) -> Gap,
{
    let present: HashSet<K> = actual.into_iter().collect();
    let mut diagnostics = Diagnostics::new();
    for key in requested {
        if !present.contains(&key) {
            diagnostics.push(gap(key));
        }
    }
    diagnostics.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn missing(path: &Path) -> Gap {
        Gap::MissingBuildInfo { path: path.to_path_buf(), program: "go".into() }
    }

    #[test]
    fn passes_when_everything_is_present() {
        let actual = [Path::new("/a"), Path::new("/b")];
        let requested = [Path::new("/b"), Path::new("/a")];
        assert!(verify_complete(actual, requested, missing).is_ok());
    }

    #[test]
    fn reports_every_missing_item_in_request_order() {
        let actual = [Path::new("/b")];
        let requested = [Path::new("/c"), Path::new("/b"), Path::new("/a")];
        let diagnostics = verify_complete(actual, requested, missing).unwrap_err();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.gaps()[0], missing(Path::new("/c")));
        assert_eq!(diagnostics.gaps()[1], missing(Path::new("/a")));
    }

    #[test]
    fn empty_request_always_passes() {
        let requested: [&Path; 0] = [];
        assert!(verify_complete([Path::new("/a")], requested, missing).is_ok());
    }

    #[test]
    fn missing_build_info_includes_hint() {
        let text = missing(Path::new("/usr/bin/app")).to_string();
        assert_eq!(
            text,
            "modules could not be obtained from /usr/bin/app (hint: run `go version -m \"/usr/bin/app\"`)"
        );
    }

    #[test]
    fn display_renders_all_causes() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Gap::UnresolvedModule(ModuleReference::new("example.com/a", "v1.0.0")));
        diagnostics.push(Gap::UnresolvedModule(ModuleReference::new("example.com/b", "v2.0.0")));
        let text = diagnostics.to_string();
        assert!(text.starts_with("2 errors occurred:"));
        assert!(text.contains("module example.com/a@v1.0.0 could not be resolved"));
        assert!(text.contains("module example.com/b@v2.0.0 could not be resolved"));
    }
}
