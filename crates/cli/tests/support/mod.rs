#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;

/// Fake `go` handling both `version -m` and `mod download -json`.
///
/// Binaries whose path contains `missing` yield no build info.
const FAKE_GO: &str = r#"#!/bin/sh
case "$1" in
  version)
    shift 2
    for p in "$@"; do
      case "$p" in *missing*) continue ;; esac
      printf '%s: go1.22.1\n\tpath\texample.com/app\n\tdep\tgithub.com/pkg/errors\tv0.9.1\th1:FEBLx1zS214owpjy7qsBeixbURkuhQAwrK5UwLGTwt4=\n\tdep\texample.com/lib\tv1.0.0\n\t=>\t../lib\t\t\n' "$p"
    done
    ;;
  mod)
    shift 3
    for ref in "$@"; do
      printf '{"Path": "%s", "Version": "%s", "Sum": "h1:fake="}\n' "${ref%@*}" "${ref##*@}"
    done
    ;;
  *)
    exit 2
    ;;
esac
"#;

pub struct Project {
    pub root: TempDir,
    pub config: PathBuf,
}

impl Project {
    /// Temp dir with a fake toolchain and a config file pointing at it.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let bin = root.path().join("bin");
        fs::create_dir_all(&bin).expect("create bin");
        let go = bin.join("go");
        fs::write(&go, FAKE_GO).expect("write fake go");
        fs::set_permissions(&go, fs::Permissions::from_mode(0o755)).expect("chmod fake go");

        let config = root.path().join("toolchain.json");
        let body = serde_json::json!({ "search_path": bin, "timeout_secs": 60 });
        fs::write(&config, body.to_string()).expect("write config");
        Self { root, config }
    }

    /// Write a placeholder binary so hashing has something to read.
    pub fn binary(&self, name: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, name.as_bytes()).expect("write binary");
        path
    }
}
