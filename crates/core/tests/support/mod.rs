//! Fake `go` toolchains for integration tests.
//!
//! Each fake is a shell script named `go` in a private `bin` directory. It appends
//! `<cwd>|<args>` to an invocation log before running the test-specific body.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use modtrace_core::ToolchainConfig;
use tempfile::TempDir;

pub struct FakeToolchain {
    pub root: TempDir,
    pub bin: PathBuf,
    pub scratch: PathBuf,
    pub log: PathBuf,
}

impl FakeToolchain {
    /// Install a fake `go` whose behaviour is the shell snippet `body`.
    pub fn new(body: &str) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let bin = root.path().join("bin");
        let scratch = root.path().join("scratch");
        fs::create_dir_all(&bin).expect("create bin");
        fs::create_dir_all(&scratch).expect("create scratch");
        let log = root.path().join("invocations.log");
        write_script(&bin.join("go"), &log, body);
        Self { root, bin, scratch, log }
    }

    pub fn config(&self) -> ToolchainConfig {
        ToolchainConfig {
            search_path: Some(self.bin.to_string_lossy().to_string()),
            scratch_root: Some(self.scratch.clone()),
            ..Default::default()
        }
    }

    /// `(cwd, args)` for every invocation so far.
    pub fn invocations(&self) -> Vec<(String, String)> {
        match fs::read_to_string(&self.log) {
            Ok(body) => body
                .lines()
                .filter_map(|line| line.split_once('|'))
                .map(|(cwd, args)| (cwd.to_string(), args.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn scratch_entries(&self) -> usize {
        fs::read_dir(&self.scratch).expect("read scratch").count()
    }
}

/// Write an executable script that logs its invocation to `log` and then runs `body`.
pub fn write_script(path: &Path, log: &Path, body: &str) {
    let script = format!("#!/bin/sh\necho \"$(pwd -P)|$*\" >> '{}'\n{}\n", log.display(), body);
    fs::write(path, script).expect("write script");
    let mut perms = fs::metadata(path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod script");
}

/// `go version -m` that describes every argument except those containing `missing`.
pub const VERSION_BODY: &str = r#"
if [ "$1" = "version" ]; then
  shift 2
  for p in "$@"; do
    case "$p" in *missing*) continue ;; esac
    printf '%s: go1.22.1\n\tpath\texample.com/app\n\tmod\texample.com/app\t(devel)\t\n\tdep\tgithub.com/pkg/errors\tv0.9.1\th1:FEBLx1zS214owpjy7qsBeixbURkuhQAwrK5UwLGTwt4=\n\tdep\texample.com/lib\tv1.0.0\n\t=>\t../lib\t\t\n' "$p"
  done
  exit 0
fi
exit 2
"#;

/// `go mod download -json` that resolves every argument except those containing `missing`.
pub const DOWNLOAD_BODY: &str = r#"
if [ "$1" = "mod" ] && [ "$2" = "download" ]; then
  shift 3
  for ref in "$@"; do
    case "$ref" in *missing*) continue ;; esac
    path="${ref%@*}"
    version="${ref##*@}"
    printf '{\n\t"Path": "%s",\n\t"Version": "%s",\n\t"Dir": "/go/pkg/mod/%s@%s",\n\t"Sum": "h1:fake="\n}\n' "$path" "$version" "$path" "$version"
  done
  exit 0
fi
exit 2
"#;
