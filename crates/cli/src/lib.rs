use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use modtrace_core::{load_config, ToolchainConfig};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins unless `verbose` is set, which forces `debug`. Without either, only
/// warnings and errors (e.g. scratch cleanup failures) are shown.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when called from tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the toolchain config from an optional file plus command-line overrides.
pub fn resolve_config(path: Option<&Path>, timeout_secs: Option<u64>) -> Result<ToolchainConfig> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None => ToolchainConfig::default(),
    };
    if timeout_secs.is_some() {
        config.timeout_secs = timeout_secs;
    }
    Ok(config)
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open binary for hashing: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read binary for hashing: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(format!("{:x}", digest))
}
