use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use modtrace::commands::{extract_command, fetch_command};
use modtrace::{init_logging, resolve_config};

/// Module provenance for compiled Go binaries.
///
/// This CLI is a thin wrapper around `modtrace-core` (exposed in code as `modtrace_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends such as license scanners.
#[derive(Parser, Debug)]
#[command(
    name = "modtrace",
    version,
    about = "Extract and resolve the modules linked into Go binaries",
    long_about = None
)]
struct Cli {
    /// Toolchain config file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Abort a toolchain invocation after this many seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log toolchain invocations and workspace handling to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the modules statically linked into each binary (`go version -m`).
    ///
    /// Fails, naming every binary, if any of them yields no build info.
    Extract {
        /// Binaries to inspect.
        #[arg(required = true)]
        binaries: Vec<PathBuf>,

        /// Include the SHA-256 of each binary in the output.
        #[arg(long, default_value_t = false)]
        hash: bool,
    },

    /// Resolve every module linked into the binaries to its download location
    /// (`go mod download -json`).
    ///
    /// Local replacement modules are passed through without resolution metadata.
    Fetch {
        /// Binaries whose modules should be resolved.
        #[arg(required = true)]
        binaries: Vec<PathBuf>,
    },

    /// Print the library version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Extract { binaries, hash } => {
            let config = resolve_config(cli.config.as_deref(), cli.timeout_secs)?;
            extract_command(&config, &binaries, hash)?
        }
        Command::Fetch { binaries } => {
            let config = resolve_config(cli.config.as_deref(), cli.timeout_secs)?;
            fetch_command(&config, &binaries)?
        }
        Command::Version => println!("modtrace v{}", modtrace_core::version()),
    }

    Ok(())
}
