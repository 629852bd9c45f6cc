//! modtrace-core
//!
//! Core library for extracting module provenance from compiled Go binaries and resolving the
//! referenced modules to downloadable archives.
//!
//! Two entry points cover the whole pipeline:
//! - [`extract`]: which modules, at which versions, were linked into these binaries?
//! - [`fetch`]: where can those exact module versions be downloaded from?
//!
//! Both shell out to the Go toolchain, which is located and validated by [`toolchain`], run
//! inside a throwaway [`workspace`], and checked for completeness by [`services::verify`].
//! Frontends (the CLI, license scanners) stay thin and call into this crate.

pub mod buildinfo;
pub mod config;
pub mod error;
pub mod model;
pub mod services;
pub mod toolchain;
pub mod workspace;

pub use config::{load_config, ToolchainConfig};
pub use error::{ModuleError, ModuleResult};
pub use model::{BuildInfo, Module, ModuleDependency, ModuleReference};
pub use services::{extract, fetch, Diagnostics, Gap};
pub use toolchain::Cancellation;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
