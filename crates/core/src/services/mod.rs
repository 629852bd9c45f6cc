//! Extraction and resolution pipelines.
//!
//! - `extract`: `go version -m` over a batch of binaries, parsed into `BuildInfo` records.
//! - `fetch`: `go mod download -json` over a batch of module references.
//! - `verify`: the completeness check both pipelines finish with.
//!
//! Each call locates the toolchain, runs it once inside its own scratch workspace and shares
//! no state with other calls.

pub mod extract;
pub mod fetch;
pub mod verify;

pub use extract::extract;
pub use fetch::{fetch, ModuleStream};
pub use verify::{verify_complete, Diagnostics, Gap};
