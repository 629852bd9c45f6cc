use std::ffi::OsString;
use std::io::Read;

use serde_json::de::IoRead;
use serde_json::StreamDeserializer;

use crate::config::ToolchainConfig;
use crate::error::{ModuleError, ModuleResult};
use crate::model::{Module, ModuleReference};
use crate::services::verify::{verify_complete, Gap};
use crate::toolchain::{self, Cancellation};
use crate::workspace::with_scratch;

/// Label used for `go mod download -json` in errors.
pub const DOWNLOAD_COMMAND: &str = "go mod download";

/// Resolve module references to downloadable modules with `go mod download -json`.
///
/// Local references are never sent to the toolchain; each one comes back as a
/// `Module::local` with no resolution metadata. When no remote references are requested the
/// toolchain is not located or invoked at all.
pub fn fetch(
    config: &ToolchainConfig,
    cancel: &Cancellation,
    refs: &[ModuleReference],
) -> ModuleResult<Vec<Module>> {
    if refs.is_empty() {
        return Ok(Vec::new());
    }

    let remote: Vec<&ModuleReference> = refs.iter().filter(|r| !r.is_local()).collect();
    let mut modules =
        if remote.is_empty() { Vec::new() } else { download(config, cancel, &remote)? };

    // `go mod download` knows nothing about filesystem replacements.
    modules.extend(refs.iter().filter(|r| r.is_local()).cloned().map(Module::local));

    verify_complete(modules.iter().map(|m| &m.reference), refs.iter(), |r| {
        Gap::UnresolvedModule(r.clone())
    })
    .map_err(ModuleError::IncompleteResolution)?;

    Ok(modules)
}

fn download(
    config: &ToolchainConfig,
    cancel: &Cancellation,
    remote: &[&ModuleReference],
) -> ModuleResult<Vec<Module>> {
    let go = toolchain::locate(config)?;
    let cancel = cancel.limited_to(config.timeout());

    let mut args: Vec<OsString> = vec!["mod".into(), "download".into(), "-json".into()];
    args.extend(remote.iter().map(|r| OsString::from(r.to_string())));

    let output =
        with_scratch(config, |dir| toolchain::run(&go, &args, dir, &cancel, DOWNLOAD_COMMAND))?;
    if !output.status.success() {
        // Failures are reported as JSON `Error` fields on stdout as well as on stderr.
        return Err(ModuleError::ToolchainInvocationFailed {
            command: DOWNLOAD_COMMAND.to_string(),
            detail: output.status.to_string(),
            output: output.combined(),
        });
    }

    ModuleStream::new(output.stdout.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(ModuleError::DecodeFailed)
}

/// Pull-based decoder over a stream of concatenated JSON `Module` objects.
///
/// Yields `None` at a clean end of input (trailing whitespace allowed) and `Some(Err(_))` once
/// for malformed bytes, after which it is exhausted.
pub struct ModuleStream<R: Read> {
    inner: StreamDeserializer<'static, IoRead<R>, Module>,
    failed: bool,
}

impl<R: Read> ModuleStream<R> {
    pub fn new(reader: R) -> Self {
        Self { inner: serde_json::Deserializer::from_reader(reader).into_iter(), failed: false }
    }
}

impl<R: Read> Iterator for ModuleStream<R> {
    type Item = Result<Module, serde_json::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}
