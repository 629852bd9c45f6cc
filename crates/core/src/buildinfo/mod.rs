//! Parser for the text emitted by `go version -m <binaries...>`.
//!
//! Each binary contributes one record:
//!
//! ```text
//! /usr/local/bin/app: go1.22.1
//! 	path	example.com/app/cmd/app
//! 	mod	example.com/app	(devel)
//! 	dep	github.com/pkg/errors	v0.9.1	h1:FEBLx1zS214owpjy7qsBeixbURkuhQAwrK5UwLGTwt4=
//! 	dep	example.com/lib	v1.0.0
//! 	=>	../lib
//! 	build	-compiler=gc
//! ```
//!
//! A non-indented line opens a record; tab-indented lines describe it.

use thiserror::Error;

use crate::model::{BuildInfo, BuildSetting, ModuleDependency};

/// Malformed provenance text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number in the toolchain output.
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self { line, reason: reason.into() }
    }
}

/// Which module line a following `=>` attaches to.
#[derive(Clone, Copy)]
enum LastModule {
    None,
    Main,
    Dep,
}

/// Parse `go version -m` output into one `BuildInfo` per binary, in input order.
pub fn parse(output: &str) -> Result<Vec<BuildInfo>, ParseError> {
    let mut records: Vec<BuildInfo> = Vec::new();
    let mut last = LastModule::None;

    for (idx, raw) in output.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let Some(body) = raw.strip_prefix('\t') else {
            records.push(parse_header(raw, line_no)?);
            last = LastModule::None;
            continue;
        };

        let current = records
            .last_mut()
            .ok_or_else(|| ParseError::new(line_no, "metadata line before any binary header"))?;

        let mut fields = body.split('\t');
        let keyword = fields.next().unwrap_or_default();
        match keyword {
            "path" => {
                let path = non_empty(fields.next(), line_no, "path line without a package path")?;
                current.main_path = Some(path.to_string());
            }
            "mod" => {
                current.main_module = Some(parse_module(fields, line_no)?);
                last = LastModule::Main;
            }
            "dep" => {
                current.dependencies.push(parse_module(fields, line_no)?);
                last = LastModule::Dep;
            }
            "=>" => {
                let replacement = Box::new(parse_module(fields, line_no)?);
                let target = match last {
                    LastModule::Main => current.main_module.as_mut(),
                    LastModule::Dep => current.dependencies.last_mut(),
                    LastModule::None => None,
                };
                let target = target
                    .ok_or_else(|| ParseError::new(line_no, "replacement without a module"))?;
                target.replacement = Some(replacement);
                last = LastModule::None;
            }
            "build" => {
                let setting = fields.collect::<Vec<_>>().join("\t");
                let (key, value) = setting
                    .split_once('=')
                    .ok_or_else(|| ParseError::new(line_no, "build setting without '='"))?;
                current
                    .settings
                    .push(BuildSetting { key: key.to_string(), value: value.to_string() });
            }
            other => {
                tracing::debug!(
                    line = line_no,
                    keyword = other,
                    "skipping unknown build info line"
                );
            }
        }
    }

    Ok(records)
}

fn parse_header(line: &str, line_no: usize) -> Result<BuildInfo, ParseError> {
    let (path, go_version) = line
        .rsplit_once(": ")
        .ok_or_else(|| {
            ParseError::new(line_no, format!("expected '<path>: <version>', got {line:?}"))
        })?;
    let path = path.trim_end();
    let go_version = go_version.trim();
    if path.is_empty() || go_version.is_empty() {
        return Err(ParseError::new(line_no, format!("incomplete binary header {line:?}")));
    }
    Ok(BuildInfo::new(path, go_version))
}

fn parse_module<'a>(
    mut fields: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<ModuleDependency, ParseError> {
    let path = non_empty(fields.next(), line_no, "module line without a module path")?;
    let version = fields.next().unwrap_or_default().trim();
    let checksum = fields.next().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    let mut module = ModuleDependency::new(path, version);
    module.checksum = checksum;
    Ok(module)
}

fn non_empty<'a>(
    field: Option<&'a str>,
    line_no: usize,
    reason: &str,
) -> Result<&'a str, ParseError> {
    field.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| ParseError::new(line_no, reason))
}
