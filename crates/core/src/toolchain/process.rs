use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{ModuleError, ModuleResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cancellation signal for a toolchain invocation.
///
/// Clones share the same flag, so a caller can keep one clone and cancel from another thread.
/// An optional deadline cancels implicitly once it has passed.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that cancels itself after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().limited_to(Some(timeout))
    }

    /// Same flag, with the deadline tightened to at most `timeout` from now.
    pub fn limited_to(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout.map(|t| Instant::now() + t)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self { flag: Arc::clone(&self.flag), deadline }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Output of a finished toolchain process.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Standard output followed by standard error.
    pub fn combined(&self) -> String {
        let mut out = self.stdout_lossy();
        out.push_str(&String::from_utf8_lossy(&self.stderr));
        out
    }
}

/// Run `program args...` in `cwd`, capturing both output streams.
///
/// The child is killed and reaped as soon as `cancel` fires, so it never outlives this call.
/// `label` names the command in errors (e.g. `go version`). A non-zero exit is not an error
/// here; callers decide which stream to attach.
pub fn run(
    program: &Path,
    args: &[OsString],
    cwd: &Path,
    cancel: &Cancellation,
    label: &str,
) -> ModuleResult<Captured> {
    if cancel.is_cancelled() {
        return Err(ModuleError::Cancelled { command: label.to_string() });
    }

    tracing::debug!(
        program = %program.display(),
        args = args.len(),
        cwd = %cwd.display(),
        "invoking toolchain"
    );
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            invocation_error(label, format!("failed to start {}: {e}", program.display()))
        })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = loop {
        if cancel.is_cancelled() {
            terminate(&mut child);
            // Readers are left detached; a grandchild may still hold the pipes open.
            return Err(ModuleError::Cancelled { command: label.to_string() });
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                terminate(&mut child);
                return Err(invocation_error(label, format!("failed to wait for process: {e}")));
            }
        }
    };

    // A grandchild can inherit the pipes and keep them open after the child exits.
    let stdout = collect(stdout, cancel, label)?;
    let stderr = collect(stderr, cancel, label)?;
    Ok(Captured { status, stdout, stderr })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    cancel: &Cancellation,
    label: &str,
) -> ModuleResult<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    while !handle.is_finished() {
        if cancel.is_cancelled() {
            return Err(ModuleError::Cancelled { command: label.to_string() });
        }
        thread::sleep(POLL_INTERVAL);
    }
    match handle.join() {
        Ok(Ok(buf)) => Ok(buf),
        Ok(Err(e)) => {
            Err(invocation_error(label, format!("failed to read process output: {e}")))
        }
        Err(_) => Err(invocation_error(label, "output reader panicked".to_string())),
    }
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "toolchain process already exited");
    }
    if let Err(e) = child.wait() {
        tracing::debug!(error = %e, "failed to reap toolchain process");
    }
}

fn invocation_error(label: &str, detail: String) -> ModuleError {
    ModuleError::ToolchainInvocationFailed {
        command: label.to_string(),
        detail,
        output: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = Cancellation::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn limited_to_keeps_the_earlier_deadline() {
        let token = Cancellation::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
        let widened = token.limited_to(Some(Duration::from_secs(3600)));
        assert!(widened.is_cancelled());
        assert!(!Cancellation::new().limited_to(None).is_cancelled());
    }

    #[test]
    fn run_refuses_to_start_when_already_cancelled() {
        let token = Cancellation::new();
        token.cancel();
        let err = run(Path::new("/nonexistent/go"), &[], Path::new("."), &token, "go version")
            .unwrap_err();
        assert!(matches!(err, ModuleError::Cancelled { .. }));
    }

    #[test]
    fn run_reports_spawn_failure() {
        let temp = tempfile::tempdir().unwrap();
        let err = run(
            &temp.path().join("missing-go"),
            &[],
            temp.path(),
            &Cancellation::new(),
            "go version",
        )
        .unwrap_err();
        assert!(matches!(err, ModuleError::ToolchainInvocationFailed { .. }));
        assert!(err.to_string().contains("go version"));
    }

    #[cfg(unix)]
    #[test]
    fn run_stops_waiting_on_pipes_held_by_a_grandchild() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let script = temp.path().join("go");
        std::fs::write(&script, "#!/bin/sh\nsleep 30 &\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let started = Instant::now();
        let err = run(
            &script,
            &[],
            temp.path(),
            &Cancellation::with_timeout(Duration::from_millis(300)),
            "go version",
        )
        .unwrap_err();
        assert!(matches!(err, ModuleError::Cancelled { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
