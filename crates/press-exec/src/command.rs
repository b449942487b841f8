//! External program execution with an optional deadline.

use std::ffi::{OsStr, OsString};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::ExecError;

/// How often a running child is polled while a deadline is active.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on captured stderr kept in error messages.
const STDERR_LIMIT: usize = 2000;

/// Exit information of a finished program.
#[derive(Debug)]
pub struct CommandOutcome {
    /// Exit status reported by the OS.
    pub status: ExitStatus,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl CommandOutcome {
    /// Whether the program exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Builder for running a helper program.
///
/// Standard output is discarded. Standard error is spooled to an anonymous
/// temporary file, not a pipe.
#[derive(Clone, Debug)]
pub struct ExternalCommand {
    program: String,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    current_dir: Option<PathBuf>,
}

impl ExternalCommand {
    /// Create a command for the given program name or path.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            current_dir: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Kill the program if it is still running after `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run the program inside `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program name as given to [`new`](Self::new).
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the program and return its exit information.
    ///
    /// A non-zero exit is not an error here; see [`run_checked`](Self::run_checked).
    pub fn run(&self) -> Result<CommandOutcome, ExecError> {
        let mut stderr_file = tempfile::tempfile().map_err(|source| ExecError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        let stderr_handle = stderr_file.try_clone().map_err(|source| ExecError::Io {
            path: std::env::temp_dir(),
            source,
        })?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_handle));
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        tracing::debug!(program = %self.program, args = ?self.args, "Spawning external command");

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let status = match self.timeout {
            None => child.wait().map_err(|source| self.wait_error(source))?,
            Some(timeout) => {
                let start = Instant::now();
                loop {
                    let finished = child.try_wait().map_err(|source| self.wait_error(source))?;
                    if let Some(status) = finished {
                        break status;
                    }
                    if start.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        tracing::warn!(
                            program = %self.program,
                            timeout_secs = timeout.as_secs(),
                            "External command timed out"
                        );
                        return Err(ExecError::Timeout {
                            program: self.program.clone(),
                            timeout,
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let mut raw = Vec::new();
        if stderr_file.seek(SeekFrom::Start(0)).is_ok() {
            let _ = stderr_file.read_to_end(&mut raw);
        }
        let mut stderr = String::from_utf8_lossy(&raw).trim().to_owned();
        if stderr.len() > STDERR_LIMIT {
            let cut = (0..=STDERR_LIMIT)
                .rev()
                .find(|&i| stderr.is_char_boundary(i))
                .unwrap_or(0);
            stderr.truncate(cut);
        }

        Ok(CommandOutcome { status, stderr })
    }

    /// Run the program and fail unless it exits with status 0.
    pub fn run_checked(&self) -> Result<CommandOutcome, ExecError> {
        let outcome = self.run()?;
        if outcome.success() {
            Ok(outcome)
        } else {
            Err(ExecError::Failed {
                program: self.program.clone(),
                status: outcome.status.to_string(),
                stderr: outcome.stderr,
            })
        }
    }

    fn wait_error(&self, source: std::io::Error) -> ExecError {
        ExecError::Wait {
            program: self.program.clone(),
            source,
        }
    }
}

/// Check whether `program` launches and exits successfully with `arg`.
///
/// Used at startup to detect optional helpers (`program --version`).
#[must_use]
pub fn probe(program: &str, arg: &str, timeout: Duration) -> bool {
    match ExternalCommand::new(program).arg(arg).timeout(timeout).run() {
        Ok(outcome) => outcome.success(),
        Err(e) => {
            tracing::debug!(program, error = %e, "Probe failed");
            false
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_success() {
        let outcome = ExternalCommand::new("sh").args(["-c", "exit 0"]).run().unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn test_run_reports_nonzero_exit() {
        let outcome = ExternalCommand::new("sh").args(["-c", "exit 3"]).run().unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.status.code(), Some(3));
    }

    #[test]
    fn test_run_captures_stderr() {
        let outcome = ExternalCommand::new("sh")
            .args(["-c", "echo broken >&2; exit 1"])
            .run()
            .unwrap();
        assert_eq!(outcome.stderr, "broken");
    }

    #[test]
    fn test_run_checked_fails_on_nonzero() {
        let err = ExternalCommand::new("sh")
            .args(["-c", "echo nope >&2; exit 2"])
            .run_checked()
            .unwrap_err();
        assert!(matches!(err, ExecError::Failed { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let err = ExternalCommand::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(200))
            .run()
            .unwrap_err();
        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = ExternalCommand::new("press-definitely-missing-binary")
            .run()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        ExternalCommand::new("sh")
            .args(["-c", "touch marker"])
            .current_dir(dir.path())
            .run_checked()
            .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_probe() {
        assert!(probe("true", "--version", Duration::from_secs(5)));
        assert!(!probe("false", "--version", Duration::from_secs(5)));
        assert!(!probe("press-definitely-missing-binary", "--version", Duration::from_secs(5)));
    }
}
