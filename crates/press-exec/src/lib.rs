//! Process plumbing shared by the Press rendering backends.
//!
//! - [`ExternalCommand`]: runs a helper program with an optional wall-clock
//!   deadline, killing it when the deadline passes
//! - [`ScratchDir`]: a per-request temporary directory that is removed when
//!   dropped, logging (never propagating) cleanup failures
//! - [`probe`]: checks whether a helper program can be launched at all

mod command;
mod scratch;

pub use command::{CommandOutcome, ExternalCommand, probe};
pub use scratch::ScratchDir;

use std::path::PathBuf;
use std::time::Duration;

/// Error raised while running an external program or managing scratch files.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The program could not be started (missing binary, permissions).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// Waiting on the child process failed.
    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The program ran past its deadline and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    /// The program exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    /// Scratch file I/O failed.
    #[error("scratch file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// Whether the error means the program is not installed.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
