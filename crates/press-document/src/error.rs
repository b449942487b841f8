//! Error types for document rendering.

use std::fmt;

use press_exec::ExecError;

use crate::artifact::OutputFormat;

/// Failure of a single backend.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// External converter or scratch file failure.
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] genpdf::error::Error),
    #[error("DOCX generation failed: {0}")]
    Docx(String),
    #[error("font loading failed: {0}")]
    Fonts(String),
    /// Diagram image could not be decoded or embedded.
    #[error("image embedding failed: {0}")]
    Image(String),
    /// Converter exited successfully without writing its output file.
    #[error("{program} produced no output")]
    MissingOutput { program: String },
    /// Output bytes are not a document of the requested format.
    #[error("invalid {format} output: {reason}")]
    InvalidArtifact {
        format: OutputFormat,
        reason: &'static str,
    },
}

/// One backend's failure reason, kept for the exhausted-backends report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendFailure {
    pub backend: &'static str,
    pub reason: String,
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.backend, self.reason)
    }
}

fn join_failures(failures: &[BackendFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of a whole render request.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No backend for the format is enabled and installed.
    #[error("{format} rendering is not available: no backend is enabled")]
    Unavailable { format: OutputFormat },
    /// Every available backend was tried and failed.
    #[error("{format} conversion failed: {}", join_failures(.attempts))]
    Exhausted {
        format: OutputFormat,
        attempts: Vec<BackendFailure>,
    },
}

impl RenderError {
    /// Stable machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "backend_unavailable",
            Self::Exhausted { .. } => "conversion_failed",
        }
    }
}
