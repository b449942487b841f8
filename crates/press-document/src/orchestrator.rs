//! Priority-ordered backend fallback.

use std::sync::Arc;

use crate::artifact::{OutputFormat, RenderArtifact};
use crate::backend::DocumentBackend;
use crate::capabilities::BackendCapabilities;
use crate::error::{BackendFailure, RenderError};
use crate::request::RenderRequest;

/// Tries backends for a format in registration order.
///
/// Backends whose capability flag is off are never invoked. A backend that
/// errors or returns bytes failing [`RenderArtifact::validate`] is logged
/// and the next one is tried.
pub struct Orchestrator {
    backends: Vec<Box<dyn DocumentBackend>>,
    capabilities: Arc<BackendCapabilities>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(capabilities: Arc<BackendCapabilities>) -> Self {
        Self {
            backends: Vec::new(),
            capabilities,
        }
    }

    /// Append a backend; earlier backends have priority.
    #[must_use]
    pub fn with_backend(mut self, backend: impl DocumentBackend + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    #[must_use]
    pub fn capabilities(&self) -> &BackendCapabilities {
        &self.capabilities
    }

    /// Names of the backends that may run for `format`, in priority order.
    #[must_use]
    pub fn available(&self, format: OutputFormat) -> Vec<&'static str> {
        self.candidates(format).map(|b| b.name()).collect()
    }

    fn candidates(&self, format: OutputFormat) -> impl Iterator<Item = &dyn DocumentBackend> {
        self.backends
            .iter()
            .map(Box::as_ref)
            .filter(move |b| b.format() == format && b.is_available(&self.capabilities))
    }

    /// Render `request` as `format` with the first backend that succeeds.
    pub fn render(
        &self,
        request: &RenderRequest,
        format: OutputFormat,
    ) -> Result<RenderArtifact, RenderError> {
        let mut attempts = Vec::new();

        for backend in self.candidates(format) {
            let name = backend.name();
            let result = backend
                .convert(request)
                .and_then(|bytes| RenderArtifact::validate(bytes, format, name));
            match result {
                Ok(artifact) => {
                    tracing::info!(
                        backend = name,
                        %format,
                        bytes = artifact.bytes().len(),
                        "Rendered document"
                    );
                    return Ok(artifact);
                }
                Err(e) => {
                    tracing::warn!(
                        backend = name,
                        %format,
                        error = %e,
                        "Backend failed, trying next"
                    );
                    attempts.push(BackendFailure {
                        backend: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if attempts.is_empty() {
            tracing::warn!(%format, "No backend available");
            Err(RenderError::Unavailable { format })
        } else {
            Err(RenderError::Exhausted { format, attempts })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fake {
        name: &'static str,
        format: OutputFormat,
        output: Result<&'static [u8], &'static str>,
        gate: fn(&BackendCapabilities) -> bool,
        calls: Arc<AtomicUsize>,
    }

    impl Fake {
        fn new(
            name: &'static str,
            output: Result<&'static [u8], &'static str>,
            gate: fn(&BackendCapabilities) -> bool,
        ) -> Self {
            Self {
                name,
                format: OutputFormat::Pdf,
                output,
                gate,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn ok(
            name: &'static str,
            bytes: &'static [u8],
            gate: fn(&BackendCapabilities) -> bool,
        ) -> Self {
            Self::new(name, Ok(bytes), gate)
        }

        fn failing(
            name: &'static str,
            reason: &'static str,
            gate: fn(&BackendCapabilities) -> bool,
        ) -> Self {
            Self::new(name, Err(reason), gate)
        }
    }

    impl DocumentBackend for Fake {
        fn name(&self) -> &'static str {
            self.name
        }

        fn format(&self) -> OutputFormat {
            self.format
        }

        fn is_available(&self, capabilities: &BackendCapabilities) -> bool {
            (self.gate)(capabilities)
        }

        fn convert(&self, _request: &RenderRequest) -> Result<Vec<u8>, DocumentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output
                .map(<[u8]>::to_vec)
                .map_err(|reason| DocumentError::Docx(reason.to_owned()))
        }
    }

    fn caps(primary: bool, fallback: bool) -> Arc<BackendCapabilities> {
        Arc::new(BackendCapabilities {
            html_pdf_engine: primary,
            direct_pdf: fallback,
            ..BackendCapabilities::default()
        })
    }

    fn primary_gate(c: &BackendCapabilities) -> bool {
        c.html_pdf_engine
    }

    fn fallback_gate(c: &BackendCapabilities) -> bool {
        c.direct_pdf
    }

    #[test]
    fn test_disabled_primary_is_never_attempted() {
        let primary = Fake::ok("primary", b"%PDF-1.7", primary_gate);
        let primary_calls = Arc::clone(&primary.calls);
        let orchestrator = Orchestrator::new(caps(false, true))
            .with_backend(primary)
            .with_backend(Fake::ok("fallback", b"%PDF-1.4", fallback_gate));

        let artifact = orchestrator.render(&RenderRequest::new("x"), OutputFormat::Pdf).unwrap();

        assert_eq!(artifact.backend(), "fallback");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_falls_through() {
        let orchestrator = Orchestrator::new(caps(true, true))
            .with_backend(Fake::failing("primary", "boom", primary_gate))
            .with_backend(Fake::ok("fallback", b"%PDF-1.4", fallback_gate));
        let artifact = orchestrator.render(&RenderRequest::new("x"), OutputFormat::Pdf).unwrap();
        assert_eq!(artifact.backend(), "fallback");
    }

    #[test]
    fn test_invalid_output_falls_through() {
        let orchestrator = Orchestrator::new(caps(true, true))
            .with_backend(Fake::ok("primary", b"", primary_gate))
            .with_backend(Fake::ok("fallback", b"%PDF-1.4", fallback_gate));
        let artifact = orchestrator.render(&RenderRequest::new("x"), OutputFormat::Pdf).unwrap();
        assert_eq!(artifact.backend(), "fallback");
    }

    #[test]
    fn test_exhausted_lists_each_attempt() {
        let orchestrator = Orchestrator::new(caps(true, true))
            .with_backend(Fake::failing("primary", "boom", primary_gate))
            .with_backend(Fake::ok("fallback", b"<html>", fallback_gate));
        let err = orchestrator.render(&RenderRequest::new("x"), OutputFormat::Pdf).unwrap_err();
        let RenderError::Exhausted { attempts, .. } = err else {
            panic!("expected exhausted");
        };
        let names: Vec<_> = attempts.iter().map(|a| a.backend).collect();
        assert_eq!(names, vec!["primary", "fallback"]);
        assert_eq!(attempts[1].reason, "invalid PDF output: missing file signature");
    }

    #[test]
    fn test_unavailable_when_nothing_enabled() {
        let orchestrator = Orchestrator::new(caps(false, false))
            .with_backend(Fake::ok("primary", b"%PDF-1.7", primary_gate));
        let err = orchestrator.render(&RenderRequest::new("x"), OutputFormat::Pdf).unwrap_err();
        assert!(matches!(err, RenderError::Unavailable { format: OutputFormat::Pdf }));
        assert!(orchestrator.available(OutputFormat::Pdf).is_empty());
    }

    #[test]
    fn test_other_format_backends_ignored() {
        let mut docx = Fake::ok("docx", b"PK\x03\x04", |_| true);
        docx.format = OutputFormat::Docx;
        let orchestrator = Orchestrator::new(caps(true, false))
            .with_backend(docx)
            .with_backend(Fake::ok("primary", b"%PDF-1.7", primary_gate));
        assert_eq!(orchestrator.available(OutputFormat::Pdf), vec!["primary"]);
        assert_eq!(orchestrator.available(OutputFormat::Docx), vec!["docx"]);
    }
}
