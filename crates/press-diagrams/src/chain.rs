//! Ordered fallback over diagram methods.

use rayon::prelude::*;

use crate::format::ImageFormat;
use crate::kind::placeholder_text;
use crate::{DiagramError, DiagramMethod};

/// Image produced by one of the chain's methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramImage {
    /// Raw image bytes, validated against [`ImageFormat::sniff`].
    pub bytes: Vec<u8>,
    /// Name of the method that produced the image.
    pub method: &'static str,
    pub format: ImageFormat,
}

/// Result of rendering one diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagramOutcome {
    Image(DiagramImage),
    /// Every method failed; carries the placeholder text.
    Placeholder(String),
}

impl DiagramOutcome {
    /// Image bytes when rendering succeeded.
    #[must_use]
    pub fn image(&self) -> Option<&DiagramImage> {
        match self {
            Self::Image(image) => Some(image),
            Self::Placeholder(_) => None,
        }
    }
}

/// Diagram methods tried in insertion order.
#[derive(Default)]
pub struct DiagramChain {
    methods: Vec<Box<dyn DiagramMethod>>,
}

impl DiagramChain {
    /// Create an empty chain. An empty chain always yields placeholders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a method to the end of the chain.
    #[must_use]
    pub fn with_method(mut self, method: impl DiagramMethod + 'static) -> Self {
        self.methods.push(Box::new(method));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Method names in the order they are tried.
    #[must_use]
    pub fn method_names(&self) -> Vec<&'static str> {
        self.methods.iter().map(|m| m.name()).collect()
    }

    /// Render one diagram, falling back to a placeholder.
    pub fn render(&self, source: &str) -> DiagramOutcome {
        for method in &self.methods {
            match attempt_validated(method.as_ref(), source) {
                Ok(image) => {
                    tracing::info!(
                        method = image.method,
                        bytes = image.bytes.len(),
                        "Rendered diagram"
                    );
                    return DiagramOutcome::Image(image);
                }
                Err(e) => {
                    tracing::warn!(method = method.name(), error = %e, "Diagram method failed");
                }
            }
        }

        let placeholder = placeholder_text(source);
        tracing::warn!(%placeholder, "All diagram methods failed, using placeholder");
        DiagramOutcome::Placeholder(placeholder)
    }

    /// Render many diagrams in parallel, preserving input order.
    pub fn render_all<S: AsRef<str> + Sync>(&self, sources: &[S]) -> Vec<DiagramOutcome> {
        sources
            .par_iter()
            .map(|source| self.render(source.as_ref()))
            .collect()
    }
}

fn attempt_validated(
    method: &dyn DiagramMethod,
    source: &str,
) -> Result<DiagramImage, DiagramError> {
    let bytes = method.attempt(source)?;
    if bytes.is_empty() {
        return Err(DiagramError::EmptyOutput);
    }
    let format = ImageFormat::sniff(&bytes).ok_or(DiagramError::UnrecognizedImage)?;
    Ok(DiagramImage {
        bytes,
        method: method.name(),
        format,
    })
}
