//! Mermaid diagram rendering for Press documents.
//!
//! A [`DiagramChain`] tries each configured [`DiagramMethod`] in order and
//! returns the first image produced, or a textual placeholder naming the
//! diagram type when every method fails. Rendering never returns an error.
//!
//! # Methods
//!
//! - [`CliRenderer`]: local `mmdc` process with a deadline
//! - [`MermaidInk`]: `GET {base}/img/{base64(source)}`
//! - [`Kroki`]: `GET {base}/mermaid/png/{base64url(zlib(source))}`
//!
//! [`DiagramMemo`] keeps the outcomes of one request so that fallback
//! backends reuse them.
//!
//! # Example
//!
//! ```
//! use press_diagrams::{DiagramChain, DiagramOutcome};
//!
//! // No methods configured: always the placeholder.
//! let chain = DiagramChain::new();
//! let DiagramOutcome::Placeholder(text) = chain.render("sequenceDiagram\nA->>B: hi") else {
//!     unreachable!()
//! };
//! assert_eq!(text, "[Sequence Diagram - Mermaid diagram rendering not available]");
//! ```

mod chain;
mod cli;
mod consts;
mod format;
mod kind;
mod memo;
mod service;

pub use chain::{DiagramChain, DiagramImage, DiagramOutcome};
pub use cli::CliRenderer;
pub use consts::{CLI_TIMEOUT, SERVICE_TIMEOUT};
pub use format::{ImageFormat, png_dimensions};
pub use kind::{DiagramKind, placeholder_text};
pub use memo::DiagramMemo;
pub use service::{Kroki, MermaidInk, create_agent, kroki_encode};

use press_exec::ExecError;

/// Failure of a single rendering method.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Subprocess or scratch file failure.
    #[error(transparent)]
    Exec(#[from] ExecError),
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Service answered with a non-200 status.
    #[error("HTTP {status}")]
    Status { status: u16 },
    /// Method finished without producing bytes.
    #[error("no image produced")]
    EmptyOutput,
    /// Bytes produced are not a PNG or JPEG image.
    #[error("output is not a recognized image")]
    UnrecognizedImage,
    /// Source could not be encoded for the request.
    #[error("encoding failed: {0}")]
    Encode(String),
}

/// One way of turning diagram source into image bytes.
pub trait DiagramMethod: Send + Sync {
    /// Short method name for logs.
    fn name(&self) -> &'static str;

    /// Render `source`, returning the raw image bytes.
    fn attempt(&self, source: &str) -> Result<Vec<u8>, DiagramError>;
}

#[cfg(test)]
pub(crate) mod testing {
    /// PNG signature plus an IHDR chunk header carrying the given dimensions.
    pub(crate) fn tiny_png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        data.extend_from_slice(&[0, 0, 0, 13]);
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data
    }
}
