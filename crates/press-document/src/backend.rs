//! Document backend trait.

use crate::artifact::OutputFormat;
use crate::capabilities::BackendCapabilities;
use crate::error::DocumentError;
use crate::request::RenderRequest;

/// One way of producing a document of a fixed format.
pub trait DocumentBackend: Send + Sync {
    /// Short name for logs and failure reports.
    fn name(&self) -> &'static str;

    fn format(&self) -> OutputFormat;

    /// Whether the capability record allows this backend to run.
    fn is_available(&self, capabilities: &BackendCapabilities) -> bool;

    /// Convert the request to raw document bytes.
    ///
    /// The orchestrator validates the bytes; backends need not.
    fn convert(&self, request: &RenderRequest) -> Result<Vec<u8>, DocumentError>;
}
