//! Application state.

use std::sync::Arc;

use press_document::Pipeline;

/// State shared by all handlers.
pub(crate) struct AppState {
    /// Configured rendering pipeline; read-only after startup.
    pub(crate) pipeline: Arc<Pipeline>,
    /// Service version reported by `GET /`.
    pub(crate) version: String,
}
