//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use press_document::RenderError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Request body is not a valid render request.
    #[error("{0}")]
    InvalidInput(String),

    /// No backend could produce the document.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Blocking render task panicked or was cancelled.
    #[error("rendering task failed: {0}")]
    Task(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Render(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Render(e) => e.kind(),
            Self::Task(_) => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, kind = self.kind(), "Render request failed");
        }
        let body = json!({"error": self.to_string(), "kind": self.kind()});
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_document::OutputFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServerError::InvalidInput("x".to_owned()).status(), StatusCode::BAD_REQUEST);
        let unavailable = ServerError::Render(RenderError::Unavailable {
            format: OutputFormat::Pdf,
        });
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.kind(), "backend_unavailable");
        let exhausted = ServerError::Render(RenderError::Exhausted {
            format: OutputFormat::Docx,
            attempts: Vec::new(),
        });
        assert_eq!(exhausted.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(exhausted.kind(), "conversion_failed");
        assert_eq!(
            ServerError::Task("join".to_owned()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
