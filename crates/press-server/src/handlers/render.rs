//! Document rendering endpoints.
//!
//! `POST /render/{pdf,docx}` take a JSON body through axum's extractor.
//! The `-raw` variants read the body as bytes and parse it themselves so
//! that malformed JSON is reported in the same error shape.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use press_document::{OutputFormat, RenderRequest};
use serde::Deserialize;

use crate::error::ServerError;
use crate::sanitize::{sanitize_css, sanitize_filename, sanitize_markdown};
use crate::state::AppState;

/// Request body shared by all rendering endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct RenderBody {
    markdown: Option<String>,
    filename: Option<String>,
    css: Option<String>,
}

impl RenderBody {
    /// Sanitised request. `allow_empty` permits an empty markdown string.
    fn into_request(self, allow_empty: bool) -> Result<RenderRequest, ServerError> {
        let markdown = self
            .markdown
            .filter(|m| allow_empty || !m.is_empty())
            .ok_or_else(|| ServerError::InvalidInput("markdown field is required".to_owned()))?;
        Ok(RenderRequest {
            markdown: sanitize_markdown(&markdown),
            filename: Some(sanitize_filename(self.filename.as_deref())),
            css: self.css.as_deref().map(sanitize_css),
            ..RenderRequest::default()
        })
    }
}

fn parse_raw(body: &[u8]) -> Result<RenderBody, ServerError> {
    serde_json::from_slice(body)
        .map_err(|e| ServerError::InvalidInput(format!("Invalid JSON: {e}")))
}

async fn render(
    state: &AppState,
    request: RenderRequest,
    format: OutputFormat,
) -> Result<Response, ServerError> {
    let pipeline = Arc::clone(&state.pipeline);
    let stem = request.filename.clone().unwrap_or_else(|| sanitize_filename(None));
    tracing::info!(%format, filename = %stem, bytes = request.markdown.len(), "Render request");

    let artifact = tokio::task::spawn_blocking(move || pipeline.render(&request, format))
        .await
        .map_err(|e| ServerError::Task(e.to_string()))??;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name(&stem));
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.into_bytes(),
    )
        .into_response())
}

async fn render_json(
    state: &AppState,
    body: Result<Json<RenderBody>, JsonRejection>,
    format: OutputFormat,
) -> Result<Response, ServerError> {
    let Json(body) = body.map_err(|e| ServerError::InvalidInput(e.body_text()))?;
    render(state, body.into_request(true)?, format).await
}

async fn render_raw(
    state: &AppState,
    body: &[u8],
    format: OutputFormat,
) -> Result<Response, ServerError> {
    let request = parse_raw(body)?.into_request(false)?;
    render(state, request, format).await
}

/// Handle `POST /render/pdf`.
pub(crate) async fn render_pdf(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RenderBody>, JsonRejection>,
) -> Result<Response, ServerError> {
    render_json(&state, body, OutputFormat::Pdf).await
}

/// Handle `POST /render/docx`.
pub(crate) async fn render_docx(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RenderBody>, JsonRejection>,
) -> Result<Response, ServerError> {
    render_json(&state, body, OutputFormat::Docx).await
}

/// Handle `POST /render/pdf-raw`.
pub(crate) async fn render_pdf_raw(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ServerError> {
    render_raw(&state, &body, OutputFormat::Pdf).await
}

/// Handle `POST /render/docx-raw`.
pub(crate) async fn render_docx_raw(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ServerError> {
    render_raw(&state, &body, OutputFormat::Docx).await
}
