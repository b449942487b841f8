//! Service information and health endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use press_document::OutputFormat;
use serde_json::{Map, Value, json};

use crate::state::AppState;

fn features(state: &AppState) -> Value {
    let capabilities = state.pipeline.capabilities();
    let mut features = Map::new();
    features.insert("pdf_rendering".to_owned(), capabilities.any_pdf().into());
    features.insert("docx_rendering".to_owned(), capabilities.any_docx().into());
    for (name, enabled) in capabilities.flags() {
        features.insert(name.to_owned(), enabled.into());
    }
    Value::Object(features)
}

/// Handle `GET /health`.
pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "features": features(&state),
        "backends": {
            "pdf": state.pipeline.available(OutputFormat::Pdf),
            "docx": state.pipeline.available(OutputFormat::Docx),
        },
    }))
}

/// Handle `GET /`.
pub(crate) async fn info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Press markdown render service",
        "version": state.version,
        "endpoints": {
            "POST /render/pdf": "Convert markdown to PDF",
            "POST /render/pdf-raw": "Convert markdown to PDF from a raw JSON body",
            "POST /render/docx": "Convert markdown to DOCX",
            "POST /render/docx-raw": "Convert markdown to DOCX from a raw JSON body",
            "GET /health": "Health check",
        },
        "request_format": {
            "markdown": "string (required)",
            "filename": "string (optional, defaults to 'document')",
            "css": "string (optional, extra CSS for the HTML PDF engine)",
        },
        "features": features(&state),
    }))
}
