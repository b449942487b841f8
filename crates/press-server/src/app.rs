//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Largest accepted request body.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::info::info))
        .route("/health", get(handlers::info::health))
        .route("/render/pdf", post(handlers::render::render_pdf))
        .route("/render/docx", post(handlers::render::render_docx))
        .route("/render/pdf-raw", post(handlers::render::render_pdf_raw))
        .route("/render/docx-raw", post(handlers::render::render_docx_raw))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(BODY_LIMIT))
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::no_store_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use press_config::Config;
    use press_document::Pipeline;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Router whose only usable backend is the built-in DOCX writer.
    fn router() -> Router {
        let mut config = Config::default();
        config.pdf.html_engine = "press-missing-weasyprint".to_owned();
        config.pdf.font_dir = "/nonexistent/press-fonts".into();
        config.docx.pandoc = "press-missing-pandoc".to_owned();
        config.diagrams.mmdc = "press-missing-mmdc".to_owned();
        config.diagrams.mermaid_ink_enabled = false;
        config.diagrams.kroki_enabled = false;
        create_router(Arc::new(AppState {
            pipeline: Arc::new(Pipeline::from_config(&config)),
            version: "0.0.0-test".to_owned(),
        }))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_render_docx() {
        let response = router()
            .oneshot(post_json(
                "/render/docx",
                r##"{"markdown": "# Title\n\n| A | B |\n|---|---|\n| 1 | 2 |\n", "filename": "re/port"}"##,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=\"report.docx\"");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_pdf_unavailable() {
        let response = router()
            .oneshot(post_json("/render/pdf", r##"{"markdown": "# Title"}"##))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "backend_unavailable");
    }

    #[tokio::test]
    async fn test_raw_rejects_invalid_json() {
        let response = router()
            .oneshot(post_json("/render/docx-raw", "{oops"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "invalid_input");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_raw_requires_markdown() {
        let response = router()
            .oneshot(post_json("/render/docx-raw", r#"{"markdown": ""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "markdown field is required");
    }

    #[tokio::test]
    async fn test_json_endpoint_rejects_wrong_type() {
        let response = router()
            .oneshot(post_json("/render/docx", r#"{"markdown": 3}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_health_reports_capabilities() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["features"]["pdf_rendering"], false);
        assert_eq!(body["features"]["direct_docx"], true);
        assert_eq!(body["backends"]["docx"], serde_json::json!(["docx-rs"]));
    }

    #[tokio::test]
    async fn test_info() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["version"], "0.0.0-test");
        assert!(body["endpoints"]["POST /render/pdf-raw"].is_string());
    }
}
