//! HTTP service for Press document rendering.
//!
//! Routes:
//!
//! - `POST /render/pdf`, `POST /render/docx`: JSON `{markdown, filename?, css?}`
//! - `POST /render/pdf-raw`, `POST /render/docx-raw`: same body read as raw
//!   bytes, with JSON errors for malformed input
//! - `GET /health`: status and capability flags
//! - `GET /`: service description
//!
//! Successful renders answer with the document bytes and
//! `Content-Disposition: attachment`. Failures answer with
//! `{"error": ..., "kind": ...}`: 400 for invalid input, 503 when no backend
//! could produce the document, 500 otherwise.
//!
//! Rendering is blocking and runs on tokio's blocking pool.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use press_document::Pipeline;
//! use press_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = press_config::Config::default();
//!     let pipeline = Arc::new(Pipeline::from_config(&config));
//!     run_server(ServerConfig::from_config(&config, "1.0.0".to_owned()), pipeline)
//!         .await
//!         .unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod sanitize;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use press_document::Pipeline;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Version reported by `GET /`.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            version: String::new(),
        }
    }
}

impl ServerConfig {
    /// Take host and port from the `[server]` section.
    #[must_use]
    pub fn from_config(config: &press_config::Config, version: String) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            version,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn run_server(
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        pipeline,
        version: config.version.clone(),
    });
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
