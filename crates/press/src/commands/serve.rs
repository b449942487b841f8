//! `press serve` command implementation.

use std::sync::Arc;

use clap::Args;
use press_document::{OutputFormat, Pipeline};
use press_server::{ServerConfig, run_server};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Detect backends and run the server until Ctrl-C.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(self.host, self.port)?;

        let pipeline = Arc::new(Pipeline::from_config(&config));
        for format in OutputFormat::ALL {
            let backends = pipeline.available(format);
            if backends.is_empty() {
                output.warning(&format!("{format}: no backend available"));
            } else {
                output.info(&format!("{format} backends: {}", backends.join(", ")));
            }
        }
        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));

        run_server(ServerConfig::from_config(&config, version.to_owned()), pipeline)
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}
