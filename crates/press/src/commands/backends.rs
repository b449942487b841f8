//! `press backends` command implementation.

use clap::Args;
use press_document::{OutputFormat, Pipeline};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the backends command.
#[derive(Args)]
pub(crate) struct BackendsArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl BackendsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(None, None)?;
        let pipeline = Pipeline::from_config(&config);

        output.highlight("Capabilities");
        for (name, enabled) in pipeline.capabilities().flags() {
            output.flag(name, enabled);
        }

        output.highlight("Backends (in priority order)");
        for format in OutputFormat::ALL {
            let backends = pipeline.available(format);
            if backends.is_empty() {
                output.warning(&format!("  {format}: none"));
            } else {
                output.info(&format!("  {format}: {}", backends.join(" -> ")));
            }
        }
        Ok(())
    }
}
