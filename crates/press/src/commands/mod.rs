//! CLI command implementations.

pub(crate) mod backends;
pub(crate) mod render;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use press_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use backends::BackendsArgs;
pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;

/// Configuration options shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover press.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with the TrueType fonts for the built-in PDF writer (overrides config).
    #[arg(long, env = "PRESS_FONT_DIR")]
    font_dir: Option<PathBuf>,

    /// mermaid.ink base URL (overrides config).
    #[arg(long)]
    mermaid_ink_url: Option<String>,

    /// Kroki base URL (overrides config).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Never contact remote diagram services.
    #[arg(long)]
    offline: bool,
}

impl ConfigArgs {
    /// Load configuration with `host`/`port` overrides applied.
    pub(crate) fn load(self, host: Option<String>, port: Option<u16>) -> Result<Config, CliError> {
        let settings = CliSettings {
            host,
            port,
            font_dir: self.font_dir,
            mermaid_ink_url: self.mermaid_ink_url,
            kroki_url: self.kroki_url,
            offline: self.offline.then_some(true),
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}
