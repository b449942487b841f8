//! Press CLI - markdown to paginated documents.
//!
//! Provides commands for:
//! - `serve`: Start the HTTP rendering service
//! - `render`: Convert a markdown file to PDF and/or DOCX
//! - `backends`: Show which backends and diagram methods are usable

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BackendsArgs, RenderArgs, ServeArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Press - markdown to PDF and DOCX.
#[derive(Parser)]
#[command(name = "press", version, about)]
struct Cli {
    /// Log backend selection and fallbacks (INFO level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP rendering service.
    Serve(ServeArgs),
    /// Render a markdown file.
    Render(RenderArgs),
    /// Show detected backends.
    Backends(BackendsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(args.execute(VERSION)),
            Err(e) => Err(e.into()),
        },
        Commands::Render(args) => args.execute(),
        Commands::Backends(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
