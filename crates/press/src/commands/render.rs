//! `press render` command implementation.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use press_document::{OutputFormat, Pipeline, RenderArtifact, RenderRequest};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Formats selectable on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormatArg {
    #[default]
    Pdf,
    Docx,
    All,
}

impl FormatArg {
    fn formats(self) -> &'static [OutputFormat] {
        match self {
            Self::Pdf => &[OutputFormat::Pdf],
            Self::Docx => &[OutputFormat::Docx],
            Self::All => &OutputFormat::ALL,
        }
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    format: FormatArg,

    /// Directory for the rendered files (default: next to the input).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output file stem (default: input file stem).
    #[arg(short, long)]
    name: Option<String>,

    /// Extra CSS file for the HTML PDF engine.
    #[arg(long)]
    css: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

/// File stem from `--name` or the input file name.
fn output_stem(name: Option<&str>, input: &Path) -> String {
    name.map(str::to_owned)
        .or_else(|| input.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_owned())
}

fn write_artifact(artifact: &RenderArtifact, dir: &Path, stem: &str) -> Result<PathBuf, CliError> {
    let path = dir.join(artifact.file_name(stem));
    std::fs::write(&path, artifact.bytes()).map_err(CliError::file(&path))?;
    Ok(path)
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let markdown = std::fs::read_to_string(&self.input).map_err(CliError::file(&self.input))?;
        let css = self
            .css
            .as_deref()
            .map(|path| std::fs::read_to_string(path).map_err(CliError::file(path)))
            .transpose()?;
        let stem = output_stem(self.name.as_deref(), &self.input);
        let dir = self
            .output_dir
            .clone()
            .or_else(|| self.input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&dir).map_err(CliError::file(&dir))?;
        }

        let config = self.config.load(None, None)?;
        let pipeline = Pipeline::from_config(&config);
        let request = RenderRequest {
            markdown,
            filename: Some(stem.clone()),
            css,
            ..RenderRequest::default()
        };

        let mut failed = Vec::new();
        for (format, result) in pipeline.render_all(&request, self.format.formats()) {
            match result {
                Ok(artifact) => {
                    let path = write_artifact(&artifact, &dir, &stem)?;
                    output.success(&format!(
                        "{format}: {} (via {})",
                        path.display(),
                        artifact.backend()
                    ));
                }
                Err(e) => {
                    output.error(&format!("{format}: {e}"));
                    failed.push(format.to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(CliError::Render(failed.join(", ")))
        }
    }
}
