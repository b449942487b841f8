//! Configured rendering pipeline.

use std::sync::Arc;

use press_config::Config;
use press_diagrams::{CliRenderer, DiagramChain, Kroki, MermaidInk};

use crate::artifact::{OutputFormat, RenderArtifact};
use crate::capabilities::BackendCapabilities;
use crate::docx::{DirectDocxBackend, PandocDocxBackend};
use crate::error::RenderError;
use crate::orchestrator::Orchestrator;
use crate::pdf::{DirectPdfBackend, HtmlPdfBackend, PdfFonts};
use crate::request::RenderRequest;

/// Build the diagram chain allowed by `capabilities`.
///
/// Methods are tried as CLI, mermaid.ink, then Kroki.
#[must_use]
pub fn build_diagram_chain(config: &Config, capabilities: &BackendCapabilities) -> DiagramChain {
    let diagrams = &config.diagrams;
    let mut chain = DiagramChain::new();

    if capabilities.diagram_cli {
        chain = chain.with_method(
            CliRenderer::new(&diagrams.mmdc)
                .timeout(diagrams.cli_timeout())
                .size(diagrams.width, diagrams.height)
                .background(&diagrams.background),
        );
    }
    if capabilities.diagram_service_primary {
        chain = chain.with_method(
            MermaidInk::new(&diagrams.mermaid_ink_url).timeout(diagrams.service_timeout()),
        );
    }
    if capabilities.diagram_service_secondary {
        chain = chain
            .with_method(Kroki::new(&diagrams.kroki_url).timeout(diagrams.service_timeout()));
    }

    tracing::debug!(methods = ?chain.method_names(), "Diagram chain ready");
    chain
}

/// Capabilities, diagram chain and backends for both formats.
pub struct Pipeline {
    orchestrator: Orchestrator,
}

impl Pipeline {
    /// Wrap a ready orchestrator.
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Detect capabilities and register every backend in priority order.
    ///
    /// PDF: HTML engine, then genpdf. DOCX: pandoc, then docx-rs.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let fonts = match PdfFonts::load(
            &config.pdf.font_dir,
            &config.pdf.font_family,
            &config.pdf.code_font_family,
        ) {
            Ok(fonts) => Some(Arc::new(fonts)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    dir = %config.pdf.font_dir.display(),
                    "Direct PDF fonts unavailable"
                );
                None
            }
        };

        let capabilities = Arc::new(BackendCapabilities::detect(config, fonts.is_some()));
        let chain = Arc::new(build_diagram_chain(config, &capabilities));

        let orchestrator = Orchestrator::new(Arc::clone(&capabilities))
            .with_backend(
                HtmlPdfBackend::new(&config.pdf.html_engine, Arc::clone(&chain))
                    .marker(&config.pdf.marker),
            )
            .with_backend(
                DirectPdfBackend::new(fonts, Arc::clone(&chain)).marker(&config.pdf.marker),
            )
            .with_backend(
                PandocDocxBackend::new(&config.docx.pandoc, Arc::clone(&chain))
                    .marker(&config.docx.marker),
            )
            .with_backend(DirectDocxBackend::new(chain).marker(&config.docx.marker));

        Self::new(orchestrator)
    }

    #[must_use]
    pub fn capabilities(&self) -> &BackendCapabilities {
        self.orchestrator.capabilities()
    }

    /// Backend names that may run for `format`, in priority order.
    #[must_use]
    pub fn available(&self, format: OutputFormat) -> Vec<&'static str> {
        self.orchestrator.available(format)
    }

    /// Render one format.
    pub fn render(
        &self,
        request: &RenderRequest,
        format: OutputFormat,
    ) -> Result<RenderArtifact, RenderError> {
        self.orchestrator.render(request, format)
    }

    /// Render each of `formats` independently.
    ///
    /// A failure for one format does not affect the others.
    #[must_use]
    pub fn render_all(
        &self,
        request: &RenderRequest,
        formats: &[OutputFormat],
    ) -> Vec<(OutputFormat, Result<RenderArtifact, RenderError>)> {
        formats
            .iter()
            .map(|&format| (format, self.render(request, format)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{DocumentChild, Table, TableCellContent, TableChild, TableRowChild};
    use press_diagrams::{DiagramError, DiagramMethod};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPng(Arc<AtomicUsize>);

    impl DiagramMethod for CountingPng {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn attempt(&self, _source: &str) -> Result<Vec<u8>, DiagramError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(b"\x89PNG\r\n\x1a\nnot decodable".to_vec())
        }
    }

    fn cell_texts(table: &Table) -> Vec<Vec<String>> {
        table
            .rows
            .iter()
            .map(|TableChild::TableRow(row)| {
                row.cells
                    .iter()
                    .map(|TableRowChild::TableCell(cell)| {
                        cell.children
                            .iter()
                            .filter_map(|content| match content {
                                TableCellContent::Paragraph(p) => Some(p.raw_text()),
                                _ => None,
                            })
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .collect()
            })
            .collect()
    }

    /// Styled headings as (style, text) and the cell text of every table.
    fn docx_structure(bytes: &[u8]) -> (Vec<(String, String)>, Vec<Vec<Vec<String>>>) {
        let docx = docx_rs::read_docx(bytes).unwrap();
        let mut headings = Vec::new();
        let mut tables = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let heading =
                        p.property.style.as_ref().filter(|s| s.val.starts_with("Heading"));
                    if let Some(style) = heading {
                        headings.push((style.val.clone(), p.raw_text()));
                    }
                }
                DocumentChild::Table(table) => tables.push(cell_texts(table)),
                _ => {}
            }
        }
        (headings, tables)
    }

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.pdf.html_engine = "press-missing-weasyprint".to_owned();
        config.pdf.font_dir = "/nonexistent/press-fonts".into();
        config.docx.pandoc = "press-missing-pandoc".to_owned();
        config.diagrams.mmdc = "press-missing-mmdc".to_owned();
        config.diagrams.mermaid_ink_enabled = false;
        config.diagrams.kroki_enabled = false;
        config
    }

    #[test]
    fn test_chain_follows_capabilities() {
        let config = Config::default();
        let capabilities = BackendCapabilities {
            diagram_cli: true,
            diagram_service_secondary: true,
            ..BackendCapabilities::default()
        };
        assert_eq!(
            build_diagram_chain(&config, &capabilities).method_names(),
            vec!["mmdc", "kroki"]
        );
        assert!(build_diagram_chain(&config, &BackendCapabilities::default()).is_empty());
    }

    #[test]
    fn test_offline_pipeline_uses_direct_docx() {
        let pipeline = Pipeline::from_config(&offline_config());
        assert!(pipeline.available(OutputFormat::Pdf).is_empty());
        assert_eq!(pipeline.available(OutputFormat::Docx), vec!["docx-rs"]);

        let request = RenderRequest::new("# Title\n\n| A | B |\n|---|---|\n| 1 | 2 |\n");
        let results = pipeline.render_all(&request, &OutputFormat::ALL);

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], (OutputFormat::Pdf, Err(RenderError::Unavailable { .. }))));
        let (format, docx) = &results[1];
        assert_eq!(*format, OutputFormat::Docx);
        let artifact = docx.as_ref().unwrap();
        assert_eq!(artifact.backend(), "docx-rs");
        assert!(artifact.bytes().starts_with(b"PK"));

        let (headings, tables) = docx_structure(artifact.bytes());
        assert_eq!(headings, vec![("Heading1".to_owned(), "Title".to_owned())]);
        assert_eq!(
            tables,
            vec![vec![
                vec!["A".to_owned(), "B".to_owned()],
                vec!["1".to_owned(), "2".to_owned()],
            ]]
        );
    }

    #[test]
    fn test_fallback_reuses_rendered_diagrams() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = Arc::new(DiagramChain::new().with_method(CountingPng(Arc::clone(&calls))));
        let capabilities = BackendCapabilities {
            pandoc: true,
            direct_docx: true,
            ..BackendCapabilities::default()
        };
        let orchestrator = Orchestrator::new(Arc::new(capabilities))
            .with_backend(PandocDocxBackend::new("press-missing-pandoc", Arc::clone(&chain)))
            .with_backend(DirectDocxBackend::new(chain));
        let pipeline = Pipeline::new(orchestrator);

        let request = RenderRequest::new("```mermaid\ngraph TD\n```\n\n```mermaid\npie\n```\n");
        let artifact = pipeline.render(&request, OutputFormat::Docx).unwrap();

        assert_eq!(artifact.backend(), "docx-rs");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(request.diagrams.len(), 2);
    }
}
