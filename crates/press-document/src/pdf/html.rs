//! HTML/CSS engine backend.

use std::sync::Arc;

use press_diagrams::DiagramChain;
use press_exec::{ExternalCommand, ScratchDir};
use press_renderer::{DiagramProcessor, HtmlDocument, HtmlRenderer};

use crate::artifact::OutputFormat;
use crate::backend::DocumentBackend;
use crate::capabilities::BackendCapabilities;
use crate::error::DocumentError;
use crate::request::RenderRequest;

const INPUT_FILE: &str = "document.html";
const OUTPUT_FILE: &str = "document.pdf";

/// Styled HTML converted by an external engine (`weasyprint` by default).
pub struct HtmlPdfBackend {
    command: String,
    chain: Arc<DiagramChain>,
    marker: Option<String>,
}

impl HtmlPdfBackend {
    #[must_use]
    pub fn new(command: impl Into<String>, chain: Arc<DiagramChain>) -> Self {
        Self {
            command: command.into(),
            chain,
            marker: None,
        }
    }

    /// Text placed at the top centre of every page.
    #[must_use]
    pub fn marker(mut self, marker: &str) -> Self {
        self.marker = Some(marker.to_owned()).filter(|m| !m.is_empty());
        self
    }

    /// Full HTML document for `request`.
    #[must_use]
    pub fn html(&self, request: &RenderRequest) -> String {
        let diagrams = DiagramProcessor::new(Arc::clone(&self.chain)).with_memo(&request.diagrams);
        let mut renderer = HtmlRenderer::new().with_processor(diagrams);
        let result = renderer.render(&request.markdown);
        let title = result.title.unwrap_or_else(|| request.title());

        HtmlDocument::new(&result.html)
            .title(Some(&title))
            .user_css(request.css.as_deref())
            .marker(self.marker.as_deref())
            .render()
    }
}

impl DocumentBackend for HtmlPdfBackend {
    fn name(&self) -> &'static str {
        "weasyprint"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn is_available(&self, capabilities: &BackendCapabilities) -> bool {
        capabilities.html_pdf_engine
    }

    fn convert(&self, request: &RenderRequest) -> Result<Vec<u8>, DocumentError> {
        let scratch = ScratchDir::new("press-html-")?;
        scratch.write(INPUT_FILE, self.html(request))?;

        ExternalCommand::new(&self.command)
            .args([INPUT_FILE, OUTPUT_FILE])
            .current_dir(scratch.path())
            .run_checked()?;

        scratch.read(OUTPUT_FILE)?.ok_or_else(|| DocumentError::MissingOutput {
            program: self.command.clone(),
        })
    }
}
