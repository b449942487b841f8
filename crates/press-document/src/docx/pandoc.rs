//! Pandoc backend.

use std::fmt::Write as _;
use std::sync::Arc;

use press_blocks::{Fence, is_diagram_language};
use press_diagrams::{DiagramChain, DiagramMemo, DiagramOutcome};
use press_exec::{ExternalCommand, ScratchDir};

use super::template::reference_docx;
use crate::artifact::OutputFormat;
use crate::backend::DocumentBackend;
use crate::capabilities::BackendCapabilities;
use crate::error::DocumentError;
use crate::request::RenderRequest;

const INPUT_FILE: &str = "input.md";
const REFERENCE_FILE: &str = "reference.docx";
const OUTPUT_FILE: &str = "document.docx";

/// Piece of a markdown document split around diagram fences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FenceSegment {
    /// Source lines kept verbatim, newline-terminated.
    Text(String),
    /// Body of a `mermaid`/`mmd` fence.
    Diagram(String),
}

struct OpenFence<'a> {
    fence: Fence<'a>,
    diagram: bool,
    body: Vec<&'a str>,
}

/// Split `markdown` into verbatim text and diagram fence bodies.
///
/// Fences of other languages are kept as text, including any diagram
/// fence syntax they contain. An unclosed diagram fence runs to the end
/// of the document.
#[must_use]
pub fn split_diagram_fences(markdown: &str) -> Vec<FenceSegment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut open: Option<OpenFence<'_>> = None;

    for line in markdown.lines() {
        match open.as_mut() {
            Some(current) if current.fence.closed_by(line) => {
                if let Some(closed) = open.take() {
                    if closed.diagram {
                        if !text.is_empty() {
                            segments.push(FenceSegment::Text(std::mem::take(&mut text)));
                        }
                        segments.push(FenceSegment::Diagram(closed.body.join("\n")));
                    } else {
                        writeln!(text, "{line}").unwrap();
                    }
                }
            }
            Some(current) if current.diagram => current.body.push(line),
            Some(_) => writeln!(text, "{line}").unwrap(),
            None => match Fence::open(line) {
                Some(fence) => {
                    let diagram = fence.language().is_some_and(is_diagram_language);
                    if !diagram {
                        writeln!(text, "{line}").unwrap();
                    }
                    open = Some(OpenFence {
                        fence,
                        diagram,
                        body: Vec::new(),
                    });
                }
                None => writeln!(text, "{line}").unwrap(),
            },
        }
    }

    if let Some(fence) = open.filter(|f| f.diagram) {
        if !text.is_empty() {
            segments.push(FenceSegment::Text(std::mem::take(&mut text)));
        }
        segments.push(FenceSegment::Diagram(fence.body.join("\n")));
    }
    if !text.is_empty() {
        segments.push(FenceSegment::Text(text));
    }
    segments
}

/// Markdown converted by `pandoc` against a generated reference template.
pub struct PandocDocxBackend {
    command: String,
    chain: Arc<DiagramChain>,
    marker: String,
}

impl PandocDocxBackend {
    #[must_use]
    pub fn new(command: impl Into<String>, chain: Arc<DiagramChain>) -> Self {
        Self {
            command: command.into(),
            chain,
            marker: "Confidential".to_owned(),
        }
    }

    /// Header marker written into the reference template.
    #[must_use]
    pub fn marker(mut self, marker: &str) -> Self {
        marker.clone_into(&mut self.marker);
        self
    }

    /// Replace diagram fences with image references to files written into
    /// `scratch`, or with italic placeholder paragraphs.
    fn rewrite(
        &self,
        markdown: &str,
        diagrams: &DiagramMemo,
        scratch: &ScratchDir,
    ) -> Result<String, DocumentError> {
        let segments = split_diagram_fences(markdown);
        let sources: Vec<&str> = segments
            .iter()
            .filter_map(|segment| match segment {
                FenceSegment::Diagram(source) => Some(source.as_str()),
                FenceSegment::Text(_) => None,
            })
            .collect();
        let mut outcomes = diagrams
            .render_all(&self.chain, &sources)
            .into_iter()
            .enumerate();

        let mut output = String::with_capacity(markdown.len());
        for segment in &segments {
            match segment {
                FenceSegment::Text(text) => output.push_str(text),
                FenceSegment::Diagram(_) => match outcomes.next() {
                    Some((index, DiagramOutcome::Image(image))) => {
                        let name = format!("diagram-{index}.{}", image.format.extension());
                        scratch.write(&name, &image.bytes)?;
                        writeln!(output, "\n![Diagram]({name})\n").unwrap();
                    }
                    Some((_, DiagramOutcome::Placeholder(text))) => {
                        writeln!(output, "\n*{text}*\n").unwrap();
                    }
                    None => {}
                },
            }
        }
        Ok(output)
    }
}

impl DocumentBackend for PandocDocxBackend {
    fn name(&self) -> &'static str {
        "pandoc"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn is_available(&self, capabilities: &BackendCapabilities) -> bool {
        capabilities.pandoc
    }

    fn convert(&self, request: &RenderRequest) -> Result<Vec<u8>, DocumentError> {
        let scratch = ScratchDir::new("press-pandoc-")?;
        let markdown = self.rewrite(&request.markdown, &request.diagrams, &scratch)?;
        scratch.write(INPUT_FILE, markdown)?;

        let reference = reference_docx(&self.marker)
            .and_then(|bytes| scratch.write(REFERENCE_FILE, bytes).map_err(DocumentError::from));
        let mut command = ExternalCommand::new(&self.command).args([
            "--from",
            "markdown",
            "--to",
            "docx",
            "--standalone",
        ]);
        match reference {
            Ok(_) => command = command.arg(format!("--reference-doc={REFERENCE_FILE}")),
            Err(e) => {
                tracing::warn!(error = %e, "Reference template unavailable, using pandoc defaults");
            }
        }

        command
            .args(["--output", OUTPUT_FILE, INPUT_FILE])
            .current_dir(scratch.path())
            .run_checked()?;

        scratch.read(OUTPUT_FILE)?.ok_or_else(|| DocumentError::MissingOutput {
            program: self.command.clone(),
        })
    }
}
