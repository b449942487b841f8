//! Structural DOCX output through docx-rs.

use std::sync::Arc;

use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Pic, Run, RunFonts, SpecialIndentType, Start,
    Table, TableCell, TableRow,
};
use image::GenericImageView;
use press_blocks::{Span, parse_spans};
use press_diagrams::{DiagramChain, DiagramImage, DiagramOutcome};

use super::{decorate, pack};
use crate::artifact::OutputFormat;
use crate::assembler::Assembler;
use crate::backend::DocumentBackend;
use crate::capabilities::BackendCapabilities;
use crate::error::DocumentError;
use crate::request::RenderRequest;
use crate::sink::{ElementSink, LayoutTable};

const BULLET_NUMBERING: usize = 1;
const BULLET_LEVELS: usize = 9;
const CODE_FONT: &str = "Courier New";
const CODE_SIZE: usize = 18;
const EMU_PER_PIXEL: u32 = 9525;
/// Six inches.
const MAX_IMAGE_WIDTH_EMU: u32 = 5_486_400;
const RULE: &str = "__________________________________________________";

fn runs(spans: &[Span]) -> impl Iterator<Item = Run> + '_ {
    spans.iter().map(|span| {
        let run = Run::new().add_text(span.text.as_str());
        if span.bold { run.bold() } else { run }
    })
}

fn span_paragraph(spans: &[Span]) -> Paragraph {
    runs(spans).fold(Paragraph::new(), Paragraph::add_run)
}

/// Image size in EMU, scaled down to at most six inches wide.
fn image_extent(width_px: u32, height_px: u32) -> (u32, u32) {
    let width = width_px.saturating_mul(EMU_PER_PIXEL);
    let height = height_px.saturating_mul(EMU_PER_PIXEL);
    if width <= MAX_IMAGE_WIDTH_EMU || width == 0 {
        return (width, height);
    }
    let scaled = u64::from(height) * u64::from(MAX_IMAGE_WIDTH_EMU) / u64::from(width);
    (MAX_IMAGE_WIDTH_EMU, u32::try_from(scaled).unwrap_or(u32::MAX))
}

fn image_paragraph(diagram: &DiagramImage) -> Result<Paragraph, DocumentError> {
    let decoded = image::load_from_memory(&diagram.bytes)
        .map_err(|e| DocumentError::Image(e.to_string()))?;
    let (width, height) = image_extent(decoded.width(), decoded.height());
    let pic = Pic::new(&diagram.bytes).size(width, height);
    Ok(Paragraph::new()
        .add_run(Run::new().add_image(pic))
        .align(AlignmentType::Center))
}

enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

/// Element sink collecting docx-rs paragraphs and tables.
///
/// Numbered-list runs each get their own numbering instance so that
/// numbering restarts at the first item's literal number.
pub struct DocxSink {
    marker: String,
    body: Vec<BodyElement>,
    /// `(numbering id, start)` per numbered-list run.
    numbered_lists: Vec<(usize, u32)>,
    in_numbered_list: bool,
}

impl DocxSink {
    #[must_use]
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_owned(),
            body: Vec::new(),
            numbered_lists: Vec::new(),
            in_numbered_list: false,
        }
    }

    fn push(&mut self, paragraph: Paragraph) {
        self.in_numbered_list = false;
        self.body.push(BodyElement::Paragraph(paragraph));
    }

    fn placeholder(&mut self, text: &str) {
        self.push(
            Paragraph::new()
                .add_run(Run::new().add_text(text).italic().color("808080"))
                .align(AlignmentType::Center),
        );
    }

    fn numbering(docx: Docx, id: usize, start: u32) -> Docx {
        let level = Level::new(
            0,
            Start::new(start as usize),
            NumberFormat::new("decimal"),
            LevelText::new("%1."),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None);
        docx.add_abstract_numbering(AbstractNumbering::new(id).add_level(level))
            .add_numbering(Numbering::new(id, id))
    }

    fn bullets(docx: Docx) -> Docx {
        let numbering = (0..BULLET_LEVELS).fold(
            AbstractNumbering::new(BULLET_NUMBERING),
            |numbering, depth| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let indent = 720 * (depth as i32 + 1);
                numbering.add_level(
                    Level::new(
                        depth,
                        Start::new(1),
                        NumberFormat::new("bullet"),
                        LevelText::new("•"),
                        LevelJc::new("left"),
                    )
                    .indent(Some(indent), Some(SpecialIndentType::Hanging(360)), None, None),
                )
            },
        );
        docx.add_abstract_numbering(numbering)
            .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
    }
}

impl ElementSink for DocxSink {
    fn heading(&mut self, level: u8, text: &str) {
        let style = format!("Heading{}", level.clamp(1, 4));
        self.push(span_paragraph(&parse_spans(text)).style(&style));
    }

    fn paragraph(&mut self, spans: &[Span]) {
        self.push(span_paragraph(spans));
    }

    fn bullet(&mut self, indent: usize, spans: &[Span]) {
        let depth = indent.min(BULLET_LEVELS - 1);
        self.push(
            span_paragraph(spans)
                .numbering(NumberingId::new(BULLET_NUMBERING), IndentLevel::new(depth)),
        );
    }

    fn numbered(&mut self, number: u32, spans: &[Span]) {
        if !self.in_numbered_list {
            // Ids after the bullet numbering.
            let id = BULLET_NUMBERING + 1 + self.numbered_lists.len();
            self.numbered_lists.push((id, number));
        }
        let id = self.numbered_lists.last().map_or(BULLET_NUMBERING + 1, |(id, _)| *id);
        self.push(span_paragraph(spans).numbering(NumberingId::new(id), IndentLevel::new(0)));
        self.in_numbered_list = true;
    }

    fn code_block(&mut self, _language: Option<&str>, text: &str) {
        let mut run = Run::new()
            .fonts(RunFonts::new().ascii(CODE_FONT).hi_ansi(CODE_FONT))
            .size(CODE_SIZE);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                run = run.add_break(BreakType::TextWrapping);
            }
            run = run.add_text(line);
        }
        self.push(Paragraph::new().add_run(run));
    }

    fn table(&mut self, table: &LayoutTable) {
        if table.column_count == 0 {
            return;
        }
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let cells = row
                    .cells
                    .iter()
                    .map(|cell| {
                        cell.lines.iter().fold(TableCell::new(), |docx_cell, line| {
                            let paragraph = runs(line).fold(Paragraph::new(), |p, run| {
                                p.add_run(if row.header { run.bold() } else { run })
                            });
                            docx_cell.add_paragraph(paragraph)
                        })
                    })
                    .collect();
                TableRow::new(cells)
            })
            .collect();
        self.in_numbered_list = false;
        self.body.push(BodyElement::Table(Table::new(rows)));
    }

    fn diagram(&mut self, outcome: &DiagramOutcome) {
        match outcome {
            DiagramOutcome::Image(diagram) => match image_paragraph(diagram) {
                Ok(paragraph) => self.push(paragraph),
                Err(e) => {
                    tracing::warn!(
                        method = diagram.method,
                        error = %e,
                        "Diagram image not embeddable"
                    );
                    self.placeholder("[Diagram image could not be embedded]");
                }
            },
            DiagramOutcome::Placeholder(text) => self.placeholder(text),
        }
    }

    fn rule(&mut self) {
        self.push(
            Paragraph::new()
                .add_run(Run::new().add_text(RULE).color("808080"))
                .align(AlignmentType::Center),
        );
    }

    /// Paragraph spacing already separates blocks.
    fn blank(&mut self) {}

    fn finish(self) -> Result<Vec<u8>, DocumentError> {
        let mut docx = Self::bullets(decorate(Docx::new(), &self.marker));
        for &(id, start) in &self.numbered_lists {
            docx = Self::numbering(docx, id, start);
        }
        for element in self.body {
            docx = match element {
                BodyElement::Paragraph(paragraph) => docx.add_paragraph(paragraph),
                BodyElement::Table(table) => docx.add_table(table),
            };
        }
        pack(docx)
    }
}

/// docx-rs backend; always available unless disabled.
pub struct DirectDocxBackend {
    assembler: Assembler,
    marker: String,
}

impl DirectDocxBackend {
    #[must_use]
    pub fn new(chain: Arc<DiagramChain>) -> Self {
        Self {
            assembler: Assembler::new(chain),
            marker: "Confidential".to_owned(),
        }
    }

    /// Header marker text.
    #[must_use]
    pub fn marker(mut self, marker: &str) -> Self {
        marker.clone_into(&mut self.marker);
        self
    }
}

impl DocumentBackend for DirectDocxBackend {
    fn name(&self) -> &'static str {
        "docx-rs"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn is_available(&self, capabilities: &BackendCapabilities) -> bool {
        capabilities.direct_docx
    }

    fn convert(&self, request: &RenderRequest) -> Result<Vec<u8>, DocumentError> {
        self.assembler.assemble(
            &request.markdown,
            &request.diagrams,
            DocxSink::new(&self.marker),
        )
    }
}
