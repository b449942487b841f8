//! Structural PDF output through genpdf.

use std::sync::Arc;

use genpdf::elements::{Break, FrameCellDecorator, Image, LinearLayout, Paragraph, TableLayout};
use genpdf::fonts::{Font, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Document, Element, Margins, PaperSize};
use image::{DynamicImage, GenericImageView};
use press_blocks::{ColumnWidthPlan, Span, available_page_width, parse_spans};
use press_diagrams::{DiagramChain, DiagramImage, DiagramOutcome};

use super::decorator::ConfidentialPageDecorator;
use super::{PdfFonts, pt};
use crate::artifact::OutputFormat;
use crate::assembler::Assembler;
use crate::backend::DocumentBackend;
use crate::capabilities::BackendCapabilities;
use crate::error::DocumentError;
use crate::request::RenderRequest;
use crate::sink::{ElementSink, LayoutTable};

const BODY_FONT_SIZE: u8 = 10;
const BODY_LINE_SPACING: f64 = 1.4;
const CODE_FONT_SIZE: u8 = 8;
const BULLET_INDENT_PT: f64 = 20.0;
const MAX_IMAGE_WIDTH_PT: f64 = 450.0;
const RULE_WIDTH: usize = 80;

/// Font size and trailing space (in lines) for heading levels 1 to 4.
fn heading_style(level: u8) -> (u8, f64) {
    match level {
        1 => (18, 0.6),
        2 => (14, 0.5),
        3 => (12, 0.4),
        _ => (11, 0.3),
    }
}

fn styled_paragraph(spans: &[Span], style: Style) -> Paragraph {
    prefixed_paragraph("", spans, style)
}

fn prefixed_paragraph(prefix: &str, spans: &[Span], style: Style) -> Paragraph {
    let mut paragraph = Paragraph::default();
    if !prefix.is_empty() {
        paragraph.push_styled(prefix.to_owned(), style);
    }
    for span in spans {
        let span_style = if span.bold { style.bold() } else { style };
        paragraph.push_styled(span.text.clone(), span_style);
    }
    paragraph
}

/// DPI at which `image` is drawn no wider than [`MAX_IMAGE_WIDTH_PT`].
///
/// One pixel is one point until the limit is reached.
fn image_dpi(width_px: u32) -> f64 {
    let width = f64::from(width_px);
    if width > MAX_IMAGE_WIDTH_PT {
        width * 72.0 / MAX_IMAGE_WIDTH_PT
    } else {
        72.0
    }
}

/// Column weights and right padding for a table drawn at `plan` widths.
///
/// genpdf spreads weights over the full content width, so the table is
/// narrowed by the width the plan leaves unused. Weights are in hundredths
/// of a point.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn table_geometry(plan: &ColumnWidthPlan) -> (Vec<usize>, f64) {
    let weights = plan
        .widths()
        .iter()
        .map(|w| ((w * 100.0).round() as usize).max(1))
        .collect();
    let slack = f64::from(plan.available_width() - plan.total_width()).max(0.0);
    (weights, slack)
}

fn diagram_image(diagram: &DiagramImage) -> Result<Image, DocumentError> {
    let decoded = image::load_from_memory(&diagram.bytes)
        .map_err(|e| DocumentError::Image(e.to_string()))?;
    let dpi = image_dpi(decoded.width());
    // genpdf rejects alpha channels.
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    Ok(Image::from_dynamic_image(rgb)?
        .with_dpi(dpi)
        .with_alignment(Alignment::Center))
}

/// Element sink building a genpdf document.
pub struct PdfSink {
    doc: Document,
    code_font: FontFamily<Font>,
    body: Style,
}

impl PdfSink {
    /// A4 document titled `title` with the page decorator installed.
    #[must_use]
    pub fn new(fonts: &PdfFonts, title: &str, marker: &str) -> Self {
        let mut doc = Document::new(fonts.body.clone());
        let code_font = doc.add_font_family(fonts.code.clone());
        doc.set_title(title);
        doc.set_paper_size(PaperSize::A4);
        doc.set_font_size(BODY_FONT_SIZE);
        doc.set_line_spacing(BODY_LINE_SPACING);
        doc.set_page_decorator(ConfidentialPageDecorator::new(marker));

        Self {
            doc,
            code_font,
            body: Style::new().with_font_size(BODY_FONT_SIZE),
        }
    }

    fn code_style(&self) -> Style {
        Style::new()
            .with_font_family(self.code_font)
            .with_font_size(CODE_FONT_SIZE)
    }

    fn placeholder(&mut self, text: &str) {
        let style = self.body.italic().with_color(Color::Greyscale(100));
        self.doc
            .push(
                Paragraph::new(StyledString::new(text.to_owned(), style))
                    .aligned(Alignment::Center),
            );
        self.doc.push(Break::new(1.0));
    }
}

impl ElementSink for PdfSink {
    fn available_width(&self) -> Option<f32> {
        Some(available_page_width())
    }

    fn heading(&mut self, level: u8, text: &str) {
        let (size, after) = heading_style(level);
        let style = self.body.with_font_size(size).bold();
        self.doc.push(styled_paragraph(&parse_spans(text), style));
        self.doc.push(Break::new(after));
    }

    fn paragraph(&mut self, spans: &[Span]) {
        self.doc.push(styled_paragraph(spans, self.body));
    }

    #[allow(clippy::cast_precision_loss)]
    fn bullet(&mut self, indent: usize, spans: &[Span]) {
        let left = BULLET_INDENT_PT * (indent as f64 + 1.0);
        let paragraph = prefixed_paragraph("• ", spans, self.body);
        self.doc.push(paragraph.padded(Margins::trbl(pt(0.0), pt(0.0), pt(0.0), pt(left))));
    }

    fn numbered(&mut self, number: u32, spans: &[Span]) {
        let paragraph = prefixed_paragraph(&format!("{number}. "), spans, self.body);
        self.doc
            .push(paragraph.padded(Margins::trbl(pt(0.0), pt(0.0), pt(0.0), pt(BULLET_INDENT_PT))));
    }

    fn code_block(&mut self, _language: Option<&str>, text: &str) {
        let style = self.code_style();
        let mut lines = LinearLayout::vertical();
        for line in text.split('\n') {
            // Empty paragraphs have no height.
            let line = if line.is_empty() { " " } else { line };
            lines.push(Paragraph::new(StyledString::new(line.to_owned(), style)));
        }

        let mut frame = TableLayout::new(vec![1]);
        frame.set_cell_decorator(FrameCellDecorator::new(false, true, false));
        let pushed = frame
            .row()
            .element(lines.padded(Margins::trbl(pt(4.0), pt(6.0), pt(4.0), pt(6.0))))
            .push();
        match pushed {
            Ok(()) => {
                self.doc.push(frame);
                self.doc.push(Break::new(0.5));
            }
            Err(e) => tracing::warn!(error = %e, "Skipping code block"),
        }
    }

    fn table(&mut self, table: &LayoutTable) {
        if table.column_count == 0 {
            return;
        }
        let (weights, slack) = match &table.widths {
            Some(plan) => table_geometry(plan),
            None => (vec![1; table.column_count], 0.0),
        };

        let header = self.body.with_font_size(table.style.header_font_size).bold();
        let data = self.body.with_font_size(table.style.data_font_size);
        let padding = pt(f64::from(table.style.padding));

        let mut layout = TableLayout::new(weights);
        layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        for row in &table.rows {
            let style = if row.header { header } else { data };
            let mut table_row = layout.row();
            for cell in &row.cells {
                let mut lines = LinearLayout::vertical();
                for line in &cell.lines {
                    let text = if line.is_empty() { vec![Span::plain(" ")] } else { line.clone() };
                    lines.push(styled_paragraph(&text, style));
                }
                table_row
                    .push_element(lines.padded(Margins::trbl(padding, padding, padding, padding)));
            }
            if let Err(e) = table_row.push() {
                tracing::warn!(error = %e, "Skipping table row");
            }
        }
        self.doc
            .push(layout.padded(Margins::trbl(pt(0.0), pt(slack), pt(0.0), pt(0.0))));
        self.doc.push(Break::new(1.0));
    }

    fn diagram(&mut self, outcome: &DiagramOutcome) {
        match outcome {
            DiagramOutcome::Image(diagram) => match diagram_image(diagram) {
                Ok(image) => {
                    self.doc.push(image);
                    self.doc.push(Break::new(1.0));
                }
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
        let style = self.body.with_color(Color::Greyscale(160));
        self.doc
            .push(Paragraph::new(StyledString::new("_".repeat(RULE_WIDTH), style)));
        self.doc.push(Break::new(0.5));
    }

    fn blank(&mut self) {
        self.doc.push(Break::new(1.0));
    }

    fn finish(self) -> Result<Vec<u8>, DocumentError> {
        let mut bytes = Vec::new();
        self.doc.render(&mut bytes)?;
        Ok(bytes)
    }
}

/// genpdf backend; needs the configured fonts.
pub struct DirectPdfBackend {
    fonts: Option<Arc<PdfFonts>>,
    assembler: Assembler,
    marker: String,
}

impl DirectPdfBackend {
    #[must_use]
    pub fn new(fonts: Option<Arc<PdfFonts>>, chain: Arc<DiagramChain>) -> Self {
        Self {
            fonts,
            assembler: Assembler::new(chain),
            marker: "Confidential".to_owned(),
        }
    }

    /// Footer marker text.
    #[must_use]
    pub fn marker(mut self, marker: &str) -> Self {
        marker.clone_into(&mut self.marker);
        self
    }
}

impl DocumentBackend for DirectPdfBackend {
    fn name(&self) -> &'static str {
        "genpdf"
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn is_available(&self, capabilities: &BackendCapabilities) -> bool {
        capabilities.direct_pdf
    }

    fn convert(&self, request: &RenderRequest) -> Result<Vec<u8>, DocumentError> {
        let fonts = self
            .fonts
            .as_deref()
            .ok_or_else(|| DocumentError::Fonts("no fonts loaded".to_owned()))?;
        let sink = PdfSink::new(fonts, &request.title(), &self.marker);
        self.assembler
            .assemble(&request.markdown, &request.diagrams, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::tests::system_fonts;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_sizes() {
        assert_eq!(heading_style(1).0, 18);
        assert_eq!(heading_style(2).0, 14);
        assert_eq!(heading_style(3).0, 12);
        assert_eq!(heading_style(4).0, 11);
        assert_eq!(heading_style(6).0, 11);
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn test_image_dpi_caps_width() {
        assert_eq!(image_dpi(300), 72.0);
        assert_eq!(image_dpi(900), 144.0);
    }

    /// Column widths genpdf draws for `weights` inside `width` points.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn drawn_widths(weights: &[usize], width: f64) -> Vec<f32> {
        let total: usize = weights.iter().sum();
        weights
            .iter()
            .map(|w| (*w as f64 / total as f64 * width) as f32)
            .collect()
    }

    #[test]
    fn test_table_keeps_planned_widths() {
        let long = format!("| 1 | {} |", "x".repeat(200));
        let rows = press_blocks::TableRows::parse(&["| id | text |", long.as_str()]).unwrap();
        let available = available_page_width();
        let plan = ColumnWidthPlan::compute(&rows, available);
        let (weights, slack) = table_geometry(&plan);

        let drawn = drawn_widths(&weights, f64::from(available) - slack);
        let planned = plan.widths();
        assert_eq!(drawn.len(), 2);
        for (drawn, planned) in drawn.iter().zip(&planned) {
            assert!((drawn - planned).abs() < 0.05, "drawn {drawn} vs planned {planned}");
        }
        assert!(drawn[1] <= available * press_blocks::WIDE_COLUMN_CAP + 0.05);
        assert!((drawn[0] - press_blocks::NARROW_COLUMN_WIDTH).abs() < 0.05);
    }

    #[test]
    fn test_full_width_plan_has_no_slack() {
        let row = format!("| a | {} | {} |", "y".repeat(40), "z".repeat(40));
        let rows =
            press_blocks::TableRows::parse(&["| name | description | notes |", row.as_str()])
                .unwrap();
        let plan = ColumnWidthPlan::compute(&rows, available_page_width());
        let (_, slack) = table_geometry(&plan);
        assert!(slack < 0.05, "slack {slack}");
    }

    #[test]
    fn test_missing_fonts_is_an_error() {
        let backend = DirectPdfBackend::new(None, Arc::new(DiagramChain::new()));
        let err = backend.convert(&RenderRequest::new("# Title")).unwrap_err();
        assert!(matches!(err, DocumentError::Fonts(_)));
    }

    #[test]
    fn test_renders_pdf_with_system_fonts() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let backend = DirectPdfBackend::new(Some(Arc::new(fonts)), Arc::new(DiagramChain::new()));
        let markdown = "# Title\n\nSome **bold** text.\n\n- item\n  - nested\n1. first\n\n\
                        | A | B |\n|---|---|\n| 1 | 2 |\n\n```rust\nfn main() {}\n\n```\n\n---\n\n\
                        ```mermaid\ngraph TD\n```\n";
        let bytes = backend.convert(&RenderRequest::new(markdown)).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_wide_table_with_system_fonts() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let header: Vec<String> = (1..=14).map(|i| format!("Column {i}")).collect();
        let row: Vec<String> = (1..=14).map(|i| i.to_string()).collect();
        let markdown = format!(
            "| {} |\n|{}|\n| {} |\n",
            header.join(" | "),
            "---|".repeat(14),
            row.join(" | ")
        );
        let backend = DirectPdfBackend::new(Some(Arc::new(fonts)), Arc::new(DiagramChain::new()));
        let bytes = backend.convert(&RenderRequest::new(markdown)).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
