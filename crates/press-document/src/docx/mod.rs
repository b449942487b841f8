//! DOCX backends.
//!
//! [`PandocDocxBackend`] hands markdown to `pandoc` with a generated
//! reference template. [`DirectDocxBackend`] writes the document with
//! docx-rs and needs no external tools.

mod direct;
mod pandoc;
mod template;

use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, FieldCharType, Footer, Header, InstrPAGE, InstrText, Paragraph, Run,
    Style, StyleType,
};

use crate::error::DocumentError;

pub use direct::{DirectDocxBackend, DocxSink};
pub use pandoc::{FenceSegment, PandocDocxBackend, split_diagram_fences};
pub use template::reference_docx;

/// Header with the bold marker, left aligned.
fn page_header(marker: &str) -> Header {
    Header::new().add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(marker).bold().size(20))
            .align(AlignmentType::Left),
    )
}

/// Centred "Page N" footer using a PAGE field.
fn page_footer() -> Footer {
    let number = Run::new()
        .add_field_char(FieldCharType::Begin, false)
        .add_instr_text(InstrText::PAGE(InstrPAGE::new()))
        .add_field_char(FieldCharType::Separate, false)
        .add_text("1")
        .add_field_char(FieldCharType::End, false);
    Footer::new().add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text("Page "))
            .add_run(number)
            .align(AlignmentType::Center),
    )
}

/// Heading paragraph styles `Heading1` to `Heading4`, sizes in half-points.
fn heading_styles() -> Vec<Style> {
    [(1, 36), (2, 28), (3, 24), (4, 22)]
        .into_iter()
        .map(|(level, size)| {
            Style::new(&format!("Heading{level}"), StyleType::Paragraph)
                .name(&format!("Heading {level}"))
                .size(size)
                .bold()
        })
        .collect()
}

/// Apply the shared header, footer and heading styles.
fn decorate(docx: Docx, marker: &str) -> Docx {
    heading_styles()
        .into_iter()
        .fold(docx, Docx::add_style)
        .header(page_header(marker))
        .footer(page_footer())
}

fn pack(docx: Docx) -> Result<Vec<u8>, DocumentError> {
    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}
