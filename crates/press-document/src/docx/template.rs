//! Reference template for pandoc.

use docx_rs::{Docx, Paragraph, Run};

use super::{decorate, pack};
use crate::error::DocumentError;

/// A minimal DOCX carrying the page header, footer and heading styles.
///
/// Pandoc copies these from the file given as `--reference-doc`.
pub fn reference_docx(marker: &str) -> Result<Vec<u8>, DocumentError> {
    let docx = decorate(Docx::new(), marker)
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("")));
    pack(docx)
}
