//! PDF backends.
//!
//! [`HtmlPdfBackend`] renders styled HTML and hands it to an external
//! HTML/CSS engine. [`DirectPdfBackend`] lays the document out itself with
//! genpdf and is the fallback when the engine is missing or fails.

mod decorator;
mod direct;
mod html;

use std::path::Path;

use genpdf::fonts::{self, FontData, FontFamily};

use crate::error::DocumentError;

pub use decorator::ConfidentialPageDecorator;
pub use direct::{DirectPdfBackend, PdfSink};
pub use html::HtmlPdfBackend;

/// Converts typographic points to genpdf millimetres.
pub(crate) fn pt(points: f64) -> genpdf::Mm {
    genpdf::Mm::from(points * 25.4 / 72.0)
}

/// Body and code font families for the direct PDF path.
///
/// Each family is read from `{dir}/{name}-Regular.ttf`, `-Bold.ttf`,
/// `-Italic.ttf` and `-BoldItalic.ttf`.
#[derive(Clone)]
pub struct PdfFonts {
    pub body: FontFamily<FontData>,
    pub code: FontFamily<FontData>,
}

impl PdfFonts {
    pub fn load(dir: &Path, family: &str, code_family: &str) -> Result<Self, DocumentError> {
        let load = |name: &str| {
            fonts::from_files(dir, name, None)
                .map_err(|e| DocumentError::Fonts(format!("{name} in {}: {e}", dir.display())))
        };
        let fonts = Self {
            body: load(family)?,
            code: load(code_family)?,
        };
        tracing::debug!(dir = %dir.display(), family, code_family, "Loaded PDF fonts");
        Ok(fonts)
    }
}
