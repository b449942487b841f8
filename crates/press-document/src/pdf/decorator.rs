//! Per-page header and footer for the direct PDF path.

use genpdf::error::Error;
use genpdf::render::Area;
use genpdf::style::{Color, Style};
use genpdf::{Context, Margins, PageDecorator, Position};

use super::pt;

const RULE_INSET_PT: f64 = 72.0;
const TOP_RULE_PT: f64 = 30.0;
const BOTTOM_RULE_PT: f64 = 50.0;
const FOOTER_TEXT_PT: f64 = 30.0;
const FOOTER_FONT_SIZE: u8 = 9;
const CONTENT_MARGINS_PT: (f64, f64) = (100.0, 72.0);

/// Separator lines are drawn in the default stroke width.
fn rule_style() -> Style {
    Style::new().with_color(Color::Greyscale(128))
}

/// Draws separator lines, the marker, the generation date and the page
/// number on every page, then reserves the content margins.
pub struct ConfidentialPageDecorator {
    marker: String,
    date: String,
    page: usize,
}

impl ConfidentialPageDecorator {
    /// Decorator stamped with today's local date.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self::with_date(marker, chrono::Local::now().format("%Y-%m-%d").to_string())
    }

    #[must_use]
    pub fn with_date(marker: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            date: date.into(),
            page: 0,
        }
    }

    /// Pages decorated so far.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.page
    }
}

impl PageDecorator for ConfidentialPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: Area<'a>,
        style: Style,
    ) -> Result<Area<'a>, Error> {
        self.page += 1;
        let size = area.size();
        let left = pt(RULE_INSET_PT);
        let right = size.width - pt(RULE_INSET_PT);

        for y in [pt(TOP_RULE_PT), size.height - pt(BOTTOM_RULE_PT)] {
            area.draw_line(vec![Position::new(left, y), Position::new(right, y)], rule_style());
        }

        let footer = style.with_font_size(FOOTER_FONT_SIZE);
        let grey = footer.with_color(Color::Greyscale(100));
        let baseline = size.height - pt(FOOTER_TEXT_PT) - footer.line_height(&context.font_cache);

        let marker = footer.bold();
        let marker_width = marker.str_width(&context.font_cache, &self.marker);
        let centre = (size.width - marker_width) / 2.0;
        area.print_str(&context.font_cache, Position::new(centre, baseline), marker, &self.marker)?;

        area.print_str(&context.font_cache, Position::new(left, baseline), grey, &self.date)?;

        let page = format!("Page {}", self.page);
        let page_width = grey.str_width(&context.font_cache, &page);
        area.print_str(
            &context.font_cache,
            Position::new(right - page_width, baseline),
            grey,
            &page,
        )?;

        let (vertical, horizontal) = CONTENT_MARGINS_PT;
        area.add_margins(Margins::trbl(pt(vertical), pt(horizontal), pt(vertical), pt(horizontal)));
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::tests::system_fonts;
    use genpdf::Document;
    use genpdf::elements::{PageBreak, Paragraph};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_date_is_iso() {
        let decorator = ConfidentialPageDecorator::new("Confidential");
        assert_eq!(decorator.date.len(), 10);
        assert_eq!(decorator.date.as_bytes()[4], b'-');
        assert_eq!(decorator.pages(), 0);
    }

    #[test]
    fn test_rule_style_is_grey() {
        let style = rule_style();
        assert_eq!(style.color(), Some(Color::Greyscale(128)));
        assert!(!style.is_bold());
    }

    #[test]
    fn test_decorates_every_page() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let mut doc = Document::new(fonts.body.clone());
        doc.set_page_decorator(ConfidentialPageDecorator::with_date("Confidential", "2026-01-02"));
        doc.push(Paragraph::new("first page"));
        doc.push(PageBreak::new());
        doc.push(Paragraph::new("second page"));

        let mut bytes = Vec::new();
        doc.render(&mut bytes).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
