//! Render request and document title.

use press_blocks::{Block, classify, parse_spans, plain_text};
use press_diagrams::DiagramMemo;

/// Input for one conversion.
#[derive(Clone, Debug, Default)]
pub struct RenderRequest {
    pub markdown: String,
    /// Output file stem, without extension.
    pub filename: Option<String>,
    /// Extra CSS for the HTML/CSS engine. Other backends ignore it.
    pub css: Option<String>,
    /// Diagram outcomes shared by every backend attempt on this request.
    pub diagrams: DiagramMemo,
}

impl RenderRequest {
    #[must_use]
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            ..Self::default()
        }
    }

    /// Document title from the first `# ` heading, or "Document".
    #[must_use]
    pub fn title(&self) -> String {
        document_title(&self.markdown).unwrap_or_else(|| "Document".to_owned())
    }
}

/// Plain text of the first level-1 heading block.
///
/// Lines inside code fences and diagrams are never headings.
#[must_use]
pub fn document_title(markdown: &str) -> Option<String> {
    classify(markdown).find_map(|block| match block {
        Block::Heading { level: 1, text } => {
            Some(plain_text(&parse_spans(&text))).filter(|title| !title.is_empty())
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_title() {
        assert_eq!(
            document_title("intro\n## Sub\n# Main Title \n# Later"),
            Some("Main Title".to_owned())
        );
        assert_eq!(document_title("## Only sub"), None);
        assert_eq!(document_title("#NoSpace"), None);
    }

    #[test]
    fn test_title_skips_fenced_comments() {
        let markdown = "```sh\n# install\nmake\n```\n\n# Setup Guide\n";
        assert_eq!(document_title(markdown), Some("Setup Guide".to_owned()));
        assert_eq!(document_title("~~~\n# only code\n~~~\n"), None);
    }

    #[test]
    fn test_title_drops_bold_markers() {
        assert_eq!(document_title("# **Quarterly** report"), Some("Quarterly report".to_owned()));
    }

    #[test]
    fn test_request_title_default() {
        assert_eq!(RenderRequest::new("text").title(), "Document");
        assert_eq!(RenderRequest::new("# Plan").title(), "Plan");
    }
}
