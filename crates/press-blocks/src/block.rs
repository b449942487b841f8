//! Block types produced by the classifier.

use crate::table::TableRows;

/// Fence languages rendered as diagrams (compared case-insensitively).
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "mmd"];

/// Check whether a fence language denotes a diagram.
#[must_use]
pub fn is_diagram_language(language: &str) -> bool {
    DIAGRAM_LANGUAGES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(language))
}

/// A unit of document structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// `#` to `####` heading.
    Heading { level: u8, text: String },
    /// Any other non-empty line.
    Paragraph(String),
    /// `- ` or `* ` item; `indent` counts leading two-space pairs.
    BulletItem { indent: usize, text: String },
    /// `1. ` or `1) ` item.
    NumberedItem { number: u32, text: String },
    /// Fenced code, lines kept verbatim.
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    /// Pipe table.
    Table(TableRows),
    /// Fenced block in a diagram language.
    Diagram { language: String, source: String },
    /// `---`, `***` or `___` on a line of its own.
    Rule,
    /// Empty or whitespace-only line.
    Blank,
}

impl Block {
    /// Markdown line equivalent for line-level blocks.
    ///
    /// Returns `None` for fenced blocks and tables, which span several lines.
    #[must_use]
    pub fn source_text(&self) -> Option<String> {
        match self {
            Self::Heading { level, text } => {
                Some(format!("{} {text}", "#".repeat(usize::from(*level))))
            }
            Self::Paragraph(text) => Some(text.clone()),
            Self::BulletItem { indent, text } => Some(format!("{}- {text}", "  ".repeat(*indent))),
            Self::NumberedItem { number, text } => Some(format!("{number}. {text}")),
            Self::Rule => Some("---".to_owned()),
            Self::Blank => Some(String::new()),
            Self::CodeBlock { .. } | Self::Table(_) | Self::Diagram { .. } => None,
        }
    }

    /// Whether this block renders with no visible content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_diagram_language() {
        assert!(is_diagram_language("mermaid"));
        assert!(is_diagram_language("Mermaid"));
        assert!(is_diagram_language("MMD"));
        assert!(!is_diagram_language("plantuml"));
        assert!(!is_diagram_language(""));
    }

    #[test]
    fn test_source_text() {
        let heading = Block::Heading {
            level: 2,
            text: "Setup".to_owned(),
        };
        assert_eq!(heading.source_text(), Some("## Setup".to_owned()));

        let bullet = Block::BulletItem {
            indent: 1,
            text: "nested".to_owned(),
        };
        assert_eq!(bullet.source_text(), Some("  - nested".to_owned()));

        let code = Block::CodeBlock {
            language: None,
            text: "x".to_owned(),
        };
        assert_eq!(code.source_text(), None);
    }
}
