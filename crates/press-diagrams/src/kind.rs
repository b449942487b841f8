//! Diagram type detection for placeholders.

/// Mermaid diagram type, detected from the first source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Journey,
    Gantt,
    Pie,
    Other,
}

impl DiagramKind {
    /// Detect the diagram type from the first line of `source`.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        let first_line = source.trim().lines().next().unwrap_or("").trim();
        let keyword_table: [(&str, Self); 9] = [
            ("graph", Self::Flowchart),
            ("flowchart", Self::Flowchart),
            ("sequenceDiagram", Self::Sequence),
            ("classDiagram", Self::Class),
            ("stateDiagram", Self::State),
            ("erDiagram", Self::EntityRelationship),
            ("journey", Self::Journey),
            ("gantt", Self::Gantt),
            ("pie", Self::Pie),
        ];
        keyword_table
            .into_iter()
            .find(|(keyword, _)| first_line.starts_with(keyword))
            .map_or(Self::Other, |(_, kind)| kind)
    }

    /// Human-readable type name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flowchart => "Flowchart",
            Self::Sequence => "Sequence Diagram",
            Self::Class => "Class Diagram",
            Self::State => "State Diagram",
            Self::EntityRelationship => "Entity Relationship Diagram",
            Self::Journey => "User Journey",
            Self::Gantt => "Gantt Chart",
            Self::Pie => "Pie Chart",
            Self::Other => "Diagram",
        }
    }
}

/// Placeholder shown when no method could render `source`.
#[must_use]
pub fn placeholder_text(source: &str) -> String {
    format!(
        "[{} - Mermaid diagram rendering not available]",
        DiagramKind::detect(source).label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_kinds() {
        let cases = [
            ("graph TD\nA-->B", DiagramKind::Flowchart),
            ("flowchart LR\nA-->B", DiagramKind::Flowchart),
            ("sequenceDiagram\nA->>B: hi", DiagramKind::Sequence),
            ("classDiagram\nA <|-- B", DiagramKind::Class),
            ("stateDiagram-v2\n[*] --> S", DiagramKind::State),
            ("erDiagram\nA ||--o{ B : has", DiagramKind::EntityRelationship),
            ("journey\ntitle Day", DiagramKind::Journey),
            ("gantt\ntitle Plan", DiagramKind::Gantt),
            ("pie title Pets\n\"Dogs\" : 3", DiagramKind::Pie),
            ("mindmap\nroot", DiagramKind::Other),
            ("", DiagramKind::Other),
        ];
        for (source, expected) in cases {
            assert_eq!(DiagramKind::detect(source), expected, "source: {source:?}");
        }
    }

    #[test]
    fn test_detect_ignores_leading_blank_lines() {
        assert_eq!(
            DiagramKind::detect("\n\n   sequenceDiagram\n"),
            DiagramKind::Sequence
        );
    }

    #[test]
    fn test_placeholder_text() {
        assert_eq!(
            placeholder_text("gantt\ntitle x"),
            "[Gantt Chart - Mermaid diagram rendering not available]"
        );
        assert_eq!(
            placeholder_text("unknown"),
            "[Diagram - Mermaid diagram rendering not available]"
        );
    }
}
