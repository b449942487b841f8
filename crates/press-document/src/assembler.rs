//! Block-to-element assembly.

use std::sync::Arc;

use press_blocks::{Block, classify, parse_spans};
use press_diagrams::{DiagramChain, DiagramMemo, DiagramOutcome, placeholder_text};

use crate::error::DocumentError;
use crate::sink::{ElementSink, LayoutTable};

/// Drives an [`ElementSink`] from markdown.
///
/// All diagrams of a document are rendered up front in one parallel batch,
/// through a memo shared with other backends. Tables get a width plan only
/// when the sink reports a fixed page width.
pub struct Assembler {
    chain: Arc<DiagramChain>,
}

impl Assembler {
    #[must_use]
    pub fn new(chain: Arc<DiagramChain>) -> Self {
        Self { chain }
    }

    /// Feed every block of `markdown` to `sink` and return the finished bytes.
    pub fn assemble<S: ElementSink>(
        &self,
        markdown: &str,
        diagrams: &DiagramMemo,
        mut sink: S,
    ) -> Result<Vec<u8>, DocumentError> {
        let blocks: Vec<Block> = classify(markdown).collect();

        let sources: Vec<&str> = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Diagram { source, .. } => Some(source.as_str()),
                _ => None,
            })
            .collect();
        let mut outcomes = diagrams.render_all(&self.chain, &sources).into_iter();

        let width = sink.available_width();
        tracing::debug!(blocks = blocks.len(), diagrams = sources.len(), "Assembling document");

        for block in &blocks {
            match block {
                Block::Heading { level, text } => sink.heading(*level, text),
                Block::Paragraph(text) => sink.paragraph(&parse_spans(text)),
                Block::BulletItem { indent, text } => sink.bullet(*indent, &parse_spans(text)),
                Block::NumberedItem { number, text } => sink.numbered(*number, &parse_spans(text)),
                Block::CodeBlock { language, text } => sink.code_block(language.as_deref(), text),
                Block::Table(rows) => sink.table(&LayoutTable::build(rows, width)),
                Block::Diagram { source, .. } => {
                    let outcome = outcomes
                        .next()
                        .unwrap_or_else(|| DiagramOutcome::Placeholder(placeholder_text(source)));
                    sink.diagram(&outcome);
                }
                Block::Rule => sink.rule(),
                Block::Blank => sink.blank(),
            }
        }

        sink.finish()
    }
}
