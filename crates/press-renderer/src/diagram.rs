//! Diagram fences rendered to inline images.

use std::sync::Arc;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use press_blocks::is_diagram_language;
use press_diagrams::{DiagramChain, DiagramMemo, DiagramOutcome};

use crate::code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult};
use crate::state::escape_html;

fn placeholder_marker(index: usize) -> String {
    format!("<!--press-diagram-{index}-->")
}

/// Replaces `mermaid`/`mmd` fences with rendered images.
///
/// Fences are collected during rendering and sent through the chain in one
/// parallel batch during post-processing. Images are embedded as data URIs;
/// failed diagrams become a placeholder block.
pub struct DiagramProcessor {
    chain: Arc<DiagramChain>,
    memo: DiagramMemo,
    extracted: Vec<ExtractedCodeBlock>,
}

impl DiagramProcessor {
    #[must_use]
    pub fn new(chain: Arc<DiagramChain>) -> Self {
        Self {
            chain,
            memo: DiagramMemo::new(),
            extracted: Vec::new(),
        }
    }

    /// Share outcomes with other renderings of the same document.
    #[must_use]
    pub fn with_memo(mut self, memo: &DiagramMemo) -> Self {
        self.memo = memo.clone();
        self
    }
}

fn outcome_html(outcome: &DiagramOutcome) -> String {
    match outcome {
        DiagramOutcome::Image(image) => format!(
            r#"<figure class="diagram"><img src="data:{};base64,{}" alt="Diagram"></figure>"#,
            image.format.mime_type(),
            BASE64_STANDARD.encode(&image.bytes)
        ),
        DiagramOutcome::Placeholder(text) => format!(
            r#"<div class="diagram-placeholder">{}</div>"#,
            escape_html(text)
        ),
    }
}

impl CodeBlockProcessor for DiagramProcessor {
    fn process(&mut self, language: &str, source: &str, index: usize) -> ProcessResult {
        if !is_diagram_language(language) {
            return ProcessResult::PassThrough;
        }
        self.extracted.push(ExtractedCodeBlock {
            index,
            language: language.to_owned(),
            source: source.to_owned(),
        });
        ProcessResult::Placeholder(placeholder_marker(index))
    }

    fn post_process(&mut self, html: &mut String) {
        if self.extracted.is_empty() {
            return;
        }
        let sources: Vec<&str> = self.extracted.iter().map(|b| b.source.as_str()).collect();
        let outcomes = self.memo.render_all(&self.chain, &sources);
        for (block, outcome) in self.extracted.iter().zip(&outcomes) {
            *html = html.replace(&placeholder_marker(block.index), &outcome_html(outcome));
        }
    }

    fn extracted(&self) -> &[ExtractedCodeBlock] {
        &self.extracted
    }
}
