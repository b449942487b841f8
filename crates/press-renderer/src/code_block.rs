//! Code block processor trait for special fences.
//!
//! Processors are consulted in registration order when a fenced block ends.
//! The first result other than [`ProcessResult::PassThrough`] wins; blocks no
//! processor claims are rendered as highlighted code.

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Write a placeholder now and replace it in [`CodeBlockProcessor::post_process`].
    Placeholder(String),
    /// Write this HTML in place of the block.
    Inline(String),
    /// Render as a regular code block.
    PassThrough,
}

/// A fenced block captured for deferred processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedCodeBlock {
    /// Zero-based index of the block among all fenced blocks in the document.
    pub index: usize,
    pub language: String,
    pub source: String,
}

/// Hook for fenced blocks that are not plain code.
pub trait CodeBlockProcessor {
    /// Decide what to write for one fenced block.
    fn process(&mut self, language: &str, source: &str, index: usize) -> ProcessResult;

    /// Replace placeholders in the finished body. Default is a no-op.
    fn post_process(&mut self, _html: &mut String) {}

    /// Blocks captured with [`ProcessResult::Placeholder`].
    fn extracted(&self) -> &[ExtractedCodeBlock] {
        &[]
    }
}

/// First whitespace-separated token of a fence info string.
pub(crate) fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace().next().map(str::to_owned)
}
