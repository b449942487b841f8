//! Line-oriented block classifier.
//!
//! A single forward pass over the source lines with three modes: normal,
//! inside a fenced code block, and inside a pipe table. A table ends at the
//! first line that is not a table line; that line is then classified in
//! normal mode, so nothing is consumed twice.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::Lines;

use crate::block::{Block, is_diagram_language};
use crate::fence::Fence;
use crate::table::TableRows;

/// Deepest heading level recognized; deeper markers read as paragraphs.
const MAX_HEADING_LEVEL: usize = 4;

/// Classify markdown into blocks.
///
/// The returned iterator is lazy and finite; call `classify` again (or clone
/// the iterator) to restart from the beginning.
#[must_use]
pub fn classify(markdown: &str) -> Blocks<'_> {
    Blocks {
        lines: markdown.lines().peekable(),
        pending: VecDeque::new(),
    }
}

/// Iterator over the blocks of a markdown document.
#[derive(Clone, Debug)]
pub struct Blocks<'a> {
    lines: Peekable<Lines<'a>>,
    /// Line blocks recovered from a rejected table.
    pending: VecDeque<Block>,
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if let Some(block) = self.pending.pop_front() {
            return Some(block);
        }
        let line = self.lines.next()?;
        let trimmed = line.trim();

        if let Some(fence) = Fence::open(trimmed) {
            return Some(self.fenced_block(&fence));
        }
        if is_table_line(trimmed) {
            return self.table(line);
        }
        Some(classify_line(line, trimmed))
    }
}

impl Blocks<'_> {
    /// Consume lines up to the closing fence (or end of input).
    fn fenced_block(&mut self, fence: &Fence<'_>) -> Block {
        let mut lines = Vec::new();
        let mut closed = false;
        for line in self.lines.by_ref() {
            if fence.closed_by(line) {
                closed = true;
                break;
            }
            lines.push(line);
        }

        if !closed {
            tracing::debug!(lines = lines.len(), "Unterminated code fence flushed at end of input");
        }

        let text = lines.join("\n");
        match fence.language() {
            Some(language) if is_diagram_language(language) => Block::Diagram {
                language: language.to_owned(),
                source: text,
            },
            language => Block::CodeBlock {
                language: language.map(str::to_owned),
                text,
            },
        }
    }

    /// Consume the remaining lines of a table starting at `first`.
    ///
    /// Lines that do not form a table are classified one by one instead.
    fn table(&mut self, first: &str) -> Option<Block> {
        let mut lines = vec![first];
        while let Some(next) = self.lines.next_if(|line| is_table_line(line.trim())) {
            lines.push(next);
        }

        if let Some(rows) = TableRows::parse(&lines) {
            return Some(Block::Table(rows));
        }
        tracing::debug!(lines = lines.len(), "Pipe lines with fewer than two rows kept as text");
        self.pending
            .extend(lines.iter().map(|line| classify_line(line, line.trim())));
        self.pending.pop_front()
    }
}

fn is_table_line(trimmed: &str) -> bool {
    trimmed.contains('|') && !trimmed.starts_with('#')
}

fn classify_line(line: &str, trimmed: &str) -> Block {
    if trimmed.is_empty() {
        return Block::Blank;
    }
    if let Some(block) = heading(trimmed) {
        return block;
    }
    if is_rule(trimmed) {
        return Block::Rule;
    }
    if let Some(text) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Block::BulletItem {
            indent: indent_depth(line),
            text: text.trim().to_owned(),
        };
    }
    if let Some(block) = numbered_item(trimmed) {
        return block;
    }
    Block::Paragraph(trimmed.to_owned())
}

fn heading(trimmed: &str) -> Option<Block> {
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL {
        return None;
    }
    let text = trimmed[hashes..].strip_prefix(' ')?;
    Some(Block::Heading {
        level: u8::try_from(hashes).ok()?,
        text: text.trim().to_owned(),
    })
}

fn is_rule(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first @ ('-' | '*' | '_')) => trimmed.len() >= 3 && chars.all(|c| c == first),
        _ => false,
    }
}

fn numbered_item(trimmed: &str) -> Option<Block> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &trimmed[digits..];
    let text = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))?;
    Some(Block::NumberedItem {
        number: trimmed[..digits].parse().ok()?,
        text: text.trim().to_owned(),
    })
}

/// Number of leading two-space pairs.
fn indent_depth(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count() / 2
}
