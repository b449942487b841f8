//! Inline bold markup and table cell wrapping.

use std::sync::LazyLock;

use regex::Regex;

/// Cells whose text exceeds this many characters are split into lines of
/// at most this many characters at word boundaries.
pub const CELL_WRAP_THRESHOLD: usize = 50;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("valid bold regex"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"));

/// A run of text with uniform weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    /// Regular-weight span.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    /// Bold span.
    #[must_use]
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Split text into spans, turning `**x**` and `__x__` into bold runs.
///
/// Unmatched markers stay literal.
#[must_use]
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in BOLD.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()]));
        }
        if let Some(inner) = caps.get(1).or_else(|| caps.get(2)) {
            spans.push(Span::bold(inner.as_str()));
        }
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Span::plain(&text[last..]));
    }
    spans
}

/// Concatenated text of spans without markup.
#[must_use]
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Lay out a table cell as lines of spans.
///
/// Explicit `<br>` markup always starts a new line. Any resulting line
/// longer than [`CELL_WRAP_THRESHOLD`] characters is word-wrapped to that
/// width; a single word longer than the width is split without loss.
#[must_use]
pub fn cell_lines(text: &str) -> Vec<Vec<Span>> {
    LINE_BREAK
        .split(text)
        .flat_map(|segment| {
            let spans = parse_spans(segment.trim());
            if plain_text(&spans).chars().count() <= CELL_WRAP_THRESHOLD {
                vec![spans]
            } else {
                wrap_spans(&spans, CELL_WRAP_THRESHOLD)
            }
        })
        .collect()
}

/// Greedy word wrap that keeps each word's weight.
fn wrap_spans(spans: &[Span], width: usize) -> Vec<Vec<Span>> {
    let words = spans.iter().flat_map(|span| {
        span.text
            .split_whitespace()
            .flat_map(move |word| split_long_word(word, width).map(move |w| (w, span.bold)))
    });

    let mut lines: Vec<Vec<Span>> = Vec::new();
    let mut line: Vec<Span> = Vec::new();
    let mut line_len = 0;

    for (word, bold) in words {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        let separator = if line_len > 0 { " " } else { "" };
        match line.last_mut() {
            Some(last) if last.bold == bold => {
                last.text.push_str(separator);
                last.text.push_str(word);
            }
            _ => line.push(Span {
                text: format!("{separator}{word}"),
                bold,
            }),
        }
        line_len += separator.len() + word_len;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_long_word(word: &str, width: usize) -> impl Iterator<Item = &str> {
    let mut rest = word;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let cut = rest
            .char_indices()
            .nth(width)
            .map_or(rest.len(), |(index, _)| index);
        let (head, tail) = rest.split_at(cut);
        rest = tail;
        Some(head)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_spans_plain() {
        assert_eq!(parse_spans("hello"), vec![Span::plain("hello")]);
        assert!(parse_spans("").is_empty());
    }

    #[test]
    fn test_parse_spans_bold_markers() {
        assert_eq!(
            parse_spans("a **b** c __d__"),
            vec![
                Span::plain("a "),
                Span::bold("b"),
                Span::plain(" c "),
                Span::bold("d"),
            ]
        );
    }

    #[test]
    fn test_parse_spans_unmatched_marker_literal() {
        assert_eq!(parse_spans("2 ** 3"), vec![Span::plain("2 ** 3")]);
    }

    #[test]
    fn test_cell_lines_short() {
        assert_eq!(cell_lines("**Total**"), vec![vec![Span::bold("Total")]]);
    }

    #[test]
    fn test_cell_lines_line_breaks() {
        assert_eq!(
            cell_lines("one<br>two<br/>three<BR />four"),
            vec![
                vec![Span::plain("one")],
                vec![Span::plain("two")],
                vec![Span::plain("three")],
                vec![Span::plain("four")],
            ]
        );
    }

    #[test]
    fn test_cell_lines_wraps_long_text() {
        let text = "word ".repeat(30);
        let lines = cell_lines(&text);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(plain_text(line).chars().count() <= CELL_WRAP_THRESHOLD);
        }
        let rejoined: Vec<String> = lines.iter().map(|l| plain_text(l)).collect();
        assert_eq!(rejoined.join(" "), text.trim());
    }

    #[test]
    fn test_cell_lines_keeps_bold_across_wrap() {
        let text = format!("**{}** tail", "bold ".repeat(12).trim());
        let lines = cell_lines(&text);
        assert!(lines.len() > 1);
        assert!(lines[0].iter().all(|s| s.bold));
        assert_eq!(lines.last().unwrap().last().unwrap(), &Span::plain(" tail"));
    }

    #[test]
    fn test_overlong_word_is_split_not_truncated() {
        let word = "x".repeat(120);
        let lines = cell_lines(&word);
        assert_eq!(lines.len(), 3);
        let total: usize = lines.iter().map(|l| plain_text(l).len()).sum();
        assert_eq!(total, 120);
    }
}
