//! Event-processing state for the HTML renderer.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Fenced or indented code block being collected.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Alt text capture for images.
#[derive(Default)]
pub(crate) struct ImageState {
    pending: Option<(String, String)>,
    alt: String,
}

impl ImageState {
    pub(crate) fn start(&mut self, src: String, title: String) {
        self.pending = Some((src, title));
        self.alt.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt.push_str(text);
    }

    /// End capture and return (src, title, alt).
    pub(crate) fn end(&mut self) -> Option<(String, String, String)> {
        self.pending
            .take()
            .map(|(src, title)| (src, title, std::mem::take(&mut self.alt)))
    }
}

/// Plain-text capture of the first level-1 heading.
#[derive(Default)]
pub(crate) struct TitleState {
    title: Option<String>,
    capturing: bool,
    buffer: String,
}

impl TitleState {
    pub(crate) fn start_heading(&mut self, level: u8) {
        if level == 1 && self.title.is_none() {
            self.capturing = true;
            self.buffer.clear();
        }
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        if self.capturing {
            self.buffer.push_str(text);
        }
    }

    pub(crate) fn end_heading(&mut self) {
        if self.capturing {
            self.capturing = false;
            let text = self.buffer.trim();
            if !text.is_empty() {
                self.title = Some(text.to_owned());
            }
        }
    }

    pub(crate) fn take(&mut self) -> Option<String> {
        self.title.take()
    }
}

/// Footnote numbering and collected definitions.
///
/// Numbers follow the order of first reference; a definition that is never
/// referenced gets the next number when it is seen.
#[derive(Default)]
pub(crate) struct FootnoteState {
    numbers: HashMap<String, usize>,
    /// Rendered definition bodies by number.
    definitions: BTreeMap<usize, String>,
    /// Label of the open definition and the output it interrupted.
    open: Option<(String, String)>,
}

impl FootnoteState {
    /// Number for a reference to `label`, and whether it is the first one.
    pub(crate) fn reference(&mut self, label: &str) -> (usize, bool) {
        if let Some(&number) = self.numbers.get(label) {
            return (number, false);
        }
        let number = self.numbers.len() + 1;
        self.numbers.insert(label.to_owned(), number);
        (number, true)
    }

    /// Start collecting the definition of `label`; `output` is the body
    /// rendered so far, handed back by [`end_definition`](Self::end_definition).
    pub(crate) fn start_definition(&mut self, label: &str, output: String) {
        self.open = Some((label.to_owned(), output));
    }

    /// Store `body` for the open definition and return the interrupted output.
    pub(crate) fn end_definition(&mut self, body: String) -> Option<String> {
        let (label, output) = self.open.take()?;
        let (number, _) = self.reference(&label);
        self.definitions.insert(number, body);
        Some(output)
    }

    /// Footnotes section, empty when nothing was defined.
    pub(crate) fn render(&mut self) -> String {
        if self.definitions.is_empty() {
            return String::new();
        }
        let mut html = String::from(r#"<section class="footnotes"><ol>"#);
        for (number, body) in std::mem::take(&mut self.definitions) {
            write!(
                html,
                r##"<li id="fn{number}" value="{number}">{body}<a href="#fnref{number}" class="footnote-backref">↩</a></li>"##
            )
            .unwrap();
        }
        html.push_str("</ol></section>");
        self.numbers.clear();
        html
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
