//! Fenced code block delimiters.

/// An opening fence line.
///
/// A fence is a run of at least three backticks or tildes. It is closed by
/// a line holding only the same character, repeated at least as many times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fence<'a> {
    marker: char,
    len: usize,
    language: Option<&'a str>,
}

impl<'a> Fence<'a> {
    /// Parse `line` as an opening fence.
    #[must_use]
    pub fn open(line: &'a str) -> Option<Self> {
        let trimmed = line.trim();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        if len < 3 {
            return None;
        }
        // `len` counts one-byte characters.
        Some(Self {
            marker,
            len,
            language: trimmed[len..].split_whitespace().next(),
        })
    }

    /// First word of the info string.
    #[must_use]
    pub fn language(&self) -> Option<&'a str> {
        self.language
    }

    /// Whether `line` closes this fence.
    #[must_use]
    pub fn closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.len() >= self.len && trimmed.chars().all(|c| c == self.marker)
    }
}
