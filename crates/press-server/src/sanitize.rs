//! Input clean-up at the HTTP edge.

const DEFAULT_FILENAME: &str = "document";
const FILENAME_FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Control characters other than newline, carriage return and tab.
fn is_stripped_control(c: char) -> bool {
    c.is_ascii_control() && !matches!(c, '\n' | '\r' | '\t')
}

/// Remove stray control characters and normalise line endings to `\n`.
pub(crate) fn sanitize_markdown(markdown: &str) -> String {
    markdown
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| !is_stripped_control(*c))
        .collect()
}

/// Remove stray control characters.
pub(crate) fn sanitize_css(css: &str) -> String {
    css.chars().filter(|c| !is_stripped_control(*c)).collect()
}

/// File stem safe for `Content-Disposition`, defaulting to "document".
pub(crate) fn sanitize_filename(filename: Option<&str>) -> String {
    let cleaned: String = filename
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control() && !FILENAME_FORBIDDEN.contains(c))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_FILENAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}
