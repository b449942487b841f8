//! Class-based syntax highlighting with syntect.
//!
//! Code is emitted as `<span class="...">` runs; [`highlight_css`] produces
//! the matching stylesheet so the HTML engine needs no inline styles.

use std::sync::LazyLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::state::escape_html;

const THEME: &str = "InspiredGitHub";
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Map common fence aliases to syntect tokens.
fn normalize_language(language: &str) -> String {
    let language = language.to_lowercase();
    match language.as_str() {
        "sh" | "shell" | "zsh" | "console" => "bash".to_owned(),
        "yml" => "yaml".to_owned(),
        "c++" | "cc" | "cxx" => "cpp".to_owned(),
        "c#" | "csharp" => "cs".to_owned(),
        "ts" => "js".to_owned(),
        _ => language,
    }
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    SYNTAXES.find_syntax_by_token(&normalize_language(language))
}

/// Highlight `code` as `language`.
///
/// Unknown languages and highlighter failures fall back to escaped plain
/// text, so the result is always safe to embed.
#[must_use]
pub fn highlight_code(language: Option<&str>, code: &str) -> String {
    let Some(syntax) = language.and_then(find_syntax) else {
        return escape_html(code);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(
                language = %syntax.name,
                error = %e,
                "Highlighting failed, using plain text"
            );
            return escape_html(code);
        }
    }
    generator.finalize()
}

/// Stylesheet for the classes emitted by [`highlight_code`].
///
/// Empty when the bundled theme cannot be turned into CSS.
#[must_use]
pub fn highlight_css() -> String {
    let themes = ThemeSet::load_defaults();
    let Some(theme) = themes.themes.get(THEME) else {
        return String::new();
    };
    match css_for_theme_with_class_style(theme, CLASS_STYLE) {
        Ok(css) => css,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to generate highlight CSS");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_language_gets_classes() {
        let html = highlight_code(Some("rust"), "fn main() {}\n");
        assert!(html.contains("class=\"hl-"), "html: {html}");
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_is_escaped() {
        assert_eq!(
            highlight_code(Some("no-such-language"), "a < b"),
            "a &lt; b"
        );
        assert_eq!(highlight_code(None, "<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_highlighted_output_escapes_markup() {
        let html = highlight_code(Some("python"), "print(\"<b>\")\n");
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(normalize_language("YML"), "yaml");
        assert_eq!(normalize_language("shell"), "bash");
        assert_eq!(normalize_language("rust"), "rust");
        assert!(find_syntax("sh").is_some());
    }

    #[test]
    fn test_css_uses_prefix() {
        assert!(highlight_css().contains(".hl-"));
    }
}
