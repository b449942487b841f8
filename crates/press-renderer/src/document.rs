//! Full HTML page around a rendered body.

use std::fmt::Write;

use crate::highlight::highlight_css;
use crate::state::escape_html;

/// Fixed stylesheet for paginated output.
pub const BASE_CSS: &str = r#":root {
  --text: #24292f;
  --muted: #57606a;
  --border: #d0d7de;
  --code-bg: #f6f8fa;
}

@page {
  size: A4;
  margin: 100pt 72pt;
  @bottom-right { content: "Page " counter(page); font-size: 8pt; color: var(--muted); }
}

html, body {
  margin: 0;
  padding: 0;
  color: var(--text);
  font-family: "Liberation Sans", "Noto Sans", Helvetica, Arial, sans-serif;
  font-size: 10pt;
  line-height: 1.5;
}

h1, h2, h3, h4, h5, h6 { font-weight: 600; line-height: 1.25; margin: 1.2em 0 .6em; }
h1 { font-size: 18pt; border-bottom: 1px solid var(--border); padding-bottom: .3em; }
h2 { font-size: 14pt; border-bottom: 1px solid var(--border); padding-bottom: .3em; }
h3 { font-size: 12pt; }
h4 { font-size: 11pt; }

p, ul, ol, blockquote, table, pre, figure { margin: .75em 0; }
ul, ol { padding-left: 2em; }
blockquote { padding: 0 1em; color: var(--muted); border-left: .25em solid var(--border); }
a { color: #0969da; text-decoration: none; }

code, pre {
  font-family: "Liberation Mono", ui-monospace, Menlo, Consolas, monospace;
  font-size: 8pt;
}
pre { background: var(--code-bg); padding: 8pt; border-radius: 4pt; white-space: pre-wrap; }

table {
  width: 100%;
  border-collapse: collapse;
  table-layout: fixed;
  overflow-wrap: break-word;
  font-size: 8pt;
}
th, td { border: 1px solid var(--border); padding: 2px 4px; overflow-wrap: break-word; hyphens: auto; }
th { background: #f3f4f6; font-weight: bold; }
table[data-wide="true"] { font-size: 6.5pt; }
table[data-wide="true"] th, table[data-wide="true"] td { padding: 1px 2px; }

dl { margin: .75em 0; }
dt { font-weight: 600; }
dd { margin: 0 0 .5em 2em; }
sup.footnote-ref { font-size: 7pt; line-height: 0; }
section.footnotes { margin-top: 2em; border-top: 1px solid var(--border); font-size: 8pt; color: var(--muted); }
section.footnotes p { display: inline; margin: 0; }
a.footnote-backref { margin-left: .3em; }

hr { border: none; border-top: 1px solid var(--border); margin: 1.5em 0; }
img { max-width: 100%; }
figure.diagram { text-align: center; }
.diagram-placeholder {
  background: #f8f9fa;
  border: 2px dashed #dee2e6;
  padding: 16pt;
  text-align: center;
  color: #6c757d;
  font-style: italic;
}
"#;

/// Builder for a standalone HTML page.
pub struct HtmlDocument<'a> {
    body: &'a str,
    title: Option<&'a str>,
    user_css: Option<&'a str>,
    marker: Option<&'a str>,
}

/// Quote `text` as a CSS string literal.
fn css_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => {}
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl<'a> HtmlDocument<'a> {
    #[must_use]
    pub fn new(body: &'a str) -> Self {
        Self {
            body,
            title: None,
            user_css: None,
            marker: None,
        }
    }

    /// Set the `<title>`; defaults to "Document".
    #[must_use]
    pub fn title(mut self, title: Option<&'a str>) -> Self {
        self.title = title;
        self
    }

    /// Append caller CSS after the fixed stylesheet.
    #[must_use]
    pub fn user_css(mut self, css: Option<&'a str>) -> Self {
        self.user_css = css.filter(|css| !css.trim().is_empty());
        self
    }

    /// Print `marker` centred in every page header.
    #[must_use]
    pub fn marker(mut self, marker: Option<&'a str>) -> Self {
        self.marker = marker.filter(|m| !m.is_empty());
        self
    }

    fn stylesheet(&self) -> String {
        let mut css = String::from(BASE_CSS);
        if let Some(marker) = self.marker {
            write!(
                css,
                "\n@page {{ @top-center {{ content: {}; font-size: 8pt; color: var(--muted); }} }}\n",
                css_string(marker)
            )
            .unwrap();
        }
        css.push_str("\n/* syntax highlighting */\n");
        css.push_str(&highlight_css());
        if let Some(user_css) = self.user_css {
            css.push_str("\n/* user CSS overrides */\n");
            css.push_str(user_css);
        }
        css
    }

    /// Render the complete page.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>{css}</style>
</head>
<body>
  <article class="markdown-body">
{body}
  </article>
</body>
</html>
"#,
            title = escape_html(self.title.unwrap_or("Document")),
            css = self.stylesheet(),
            body = self.body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_css_comes_last() {
        let page = HtmlDocument::new("<p>x</p>")
            .user_css(Some("p { color: red; }"))
            .render();
        let base = page.find("table[data-wide=\"true\"]").unwrap();
        let user = page.find("/* user CSS overrides */\np { color: red; }").unwrap();
        assert!(base < user);
        assert!(page.contains("<p>x</p>"));
    }

    #[test]
    fn test_blank_user_css_is_ignored() {
        let page = HtmlDocument::new("").user_css(Some("  ")).render();
        assert!(!page.contains("user CSS overrides"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = HtmlDocument::new("").title(Some("A & B")).render();
        assert!(page.contains("<title>A &amp; B</title>"));
        assert!(HtmlDocument::new("").render().contains("<title>Document</title>"));
    }

    #[test]
    fn test_marker() {
        let page = HtmlDocument::new("").marker(Some("Internal \"only\"")).render();
        assert!(page.contains(r#"@top-center { content: "Internal \"only\"";"#));
        assert!(!HtmlDocument::new("").render().contains("@top-center"));
    }

    #[test]
    fn test_css_string() {
        assert_eq!(css_string("a\\b\n"), r#""a\\b""#);
    }
}
