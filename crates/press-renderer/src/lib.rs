//! Markdown to styled HTML for the HTML/CSS PDF engine.
//!
//! [`HtmlRenderer`] walks pulldown-cmark events and writes an HTML body:
//! fenced code is highlighted with syntect classes, tables with more than
//! [`press_blocks::WIDE_TABLE_COLUMNS`] columns are marked
//! `data-wide="true"`, and code block processors such as
//! [`DiagramProcessor`] may replace fences with other content.
//! [`HtmlDocument`] wraps a body in the full page with the fixed stylesheet
//! and optional user CSS.
//!
//! # Example
//!
//! ```
//! use press_renderer::{HtmlDocument, HtmlRenderer};
//!
//! let result = HtmlRenderer::new().render("# Report\n\n**Bold** text");
//! assert_eq!(result.title.as_deref(), Some("Report"));
//!
//! let page = HtmlDocument::new(&result.html)
//!     .title(result.title.as_deref())
//!     .user_css(Some("h1 { color: navy; }"))
//!     .render();
//! assert!(page.contains("/* user CSS overrides */"));
//! ```

mod code_block;
mod diagram;
mod document;
mod highlight;
mod renderer;
mod state;

pub use code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult};
pub use diagram::DiagramProcessor;
pub use document::{BASE_CSS, HtmlDocument};
pub use highlight::{highlight_code, highlight_css};
pub use renderer::{HtmlRenderer, RenderResult};
pub use state::escape_html;
