//! Markdown event walker producing an HTML body.

use std::fmt::Write;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use press_blocks::WIDE_TABLE_COLUMNS;

use crate::code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult, fence_language};
use crate::highlight::highlight_code;
use crate::state::{CodeBlockState, FootnoteState, ImageState, TitleState, escape_html};

/// Rendered HTML body.
#[derive(Clone, Debug)]
pub struct RenderResult {
    pub html: String,
    /// Plain text of the first level-1 heading.
    pub title: Option<String>,
}

/// Markdown to HTML body renderer.
///
/// Processors registered with [`with_processor`](Self::with_processor) get
/// the first say on each fenced block, in registration order.
pub struct HtmlRenderer {
    output: String,
    code: CodeBlockState,
    image: ImageState,
    title: TitleState,
    footnotes: FootnoteState,
    /// Alignments of the current table's columns.
    alignments: Vec<Alignment>,
    in_table_head: bool,
    cell_index: usize,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn alignment_style(alignment: Option<&Alignment>) -> &'static str {
    match alignment {
        Some(Alignment::Left) => r#" style="text-align:left""#,
        Some(Alignment::Center) => r#" style="text-align:center""#,
        Some(Alignment::Right) => r#" style="text-align:right""#,
        Some(Alignment::None) | None => "",
    }
}

impl HtmlRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            image: ImageState::default(),
            title: TitleState::default(),
            footnotes: FootnoteState::default(),
            alignments: Vec::new(),
            in_table_head: false,
            cell_index: 0,
            processors: Vec::new(),
            code_block_index: 0,
        }
    }

    /// Add a code block processor.
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Blocks captured by processors as placeholders.
    #[must_use]
    pub fn extracted_code_blocks(&self) -> Vec<ExtractedCodeBlock> {
        self.processors
            .iter()
            .flat_map(|p| p.extracted())
            .cloned()
            .collect()
    }

    /// Parse and render `markdown`, then let processors replace their placeholders.
    pub fn render(&mut self, markdown: &str) -> RenderResult {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_DEFINITION_LIST;
        for event in Parser::new_ext(markdown, options) {
            self.process_event(event);
        }

        let mut html = std::mem::take(&mut self.output);
        html.push_str(&self.footnotes.render());
        for processor in &mut self.processors {
            processor.post_process(&mut html);
        }

        RenderResult {
            html,
            title: self.title.take(),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.title.push_text(&code);
                write!(self.output, "<code>{}</code>", escape_html(&code)).unwrap();
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => {
                if self.code.is_active() {
                    self.code.push_str("\n");
                } else {
                    self.output.push('\n');
                }
            }
            Event::HardBreak => self.output.push_str("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                if checked {
                    self.output.push_str(r#"<input type="checkbox" checked disabled> "#);
                } else {
                    self.output.push_str(r#"<input type="checkbox" disabled> "#);
                }
            }
            Event::FootnoteReference(label) => {
                let (number, first) = self.footnotes.reference(&label);
                let id = if first {
                    format!(r#" id="fnref{number}""#)
                } else {
                    String::new()
                };
                write!(
                    self.output,
                    r##"<sup class="footnote-ref"><a href="#fn{number}"{id}>[{number}]</a></sup>"##
                )
                .unwrap();
            }
            Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                let level = heading_level(level);
                self.title.start_heading(level);
                write!(self.output, "<h{level}>").unwrap();
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(language);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                if alignments.len() > WIDE_TABLE_COLUMNS {
                    self.output.push_str(r#"<table data-wide="true">"#);
                } else {
                    self.output.push_str("<table>");
                }
                self.alignments = alignments;
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.cell_index = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                let style = alignment_style(self.alignments.get(self.cell_index));
                write!(self.output, "<{cell}{style}>").unwrap();
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_html(&dest_url)).unwrap();
            }
            Tag::Image { dest_url, title, .. } => {
                self.image.start(dest_url.to_string(), title.to_string());
            }
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::FootnoteDefinition(label) => {
                let output = std::mem::take(&mut self.output);
                self.footnotes.start_definition(&label, output);
            }
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                self.title.end_heading();
                write!(self.output, "</h{}>", heading_level(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
                self.cell_index += 1;
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&title))
                    };
                    write!(
                        self.output,
                        r#"<img src="{}"{title_attr} alt="{}">"#,
                        escape_html(&src),
                        escape_html(&alt)
                    )
                    .unwrap();
                }
            }
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::FootnoteDefinition => {
                let body = std::mem::take(&mut self.output);
                if let Some(output) = self.footnotes.end_definition(body) {
                    self.output = output;
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn end_code_block(&mut self) {
        let (language, content) = self.code.end();
        let index = self.code_block_index;
        self.code_block_index += 1;

        if let Some(language) = language.as_deref() {
            for processor in &mut self.processors {
                match processor.process(language, &content, index) {
                    ProcessResult::Placeholder(html) | ProcessResult::Inline(html) => {
                        self.output.push_str(&html);
                        return;
                    }
                    ProcessResult::PassThrough => {}
                }
            }
        }

        let class = language
            .as_deref()
            .map(|l| format!(r#" class="language-{}""#, escape_html(l)))
            .unwrap_or_default();
        write!(
            self.output,
            r#"<div class="highlight"><pre><code{class}>{}</code></pre></div>"#,
            highlight_code(language.as_deref(), &content)
        )
        .unwrap();
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.title.push_text(text);
            self.output.push_str(&escape_html(text));
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> RenderResult {
        HtmlRenderer::new().render(markdown)
    }

    #[test]
    fn test_paragraph_and_bold() {
        assert_eq!(
            render("Hello **world**").html,
            "<p>Hello <strong>world</strong></p>"
        );
    }

    #[test]
    fn test_title_from_first_h1() {
        let result = render("## Intro\n\n# Main `Title`\n\n# Other");
        assert_eq!(result.title.as_deref(), Some("Main Title"));
        assert!(result.html.contains("<h2>Intro</h2>"));
    }

    #[test]
    fn test_no_title() {
        assert_eq!(render("just text").title, None);
    }

    #[test]
    fn test_table_without_separator_row() {
        let html = render("| A | B |\n|---|---|\n| 1 | 2 |\n").html;
        assert_eq!(
            html,
            "<table><thead><tr><th>A</th><th>B</th></tr></thead><tbody>\
             <tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_wide_table_is_marked() {
        let header = "| a | b | c | d | e | f | g |";
        let separator = "|---|---|---|---|---|---|---|";
        let row = "| 1 | 2 | 3 | 4 | 5 | 6 | 7 |";
        let html = render(&format!("{header}\n{separator}\n{row}\n")).html;
        assert!(html.starts_with(r#"<table data-wide="true">"#), "html: {html}");
    }

    #[test]
    fn test_six_columns_not_wide() {
        let markdown = "| a | b | c | d | e | f |\n|---|---|---|---|---|---|\n\
                        | 1 | 2 | 3 | 4 | 5 | 6 |\n";
        let html = render(markdown).html;
        assert!(html.starts_with("<table>"));
    }

    #[test]
    fn test_alignment() {
        let html = render("| L | R |\n|:--|--:|\n| a | b |\n").html;
        assert!(html.contains(r#"<td style="text-align:right">b</td>"#));
    }

    #[test]
    fn test_code_block_is_highlighted_and_escaped() {
        let html = render("```rust\nlet x = a < b;\n```\n").html;
        assert!(html.starts_with(r#"<div class="highlight"><pre><code class="language-rust">"#));
        assert!(html.contains("&lt;"));
    }

    #[test]
    fn test_plain_code_block() {
        assert_eq!(
            render("```\n<x>\n```\n").html,
            r#"<div class="highlight"><pre><code>&lt;x&gt;
</code></pre></div>"#
        );
    }

    #[test]
    fn test_image_alt() {
        assert_eq!(
            render("![A chart](chart.png \"Sales\")").html,
            r#"<p><img src="chart.png" title="Sales" alt="A chart"></p>"#
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(
            render("3. three\n4. four").html,
            r#"<ol start="3"><li>three</li><li>four</li></ol>"#
        );
    }

    #[test]
    fn test_task_list() {
        let html = render("- [x] done\n- [ ] open").html;
        assert!(html.contains(r#"<input type="checkbox" checked disabled> done"#));
        assert!(html.contains(r#"<input type="checkbox" disabled> open"#));
    }

    #[test]
    fn test_footnote_reference_and_section() {
        let html = render("Claim[^1].\n\n[^1]: Source note.\n").html;
        assert!(
            html.starts_with(
                r##"<p>Claim<sup class="footnote-ref"><a href="#fn1" id="fnref1">[1]</a></sup>.</p>"##
            ),
            "html: {html}"
        );
        assert!(html.contains(
            r#"<section class="footnotes"><ol><li id="fn1" value="1"><p>Source note.</p>"#
        ));
        assert!(!html.contains("[^1]"));
    }

    #[test]
    fn test_footnotes_follow_reference_order() {
        let html = render("A[^b] and B[^a].\n\n[^a]: Alpha.\n\n[^b]: Beta.\n").html;
        let beta = html.find("<p>Beta.</p>").unwrap();
        let alpha = html.find("<p>Alpha.</p>").unwrap();
        assert!(beta < alpha, "html: {html}");
        assert!(html.contains(r#"<li id="fn1" value="1"><p>Beta.</p>"#));
    }

    #[test]
    fn test_repeated_footnote_reference_shares_number() {
        let html = render("One[^n] two[^n].\n\n[^n]: Note.\n").html;
        assert_eq!(html.matches(r#"id="fnref1""#).count(), 1);
        assert_eq!(html.matches("[1]</a></sup>").count(), 2);
    }

    #[test]
    fn test_no_footnotes_section_without_definitions() {
        assert!(!render("plain text").html.contains("footnotes"));
    }

    #[test]
    fn test_definition_list() {
        let html = render("Term\n: Definition\n").html;
        assert!(html.starts_with("<dl><dt>Term</dt><dd>"), "html: {html}");
        assert!(html.contains("Definition"));
        assert!(html.ends_with("</dd></dl>"), "html: {html}");
        assert!(!html.contains(": Definition"));
    }

    struct Upper(Vec<ExtractedCodeBlock>);

    impl CodeBlockProcessor for Upper {
        fn process(&mut self, language: &str, source: &str, index: usize) -> ProcessResult {
            if language != "upper" {
                return ProcessResult::PassThrough;
            }
            self.0.push(ExtractedCodeBlock {
                index,
                language: language.to_owned(),
                source: source.to_owned(),
            });
            ProcessResult::Placeholder(format!("<!--upper-{index}-->"))
        }

        fn post_process(&mut self, html: &mut String) {
            for block in &self.0 {
                *html = html.replace(
                    &format!("<!--upper-{}-->", block.index),
                    &block.source.to_uppercase(),
                );
            }
        }

        fn extracted(&self) -> &[ExtractedCodeBlock] {
            &self.0
        }
    }

    #[test]
    fn test_processor_placeholder_and_post_process() {
        let mut renderer = HtmlRenderer::new().with_processor(Upper(Vec::new()));
        let result = renderer.render("```text\na\n```\n\n```upper\nshout\n```\n");
        assert!(result.html.contains("SHOUT\n"));
        assert!(!result.html.contains("<!--upper-"));
        let extracted = renderer.extracted_code_blocks();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].index, 1);
    }
}
