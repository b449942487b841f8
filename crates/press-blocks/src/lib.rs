//! Block-level structure of markdown documents for paginated output.
//!
//! This crate turns raw markdown text into a flat sequence of [`Block`]s and
//! computes how tables should be laid out on a fixed-width page:
//!
//! - [`classify`]: lazy line-oriented state machine (normal / in code / in table)
//! - [`Fence`]: opening and closing rule for fenced code blocks
//! - [`TableRows`]: table rows with separator rows removed
//! - [`ColumnWidthPlan`]: content-aware column widths for a given page width
//! - [`TableStyle`]: font sizes and padding tiered by column count
//! - [`parse_spans`] and [`cell_lines`]: inline bold markup and cell wrapping
//!
//! # Example
//!
//! ```
//! use press_blocks::{Block, classify};
//!
//! let blocks: Vec<Block> = classify("# Title\n\nHello").collect();
//! assert_eq!(blocks.len(), 3);
//! ```

mod block;
mod classifier;
mod fence;
mod inline;
mod layout;
mod table;

pub use block::{Block, DIAGRAM_LANGUAGES, is_diagram_language};
pub use classifier::{Blocks, classify};
pub use fence::Fence;
pub use inline::{CELL_WRAP_THRESHOLD, Span, cell_lines, parse_spans, plain_text};
pub use layout::{
    A4_WIDTH_PT, ColumnWidth, ColumnWidthPlan, FIXED_SHARE_LIMIT, MEDIUM_COLUMN_WIDTH,
    MEDIUM_MAX_CHARS, NARROW_COLUMN_WIDTH, NARROW_MAX_CHARS, PAGE_SIDE_MARGIN_PT, SizeClass,
    TableStyle, WIDE_COLUMN_CAP, WIDE_TABLE_COLUMNS, available_page_width,
};
pub use table::TableRows;
