//! Content-aware table column widths.
//!
//! Columns are classified by the longest cell they contain. Narrow and
//! medium columns receive fixed budgets (shrunk if together they would take
//! more than half the page), wide columns share what is left in proportion
//! to their content length, each capped at a fraction of the page. A final
//! proportional scale keeps the table inside the available width.

use crate::table::TableRows;

/// A4 page width in points.
pub const A4_WIDTH_PT: f32 = 595.2756;

/// Left and right page margin in points.
pub const PAGE_SIDE_MARGIN_PT: f32 = 72.0;

/// Longest cell (in characters) for a narrow column.
pub const NARROW_MAX_CHARS: usize = 3;

/// Longest cell (in characters) for a medium column.
pub const MEDIUM_MAX_CHARS: usize = 15;

/// Width budget of a narrow column in points.
pub const NARROW_COLUMN_WIDTH: f32 = 30.0;

/// Width budget of a medium column in points.
pub const MEDIUM_COLUMN_WIDTH: f32 = 70.0;

/// Share of the available width that fixed budgets may occupy together.
pub const FIXED_SHARE_LIMIT: f32 = 0.5;

/// Largest share of the available width a single wide column may take.
pub const WIDE_COLUMN_CAP: f32 = 0.8;

/// Tables with more columns than this are rendered in compact "wide" mode.
pub const WIDE_TABLE_COLUMNS: usize = 6;

/// Width between the side margins of an A4 page.
#[must_use]
pub fn available_page_width() -> f32 {
    A4_WIDTH_PT - 2.0 * PAGE_SIDE_MARGIN_PT
}

/// Column size class derived from its longest cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeClass {
    Narrow,
    Medium,
    Wide,
}

impl SizeClass {
    /// Classify a column by its maximum content length in characters.
    #[must_use]
    pub fn for_length(max_chars: usize) -> Self {
        if max_chars <= NARROW_MAX_CHARS {
            Self::Narrow
        } else if max_chars <= MEDIUM_MAX_CHARS {
            Self::Medium
        } else {
            Self::Wide
        }
    }

    fn fixed_budget(self) -> Option<f32> {
        match self {
            Self::Narrow => Some(NARROW_COLUMN_WIDTH),
            Self::Medium => Some(MEDIUM_COLUMN_WIDTH),
            Self::Wide => None,
        }
    }
}

/// Width assigned to one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnWidth {
    pub index: usize,
    pub width: f32,
    pub class: SizeClass,
}

/// Column widths for a table, in points.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnWidthPlan {
    columns: Vec<ColumnWidth>,
    available_width: f32,
}

impl ColumnWidthPlan {
    /// Compute widths for `table` within `available_width` points.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(table: &TableRows, available_width: f32) -> Self {
        let column_count = table.column_count();
        let max_lengths: Vec<usize> = (0..column_count)
            .map(|column| {
                table
                    .rows()
                    .iter()
                    .map(|row| row.get(column).map_or(0, |cell| cell.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let classes: Vec<SizeClass> = max_lengths
            .iter()
            .map(|&len| SizeClass::for_length(len))
            .collect();

        let fixed_total: f32 = classes.iter().filter_map(|c| c.fixed_budget()).sum();
        let fixed_limit = available_width * FIXED_SHARE_LIMIT;
        let fixed_scale = if fixed_total > fixed_limit {
            fixed_limit / fixed_total
        } else {
            1.0
        };

        let remaining = (available_width - fixed_total * fixed_scale).max(0.0);
        let wide_total: usize = max_lengths
            .iter()
            .zip(&classes)
            .filter(|(_, class)| **class == SizeClass::Wide)
            .map(|(len, _)| *len)
            .sum();
        let wide_cap = available_width * WIDE_COLUMN_CAP;

        let mut columns: Vec<ColumnWidth> = classes
            .iter()
            .zip(&max_lengths)
            .enumerate()
            .map(|(index, (&class, &len))| {
                let width = match class.fixed_budget() {
                    Some(budget) => budget * fixed_scale,
                    None if wide_total > 0 => {
                        (remaining * len as f32 / wide_total as f32).min(wide_cap)
                    }
                    None => 0.0,
                };
                ColumnWidth {
                    index,
                    width,
                    class,
                }
            })
            .collect();

        let total: f32 = columns.iter().map(|c| c.width).sum();
        if total > available_width && total > 0.0 {
            let scale = available_width / total;
            for column in &mut columns {
                column.width *= scale;
            }
        }

        Self {
            columns,
            available_width,
        }
    }

    /// Per-column entries in column order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnWidth] {
        &self.columns
    }

    /// Widths in column order.
    #[must_use]
    pub fn widths(&self) -> Vec<f32> {
        self.columns.iter().map(|c| c.width).collect()
    }

    /// Sum of all column widths.
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Width the plan was computed for.
    #[must_use]
    pub fn available_width(&self) -> f32 {
        self.available_width
    }
}

/// Font sizes and cell padding for a table, tiered by column count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableStyle {
    pub header_font_size: u8,
    pub data_font_size: u8,
    pub padding: f32,
}

impl TableStyle {
    /// Choose the tier for a table with `columns` columns.
    #[must_use]
    pub fn for_columns(columns: usize) -> Self {
        let (header_font_size, data_font_size, padding) = match columns {
            n if n > 12 => (5, 5, 1.0),
            n if n > 8 => (6, 5, 1.5),
            n if n > WIDE_TABLE_COLUMNS => (7, 6, 2.0),
            _ => (8, 7, 3.0),
        };
        Self {
            header_font_size,
            data_font_size,
            padding,
        }
    }
}
