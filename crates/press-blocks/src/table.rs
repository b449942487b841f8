//! Pipe table row parsing.

use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-:\s]+$").expect("valid separator regex"));

/// Rows of a pipe table, header first.
///
/// Separator rows (`|---|:---:|`) are never stored. Rows may be shorter than
/// the header; missing trailing cells read as empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRows {
    rows: Vec<Vec<String>>,
}

impl TableRows {
    /// Parse raw table lines.
    ///
    /// Each line is split on `|`, pieces are trimmed, and empty pieces are
    /// dropped. Returns `None` when fewer than two rows remain.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Option<Self> {
        let rows = lines
            .iter()
            .map(|line| split_row(line.as_ref()))
            .filter(|cells| !cells.is_empty())
            .filter(|cells| !is_separator_row(cells))
            .collect();
        Self::from_rows(rows)
    }

    /// Build from already-split rows, applying the same checks as [`parse`](Self::parse).
    pub fn from_rows(rows: Vec<Vec<String>>) -> Option<Self> {
        let rows: Vec<_> = rows
            .into_iter()
            .filter(|cells| !cells.is_empty() && !is_separator_row(cells))
            .collect();
        if rows.len() < 2 {
            return None;
        }
        Some(Self { rows })
    }

    /// All rows including the header.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Header row.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Rows after the header.
    #[must_use]
    pub fn body(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    /// Number of columns, defined by the header row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows[0].len()
    }

    /// Cell text, or `""` for a missing cell.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_owned)
        .collect()
}

fn is_separator_row(cells: &[String]) -> bool {
    cells.iter().all(|cell| SEPARATOR_CELL.is_match(cell))
}
