//! Element sink trait and laid-out tables.

use press_blocks::{ColumnWidthPlan, Span, TableRows, TableStyle, cell_lines};
use press_diagrams::DiagramOutcome;

use crate::error::DocumentError;

/// One table cell as lines of inline spans.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutCell {
    pub lines: Vec<Vec<Span>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRow {
    pub cells: Vec<LayoutCell>,
    pub header: bool,
}

/// A table ready for a sink: wrapped cell text, style tier and optional widths.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutTable {
    pub rows: Vec<LayoutRow>,
    pub column_count: usize,
    /// Column widths, present when the sink has a fixed page width.
    pub widths: Option<ColumnWidthPlan>,
    pub style: TableStyle,
}

impl LayoutTable {
    /// Lay out `table`. Every row gets exactly `column_count` cells: missing
    /// cells are empty and extra cells are dropped.
    #[must_use]
    pub fn build(table: &TableRows, available_width: Option<f32>) -> Self {
        let column_count = table.column_count();
        let rows = (0..table.rows().len())
            .map(|r| LayoutRow {
                cells: (0..column_count)
                    .map(|c| LayoutCell {
                        lines: cell_lines(table.cell(r, c)),
                    })
                    .collect(),
                header: r == 0,
            })
            .collect();

        Self {
            rows,
            column_count,
            widths: available_width.map(|width| ColumnWidthPlan::compute(table, width)),
            style: TableStyle::for_columns(column_count),
        }
    }
}

/// Receiver of styled document elements.
///
/// The assembler calls one method per block in document order, then
/// [`finish`](Self::finish) to obtain the document bytes.
pub trait ElementSink {
    /// Usable page width in points when the sink lays tables out at fixed
    /// widths. `None` lets the consumer size columns itself.
    fn available_width(&self) -> Option<f32> {
        None
    }

    fn heading(&mut self, level: u8, text: &str);

    fn paragraph(&mut self, spans: &[Span]);

    fn bullet(&mut self, indent: usize, spans: &[Span]);

    fn numbered(&mut self, number: u32, spans: &[Span]);

    fn code_block(&mut self, language: Option<&str>, text: &str);

    fn table(&mut self, table: &LayoutTable);

    fn diagram(&mut self, outcome: &DiagramOutcome);

    fn rule(&mut self);

    fn blank(&mut self);

    fn finish(self) -> Result<Vec<u8>, DocumentError>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(lines: &[&str]) -> TableRows {
        TableRows::parse(lines).unwrap()
    }

    #[test]
    fn test_build_pads_and_truncates_rows() {
        let table = LayoutTable::build(
            &rows(&["| A | B |", "|---|---|", "| 1 |", "| x | y | z |"]),
            None,
        );
        assert_eq!(table.column_count, 2);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].header);
        assert!(!table.rows[1].header);
        assert!(table.rows.iter().all(|r| r.cells.len() == 2));
        assert_eq!(table.rows[1].cells[1].lines, vec![Vec::<Span>::new()]);
        assert!(table.widths.is_none());
    }

    #[test]
    fn test_build_with_width_plan() {
        let table = LayoutTable::build(&rows(&["| A | B |", "| 1 | 2 |"]), Some(451.0));
        let plan = table.widths.unwrap();
        assert_eq!(plan.columns().len(), 2);
        assert!(plan.total_width() <= 451.0);
        assert_eq!(table.style, TableStyle::for_columns(2));
    }
}
