//! Table row accumulation.

use super::inline::format_inline;
use super::symbols::normalize_symbols;
use crate::model::{Paragraph, Table, TableCell, TableRow};

/// Buffers consecutive table rows until the table is complete.
#[derive(Debug, Clone, Default)]
pub struct TableAccumulator {
    title: Option<String>,
    rows: Vec<Vec<String>>,
}

impl TableAccumulator {
    /// Start a table, optionally carrying a title captured from a preceding line.
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            rows: Vec::new(),
        }
    }

    /// Buffer one row of raw cell texts.
    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Number of buffered rows, separators included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows are buffered.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finish the table.
    ///
    /// Separator rows are dropped and the first surviving row fixes the
    /// column count: longer rows are truncated, shorter rows padded. The
    /// first row becomes a bold header. A table with no surviving rows is
    /// still returned so that its title is not lost.
    pub fn freeze(self, normalize: bool) -> Table {
        let mut table = Table::new();
        table.title = self.title;

        let mut rows = self.rows.into_iter().filter(|r| !is_separator_row(r));
        let Some(first) = rows.next() else {
            log::debug!("Table has no rows after separator removal");
            return table;
        };
        let columns = first.len();

        let mut header = build_row(first, columns, normalize);
        header.is_header = true;
        for cell in &mut header.cells {
            cell.content.embolden();
        }
        table.add_row(header);

        for cells in rows {
            table.add_row(build_row(cells, columns, normalize));
        }

        log::debug!(
            "Table frozen: {} rows x {} columns",
            table.row_count(),
            columns
        );
        table
    }
}

/// A header-separator row such as `|---|:---:|`.
pub fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            !c.is_empty() && c.contains('-') && c.chars().all(|ch| ch == '-' || ch == ':')
        })
}

fn build_row(mut cells: Vec<String>, columns: usize, normalize: bool) -> TableRow {
    cells.resize(columns, String::new());
    TableRow::new(
        cells
            .into_iter()
            .map(|text| {
                if text.is_empty() {
                    return TableCell::empty();
                }
                let text = if normalize {
                    normalize_symbols(&text)
                } else {
                    text
                };
                TableCell::with_content(Paragraph::with_runs(format_inline(&text)))
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator_row(&row(&["---", ":---:", "--:"])));
        assert!(!is_separator_row(&row(&["---", ""])));
        assert!(!is_separator_row(&row(&[":::"])));
        assert!(!is_separator_row(&row(&["-1", "2"])));
        assert!(!is_separator_row(&[]));
    }

    #[test]
    fn test_separator_removal() {
        let mut acc = TableAccumulator::new(None);
        acc.push_row(row(&["x", "y"]));
        acc.push_row(row(&["---", "---"]));
        acc.push_row(row(&["1", "2"]));
        assert_eq!(acc.len(), 3);

        let table = acc.freeze(false);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[1].texts(), vec!["1", "2"]);
    }

    #[test]
    fn test_header_row_is_bold() {
        let mut acc = TableAccumulator::new(Some("**Table 1: Prevalence**".to_string()));
        acc.push_row(row(&["Gene", "*n*"]));
        acc.push_row(row(&["blaKPC", "12"]));

        let table = acc.freeze(false);
        assert_eq!(table.title.as_deref(), Some("**Table 1: Prevalence**"));
        let header = table.header().unwrap();
        assert!(header.cells.iter().all(|c| c.content.runs.iter().all(|r| r.style.bold)));
        assert!(header.cells[1].content.runs[0].style.italic);
        assert!(!table.rows[1].cells[0].content.runs[0].style.bold);
    }

    #[test]
    fn test_ragged_rows() {
        let mut acc = TableAccumulator::new(None);
        acc.push_row(row(&["a", "b"]));
        acc.push_row(row(&["1"]));
        acc.push_row(row(&["1", "2", "3"]));

        let table = acc.freeze(false);
        assert_eq!(table.rows[1].texts(), vec!["1", ""]);
        assert_eq!(table.rows[2].texts(), vec!["1", "2"]);
    }

    #[test]
    fn test_only_separators_keeps_title() {
        let mut acc = TableAccumulator::new(Some("**Table 2**".to_string()));
        acc.push_row(row(&["---"]));

        let table = acc.freeze(false);
        assert!(table.is_empty());
        assert_eq!(table.title.as_deref(), Some("**Table 2**"));
    }

    #[test]
    fn test_cells_are_formatted() {
        let mut acc = TableAccumulator::new(None);
        acc.push_row(row(&["Model", "Fit"]));
        acc.push_row(row(&["OLS[2]", "R-squared"]));

        let table = acc.freeze(true);
        let cells = &table.rows[1].cells;
        assert_eq!(cells[0].content.runs.len(), 2);
        assert!(cells[0].content.runs[1].style.superscript);
        assert_eq!(cells[1].plain_text(), "R²");
    }
}
