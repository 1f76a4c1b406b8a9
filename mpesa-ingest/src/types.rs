use mpesa_core::Cell;
use serde::{Deserialize, Serialize};

static NULL_CELL: Cell = Cell::Null;

/// A table as returned by the extraction engine, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Position among all tables extracted from the statement
    pub index: usize,
    /// Header cells as extracted (possibly blank or split across lines)
    pub columns: Vec<String>,
    /// Data rows; may be shorter or longer than `columns`
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(index: usize, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            index,
            columns,
            rows,
        }
    }

    /// Build from a header row plus text rows. Blank text becomes `Cell::Null`.
    pub fn from_text_rows(index: usize, header: &[&str], rows: &[Vec<&str>]) -> Self {
        Self {
            index,
            columns: header.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| Cell::from_extracted(s)).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`; ragged rows read as null.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL_CELL)
    }
}
