//! Raw cell values as they come out of the table extraction engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of an extracted table. Extraction engines hand back a mix of
/// strings, numbers and blanks; nothing about a column's type is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Blank strings are treated as nulls, matching how extraction engines
    /// emit empty cells.
    pub fn from_extracted(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Null
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}
