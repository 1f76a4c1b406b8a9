//! tabula-java JSON output reader
//!
//! `tabula --format JSON` prints one object per detected table:
//!   [{"extraction_method":"lattice","page_number":2,...,
//!     "data":[[{"top":..,"left":..,"text":"Receipt No."}, ...], ...]}]
//!
//! The first row of each table is its header.

use mpesa_core::Cell;
use serde::Deserialize;
use std::io::Read;

use crate::error::ExtractError;
use crate::types::RawTable;

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

/// Read tabula JSON from any reader (a file, or the engine's stdout).
pub fn read_tabula_json<R: Read>(reader: R) -> Result<Vec<RawTable>, ExtractError> {
    let tables: Vec<TabulaTable> = serde_json::from_reader(reader)
        .map_err(|e| ExtractError::Unsupported(format!("unreadable tabula output: {e}")))?;
    Ok(into_raw_tables(tables))
}

pub fn parse_tabula_json(text: &str) -> Result<Vec<RawTable>, ExtractError> {
    read_tabula_json(text.as_bytes())
}

fn into_raw_tables(tables: Vec<TabulaTable>) -> Vec<RawTable> {
    tables
        .into_iter()
        .enumerate()
        .map(|(index, table)| {
            let mut rows = table.data.into_iter();
            let columns = rows
                .next()
                .map(|header| header.into_iter().map(|c| c.text).collect())
                .unwrap_or_default();
            let rows = rows
                .map(|row| row.iter().map(|c| Cell::from_extracted(&c.text)).collect())
                .collect();
            RawTable::new(index, columns, rows)
        })
        .collect()
}
