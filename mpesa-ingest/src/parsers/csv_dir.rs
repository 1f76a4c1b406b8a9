//! Tables exported as CSV, one file per table.
//!
//! Files are read in file-name order (`table-00.csv`, `table-01.csv`, ...)
//! and the first record of each file is its header.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use mpesa_core::Cell;
use tracing::debug;

use crate::error::ExtractError;
use crate::types::RawTable;

pub fn read_csv_table<R: Read>(index: usize, reader: R) -> Result<RawTable, ExtractError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut records = rdr.records();
    let columns = match records.next() {
        Some(header) => header
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(Cell::from_extracted).collect());
    }

    Ok(RawTable::new(index, columns, rows))
}

/// Read every `*.csv` in `dir` as one table each.
pub fn read_csv_dir(dir: impl AsRef<Path>) -> Result<Vec<RawTable>, ExtractError> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        debug!(index, path = %path.display(), "reading csv table");
        tables.push(read_csv_table(index, File::open(path)?)?);
    }
    Ok(tables)
}

fn csv_error(e: csv::Error) -> ExtractError {
    ExtractError::Corrupt(format!("malformed csv: {e}"))
}
