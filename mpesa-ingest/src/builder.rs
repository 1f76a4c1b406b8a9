//! Ledger builder: raw extracted tables in, one normalized ledger out.
//!
//! Pipeline:
//! 1. select transaction tables (pluggable policy)
//! 2. normalize headers and concatenate by column name, dropping repeated
//!    header rows left behind by page breaks
//! 3. drop the synthetic `Unnamed: 0` index column
//! 4. require `Completion Time`, parse timestamps (unparsable -> Unparsed)
//! 5. fill nulls per [`NullPolicy`], coerce monetary columns
//!
//! Structural problems abort with [`BuildError`]. Bad cells never do.

use mpesa_core::columns::{
    self, BALANCE, COMPLETION_TIME, DETAILS, INDEX_COLUMN, PAID_IN, WITHDRAWN,
};
use mpesa_core::{Amount, Cell, CompletionTime, Ledger, TransactionRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::BuildError;
use crate::header::{normalize_header, normalize_headers};
use crate::policy::{AlternatingAfterCover, TableSelectionPolicy};
use crate::types::RawTable;

/// What a null cell becomes in the ledger.
///
/// Under `ZeroFill` a blank amount and an explicit zero are indistinguishable.
/// `KeepMissing` carries [`Amount::Missing`] through so callers can tell them
/// apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullPolicy {
    #[default]
    ZeroFill,
    KeepMissing,
}

pub struct LedgerBuilder {
    policy: Box<dyn TableSelectionPolicy>,
    null_policy: NullPolicy,
    expected_columns: Vec<String>,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self {
            policy: Box::new(AlternatingAfterCover::default()),
            null_policy: NullPolicy::default(),
            expected_columns: [DETAILS, PAID_IN, WITHDRAWN, BALANCE]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn with_policy(self, policy: impl TableSelectionPolicy + 'static) -> Self {
        self.with_boxed_policy(Box::new(policy))
    }

    pub fn with_boxed_policy(mut self, policy: Box<dyn TableSelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_null_policy(mut self, null_policy: NullPolicy) -> Self {
        self.null_policy = null_policy;
        self
    }

    /// Optional columns whose absence is logged (never fatal).
    pub fn with_expected_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.expected_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn build(&self, tables: &[RawTable]) -> Result<Ledger, BuildError> {
        let selected = self.policy.select(tables)?;
        if selected.is_empty() {
            return Err(BuildError::NoTablesSelected {
                policy: self.policy.name().to_string(),
            });
        }
        debug!(
            policy = self.policy.name(),
            extracted = tables.len(),
            selected = selected.len(),
            "selected transaction tables"
        );

        let mut combined = concat_by_name(&selected);
        combined.drop_column(INDEX_COLUMN);

        let time_col = combined
            .position(COMPLETION_TIME)
            .ok_or_else(|| BuildError::MissingColumn {
                column: COMPLETION_TIME.to_string(),
            })?;

        for expected in &self.expected_columns {
            if combined.position(expected).is_none() {
                warn!(column = %expected, "expected column missing; values will be null-filled");
            }
        }

        let details_col = combined.position(DETAILS);
        let paid_in_col = combined.position(PAID_IN);
        let withdrawn_col = combined.position(WITHDRAWN);
        let balance_col = combined.position(BALANCE);
        let extra_cols: Vec<usize> = (0..combined.columns.len())
            .filter(|&i| !columns::is_known(&combined.columns[i]))
            .collect();

        let records = combined
            .rows
            .iter()
            .map(|row| {
                let get = |col: Option<usize>| col.map(|i| &row.cells[i]);
                TransactionRecord {
                    completion_time: CompletionTime::from_cell(&row.cells[time_col]),
                    details: self.details(get(details_col)),
                    paid_in: self.amount(get(paid_in_col)),
                    withdrawn: self.amount(get(withdrawn_col)).abs(),
                    balance: self.amount(get(balance_col)),
                    source_table: row.source_table,
                    extra: extra_cols
                        .iter()
                        .map(|&i| (combined.columns[i].clone(), self.fill(&row.cells[i])))
                        .collect(),
                }
            })
            .collect();

        let ledger = Ledger::new(combined.columns, records);
        report(&ledger);
        Ok(ledger)
    }

    fn amount(&self, cell: Option<&Cell>) -> Amount {
        match cell {
            None | Some(Cell::Null) => match self.null_policy {
                NullPolicy::ZeroFill => Amount::ZERO,
                NullPolicy::KeepMissing => Amount::Missing,
            },
            Some(c) => Amount::coerce(c),
        }
    }

    fn details(&self, cell: Option<&Cell>) -> String {
        match cell {
            Some(Cell::Text(s)) => s.split_whitespace().collect::<Vec<_>>().join(" "),
            Some(Cell::Number(n)) => n.to_string(),
            None | Some(Cell::Null) => match self.null_policy {
                NullPolicy::ZeroFill => "0".to_string(),
                NullPolicy::KeepMissing => String::new(),
            },
        }
    }

    fn fill(&self, cell: &Cell) -> Cell {
        if cell.is_null() && self.null_policy == NullPolicy::ZeroFill {
            Cell::Number(0.0)
        } else {
            cell.clone()
        }
    }
}

/// Build with the default layout policy and zero-fill.
pub fn build_ledger(tables: &[RawTable]) -> Result<Ledger, BuildError> {
    LedgerBuilder::new().build(tables)
}

fn report(ledger: &Ledger) {
    info!(rows = ledger.len(), columns = ledger.columns().len(), "ledger built");

    let anomalies = ledger.anomalies();
    if !anomalies.is_clean() {
        warn!(
            unparsed_times = anomalies.unparsed_times,
            unparsed_amounts = anomalies.unparsed_amounts,
            "cell-level anomalies absorbed"
        );
    }

    let violations = ledger.validate();
    if !violations.is_empty() {
        warn!(
            count = violations.len(),
            first_row = violations[0].row,
            "rows with both Paid In and Withdrawn set"
        );
    }
}

struct CombinedRow {
    source_table: usize,
    cells: Vec<Cell>,
}

struct Combined {
    columns: Vec<String>,
    rows: Vec<CombinedRow>,
}

impl Combined {
    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn drop_column(&mut self, name: &str) {
        if let Some(i) = self.position(name) {
            self.columns.remove(i);
            for row in &mut self.rows {
                row.cells.remove(i);
            }
        }
    }
}

/// Concatenate tables by column name. The unified header is the union of
/// all headers in first-seen order; cells a table lacks are null.
fn concat_by_name(tables: &[&RawTable]) -> Combined {
    let headers: Vec<Vec<String>> = tables
        .iter()
        .map(|t| normalize_headers(&t.columns))
        .collect();

    let mut columns: Vec<String> = Vec::new();
    for h in headers.iter().flatten() {
        if !columns.contains(h) {
            columns.push(h.clone());
        }
    }

    let mut rows = Vec::new();
    for (table, header) in tables.iter().zip(&headers) {
        // Duplicate names within one table: first occurrence wins.
        let mut mapping: Vec<Option<usize>> = Vec::with_capacity(header.len());
        for (i, name) in header.iter().enumerate() {
            let first = header.iter().position(|h| h == name) == Some(i);
            mapping.push(if first {
                columns.iter().position(|c| c == name)
            } else {
                None
            });
        }

        let mut repeated_headers = 0;
        for raw in &table.rows {
            if is_header_repeat(raw, header) {
                repeated_headers += 1;
                continue;
            }
            let mut cells = vec![Cell::Null; columns.len()];
            for (i, cell) in raw.iter().enumerate() {
                if let Some(Some(target)) = mapping.get(i) {
                    cells[*target] = cell.clone();
                }
            }
            rows.push(CombinedRow {
                source_table: table.index,
                cells,
            });
        }

        if repeated_headers > 0 {
            debug!(table = table.index, repeated_headers, "dropped repeated header rows");
        }
    }

    Combined { columns, rows }
}

/// A data row that just repeats the header (page-break artefact): every
/// non-null cell equals its column name, and those cells cover at least half
/// of the named columns.
fn is_header_repeat(row: &[Cell], header: &[String]) -> bool {
    let named = header.iter().filter(|h| !h.starts_with("Unnamed: ")).count();
    let mut matched = 0;
    for (i, cell) in row.iter().enumerate() {
        match cell {
            Cell::Null => continue,
            Cell::Text(s) => {
                if header.get(i).map(String::as_str) != Some(normalize_header(s, i).as_str()) {
                    return false;
                }
                matched += 1;
            }
            Cell::Number(_) => return false,
        }
    }
    matched > 0 && matched * 2 >= named
}
