//! The normalized transaction ledger and its integrity checks.

use serde::{Deserialize, Serialize};

use crate::amount::{Amount, sum_amounts};
use crate::record::TransactionRecord;

/// A row that is both a credit and a debit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusivityViolation {
    /// Position of the row in the ledger
    pub row: usize,
    pub details: String,
    pub paid_in: f64,
    pub withdrawn: f64,
}

/// Cell-level anomalies absorbed during the build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCounts {
    pub unparsed_times: usize,
    pub unparsed_amounts: usize,
    pub missing_amounts: usize,
}

impl AnomalyCounts {
    pub fn is_clean(&self) -> bool {
        self.unparsed_times == 0 && self.unparsed_amounts == 0
    }
}

/// Transactions in extraction order (not chronological).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    columns: Vec<String>,
    records: Vec<TransactionRecord>,
}

impl Ledger {
    pub fn new(columns: Vec<String>, records: Vec<TransactionRecord>) -> Self {
        Self { columns, records }
    }

    /// Unified column names of the concatenated tables
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn head(&self, n: usize) -> &[TransactionRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn total_paid_in(&self) -> f64 {
        sum_amounts(self.records.iter().map(|r| &r.paid_in))
    }

    /// Total debited magnitude
    pub fn total_withdrawn(&self) -> f64 {
        sum_amounts(self.records.iter().map(|r| &r.withdrawn)).abs()
    }

    /// Rows that are simultaneously a credit and a debit.
    pub fn validate(&self) -> Vec<ExclusivityViolation> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_exclusive())
            .map(|(row, r)| ExclusivityViolation {
                row,
                details: r.details.clone(),
                paid_in: r.paid_in.value(),
                withdrawn: r.withdrawn.value(),
            })
            .collect()
    }

    pub fn anomalies(&self) -> AnomalyCounts {
        let mut counts = AnomalyCounts::default();
        for r in &self.records {
            if !r.completion_time.is_parsed() {
                counts.unparsed_times += 1;
            }
            for a in [&r.paid_in, &r.withdrawn, &r.balance] {
                match a {
                    Amount::Unparsed(_) => counts.unparsed_amounts += 1,
                    Amount::Missing => counts.missing_amounts += 1,
                    Amount::Number(_) => {}
                }
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, CompletionTime};

    fn rec(details: &str, paid_in: Amount, withdrawn: Amount) -> TransactionRecord {
        TransactionRecord::new(
            CompletionTime::from_cell(&Cell::text("2024-01-05 10:00:00")),
            details,
            paid_in,
            withdrawn,
            Amount::ZERO,
        )
    }

    #[test]
    fn test_totals_skip_unparsed() {
        let ledger = Ledger::new(
            vec![],
            vec![
                rec("Pay Bill", Amount::ZERO, Amount::Number(1000.0)),
                rec("Salary", Amount::Number(5000.0), Amount::ZERO),
                rec("Junk", Amount::ZERO, Amount::Unparsed("N/A".into())),
            ],
        );
        assert_eq!(ledger.total_withdrawn(), 1000.0);
        assert_eq!(ledger.total_paid_in(), 5000.0);
        assert_eq!(ledger.anomalies().unparsed_amounts, 1);
    }

    #[test]
    fn test_validate_flags_violations() {
        let ledger = Ledger::new(
            vec![],
            vec![
                rec("Salary", Amount::Number(5000.0), Amount::ZERO),
                rec("Both", Amount::Number(20.0), Amount::Number(30.0)),
            ],
        );
        let v = ledger.validate();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].row, 1);
        assert_eq!(v[0].details, "Both");
        assert_eq!(v[0].withdrawn, 30.0);
    }

    #[test]
    fn test_head_is_bounded() {
        let ledger = Ledger::new(vec![], vec![rec("a", Amount::ZERO, Amount::Number(1.0))]);
        assert_eq!(ledger.head(10).len(), 1);
    }
}
