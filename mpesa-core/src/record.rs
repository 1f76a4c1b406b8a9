//! Normalized ledger rows.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::cell::Cell;
use crate::time::parse_completion_time;

/// Completion timestamp of a transaction. Unparsable values are kept as
/// `Unparsed` so the row survives in the ledger listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CompletionTime {
    Parsed(NaiveDateTime),
    /// Original text, if the cell held any
    Unparsed(Option<String>),
}

impl CompletionTime {
    pub fn from_cell(cell: &Cell) -> Self {
        match cell {
            Cell::Text(s) => match parse_completion_time(s) {
                Some(dt) => CompletionTime::Parsed(dt),
                None => CompletionTime::Unparsed(Some(s.clone())),
            },
            Cell::Number(n) => CompletionTime::Unparsed(Some(n.to_string())),
            Cell::Null => CompletionTime::Unparsed(None),
        }
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CompletionTime::Parsed(dt) => Some(*dt),
            CompletionTime::Unparsed(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, CompletionTime::Parsed(_))
    }
}

/// One transaction of the statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub completion_time: CompletionTime,
    /// Counterparty or transaction type ("Pay Bill", merchant name, ...)
    pub details: String,
    /// Credited amount, zero when the row is a debit
    pub paid_in: Amount,
    /// Debited magnitude (non-negative when numeric)
    pub withdrawn: Amount,
    /// Running balance as printed on the statement
    pub balance: Amount,
    /// Index of the extracted table this row came from
    pub source_table: usize,
    /// Remaining named columns ("Receipt No.", "Transaction Status", ...)
    #[serde(default)]
    pub extra: Vec<(String, Cell)>,
}

impl TransactionRecord {
    pub fn new(
        completion_time: CompletionTime,
        details: impl Into<String>,
        paid_in: Amount,
        withdrawn: Amount,
        balance: Amount,
    ) -> Self {
        Self {
            completion_time,
            details: details.into(),
            paid_in,
            withdrawn,
            balance,
            source_table: 0,
            extra: Vec::new(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.completion_time.datetime().map(|dt| dt.date())
    }

    /// Calendar month (1-12); None when the timestamp did not parse
    pub fn month(&self) -> Option<u32> {
        self.completion_time.datetime().map(|dt| dt.month())
    }

    /// Day of month (1-31); None when the timestamp did not parse
    pub fn day_of_month(&self) -> Option<u32> {
        self.completion_time.datetime().map(|dt| dt.day())
    }

    /// A row is a credit or a debit, never both.
    pub fn is_exclusive(&self) -> bool {
        !(self.paid_in.is_nonzero() && self.withdrawn.is_nonzero())
    }

    pub fn is_debit(&self) -> bool {
        self.withdrawn.is_nonzero()
    }

    pub fn is_credit(&self) -> bool {
        self.paid_in.is_nonzero()
    }

    pub fn extra_value(&self, column: &str) -> Option<&Cell> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> CompletionTime {
        CompletionTime::from_cell(&Cell::text(s))
    }

    #[test]
    fn test_derived_month_and_day() {
        let r = TransactionRecord::new(
            at("2024-01-05 09:12:00"),
            "Pay Bill",
            Amount::ZERO,
            Amount::Number(1000.0),
            Amount::Number(4000.0),
        );
        assert_eq!(r.month(), Some(1));
        assert_eq!(r.day_of_month(), Some(5));
        assert!(r.is_debit());
        assert!(!r.is_credit());
    }

    #[test]
    fn test_unparsed_time_has_no_derived_fields() {
        let r = TransactionRecord::new(
            at("yesterday"),
            "Airtime",
            Amount::ZERO,
            Amount::Number(50.0),
            Amount::ZERO,
        );
        assert_eq!(r.completion_time, CompletionTime::Unparsed(Some("yesterday".into())));
        assert_eq!(r.month(), None);
        assert_eq!(r.day_of_month(), None);
    }

    #[test]
    fn test_exclusivity() {
        let both = TransactionRecord::new(
            at("2024-01-05"),
            "Broken",
            Amount::Number(10.0),
            Amount::Number(10.0),
            Amount::ZERO,
        );
        assert!(!both.is_exclusive());

        let credit = TransactionRecord::new(
            at("2024-01-05"),
            "Salary",
            Amount::Number(10.0),
            Amount::ZERO,
            Amount::ZERO,
        );
        assert!(credit.is_exclusive());
    }
}
