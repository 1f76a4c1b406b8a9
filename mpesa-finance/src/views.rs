//! Outflow and inflow projections of the ledger.
//!
//! Views borrow the ledger; nothing is copied except the signed amount.

use mpesa_core::{Amount, Ledger, TransactionRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Debits ("Withdrawn"), shown negative
    Outflow,
    /// Credits ("Paid In")
    Inflow,
}

impl FlowKind {
    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Outflow => "Withdrawn",
            FlowKind::Inflow => "Paid In",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowEntry<'a> {
    pub record: &'a TransactionRecord,
    /// Signed amount: outflows are <= 0
    pub amount: Amount,
    pub day_of_month: Option<u32>,
}

impl FlowEntry<'_> {
    pub fn details(&self) -> &str {
        &self.record.details
    }

    /// Absolute contribution to aggregates (unparsed counts as zero)
    pub fn magnitude(&self) -> f64 {
        self.amount.value().abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowView<'a> {
    kind: FlowKind,
    entries: Vec<FlowEntry<'a>>,
}

impl<'a> FlowView<'a> {
    /// Rows with a non-zero `withdrawn`, sign-flipped negative.
    pub fn outflow(ledger: &'a Ledger) -> Self {
        let entries = ledger
            .iter()
            .filter(|r| r.withdrawn.is_nonzero())
            .map(|r| FlowEntry {
                record: r,
                amount: r.withdrawn.as_debit(),
                day_of_month: r.day_of_month(),
            })
            .collect();
        Self {
            kind: FlowKind::Outflow,
            entries,
        }
    }

    /// Rows with a non-zero `paid_in`.
    pub fn inflow(ledger: &'a Ledger) -> Self {
        let entries = ledger
            .iter()
            .filter(|r| r.paid_in.is_nonzero())
            .map(|r| FlowEntry {
                record: r,
                amount: r.paid_in.clone(),
                day_of_month: r.day_of_month(),
            })
            .collect();
        Self {
            kind: FlowKind::Inflow,
            entries,
        }
    }

    pub(crate) fn from_entries(kind: FlowKind, entries: Vec<FlowEntry<'a>>) -> Self {
        Self { kind, entries }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn entries(&self) -> &[FlowEntry<'a>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlowEntry<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signed sum; negative for an outflow view
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.amount.value()).sum()
    }

    pub fn total_magnitude(&self) -> f64 {
        self.entries.iter().map(FlowEntry::magnitude).sum()
    }

    pub fn mean_magnitude(&self) -> Option<f64> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.total_magnitude() / self.entries.len() as f64)
        }
    }

    /// Latest `n` entries by completion time; unparsed times sort last.
    pub fn most_recent(&self, n: usize) -> Vec<&FlowEntry<'a>> {
        let mut sorted: Vec<&FlowEntry<'a>> = self.entries.iter().collect();
        // Option orders None first, so reverse puts parsed times ahead.
        sorted.sort_by(|a, b| {
            b.record
                .completion_time
                .datetime()
                .cmp(&a.record.completion_time.datetime())
        });
        sorted.truncate(n);
        sorted
    }
}

pub fn outflow_view(ledger: &Ledger) -> FlowView<'_> {
    FlowView::outflow(ledger)
}

pub fn inflow_view(ledger: &Ledger) -> FlowView<'_> {
    FlowView::inflow(ledger)
}
