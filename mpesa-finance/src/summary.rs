//! Headline numbers for one statement.

use mpesa_core::{AnomalyCounts, ExclusivityViolation, Ledger};
use serde::{Deserialize, Serialize};

use crate::views::FlowView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Surplus,
    Deficit,
    Even,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub transactions: usize,
    pub outflows: usize,
    pub inflows: usize,
    /// Total withdrawn, as a positive figure
    pub total_spent: f64,
    pub total_received: f64,
    /// Received minus spent
    pub net: f64,
    pub anomalies: AnomalyCounts,
    pub violations: Vec<ExclusivityViolation>,
}

impl StatementSummary {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let outflow = FlowView::outflow(ledger);
        let inflow = FlowView::inflow(ledger);
        let total_spent = outflow.total_magnitude();
        let total_received = inflow.total_magnitude();

        Self {
            transactions: ledger.len(),
            outflows: outflow.len(),
            inflows: inflow.len(),
            total_spent,
            total_received,
            net: total_received - total_spent,
            anomalies: ledger.anomalies(),
            violations: ledger.validate(),
        }
    }

    pub fn standing(&self) -> Standing {
        if self.net > 0.0 {
            Standing::Surplus
        } else if self.net < 0.0 {
            Standing::Deficit
        } else {
            Standing::Even
        }
    }
}
