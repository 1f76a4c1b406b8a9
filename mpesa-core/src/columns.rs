//! Column names of the provider's transaction table.

pub const COMPLETION_TIME: &str = "Completion Time";
pub const DETAILS: &str = "Details";
pub const PAID_IN: &str = "Paid In";
pub const WITHDRAWN: &str = "Withdrawn";
pub const BALANCE: &str = "Balance";

/// Synthetic leading index column some extractions prepend
pub const INDEX_COLUMN: &str = "Unnamed: 0";

/// Columns the ledger maps onto typed record fields.
pub const KNOWN: [&str; 5] = [COMPLETION_TIME, DETAILS, PAID_IN, WITHDRAWN, BALANCE];

pub fn is_known(name: &str) -> bool {
    KNOWN.contains(&name)
}
