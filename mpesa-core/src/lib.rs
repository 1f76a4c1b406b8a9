//! mpesa-core: ledger types for M-Pesa statement analysis

pub mod amount;
pub mod cell;
pub mod columns;
pub mod ledger;
pub mod record;
pub mod time;

pub use amount::{Amount, sum_amounts};
pub use cell::Cell;
pub use ledger::{AnomalyCounts, ExclusivityViolation, Ledger};
pub use record::{CompletionTime, TransactionRecord};
pub use time::{DEFAULT_TIMEZONE, localize_to_utc, parse_completion_time};
