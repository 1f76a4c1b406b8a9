//! mpesa-ingest: raw statement tables -> normalized ledger.
//!
//! Table extraction itself is external ([`extract::TableExtractor`]); this
//! crate selects the transaction tables and cleans them into a
//! [`mpesa_core::Ledger`].

pub mod builder;
pub mod error;
pub mod extract;
pub mod header;
pub mod parsers;
pub mod policy;
pub mod types;

pub use builder::{LedgerBuilder, NullPolicy, build_ledger};
pub use error::{BuildError, ExtractError};
pub use extract::{TableExtractor, TabulaExtractor};
pub use policy::{AlternatingAfterCover, AllTables, HeaderMatch, TableSelectionPolicy};
pub use types::RawTable;
