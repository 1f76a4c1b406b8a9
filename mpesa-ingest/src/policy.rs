//! Which extracted tables hold transactions.
//!
//! The provider's statement puts a cover page and a summary table first, then
//! alternates detail tables with unrelated filler. That layout is an
//! empirical observation about one template, so it lives behind
//! [`TableSelectionPolicy`] rather than inside the builder.

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::header::normalize_headers;
use crate::types::RawTable;

pub trait TableSelectionPolicy {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Pick the transaction tables, in original order.
    fn select<'a>(&self, tables: &'a [RawTable]) -> Result<Vec<&'a RawTable>, BuildError>;
}

/// Drop `skip_leading` tables, then keep every `stride`-th table of the
/// remainder starting with the first.
///
/// The default (2, 2) keeps original positions 2, 4, 6, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternatingAfterCover {
    pub skip_leading: usize,
    pub stride: usize,
}

impl Default for AlternatingAfterCover {
    fn default() -> Self {
        Self {
            skip_leading: 2,
            stride: 2,
        }
    }
}

impl TableSelectionPolicy for AlternatingAfterCover {
    fn name(&self) -> &str {
        "alternating-after-cover"
    }

    fn select<'a>(&self, tables: &'a [RawTable]) -> Result<Vec<&'a RawTable>, BuildError> {
        let required = self.skip_leading + 1;
        if tables.len() < required {
            return Err(BuildError::InsufficientTables {
                found: tables.len(),
                required,
            });
        }

        Ok(tables[self.skip_leading..]
            .iter()
            .step_by(self.stride.max(1))
            .collect())
    }
}

/// Every table is a transaction table (CSV exports, pre-cleaned dumps).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllTables;

impl TableSelectionPolicy for AllTables {
    fn name(&self) -> &str {
        "all"
    }

    fn select<'a>(&self, tables: &'a [RawTable]) -> Result<Vec<&'a RawTable>, BuildError> {
        if tables.is_empty() {
            return Err(BuildError::InsufficientTables {
                found: 0,
                required: 1,
            });
        }
        Ok(tables.iter().collect())
    }
}

/// Content-based selection: keep tables whose header names every required column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub required: Vec<String>,
}

impl HeaderMatch {
    pub fn new<S: Into<String>>(required: impl IntoIterator<Item = S>) -> Self {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, table: &RawTable) -> bool {
        let headers = normalize_headers(&table.columns);
        self.required.iter().all(|r| headers.iter().any(|h| h == r))
    }
}

impl Default for HeaderMatch {
    fn default() -> Self {
        Self::new([mpesa_core::columns::COMPLETION_TIME])
    }
}

impl TableSelectionPolicy for HeaderMatch {
    fn name(&self) -> &str {
        "header-match"
    }

    fn select<'a>(&self, tables: &'a [RawTable]) -> Result<Vec<&'a RawTable>, BuildError> {
        if tables.is_empty() {
            return Err(BuildError::InsufficientTables {
                found: 0,
                required: 1,
            });
        }
        Ok(tables.iter().filter(|t| self.matches(t)).collect())
    }
}
