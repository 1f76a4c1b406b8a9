//! One interactive session: the cached ledger plus sticky view/filter state.
//!
//! The ledger is rebuilt only when the upload identity changes; every other
//! command reads the cached copy.

use anyhow::{Context, Result, anyhow};
use mpesa_core::Ledger;
use mpesa_finance::{FilterSet, FlowKind};
use mpesa_ingest::{LedgerBuilder, RawTable};
use tracing::{debug, info};

use crate::input::UploadKey;

pub struct Session {
    builder: LedgerBuilder,
    cached: Option<(UploadKey, Ledger)>,
    builds: usize,
    pub view: FlowKind,
    pub filters: FilterSet,
}

impl Session {
    pub fn new(builder: LedgerBuilder) -> Self {
        Self {
            builder,
            cached: None,
            builds: 0,
            view: FlowKind::Outflow,
            filters: FilterSet::default(),
        }
    }

    /// Ledger for `key`; `load` runs only on a cache miss.
    pub fn ledger(
        &mut self,
        key: UploadKey,
        load: impl FnOnce() -> Result<Vec<RawTable>>,
    ) -> Result<&Ledger> {
        let hit = self.cached.as_ref().is_some_and(|(k, _)| *k == key);
        if hit {
            debug!(path = %key.path.display(), "ledger cache hit");
        } else {
            let tables = load()?;
            let ledger = self
                .builder
                .build(&tables)
                .map_err(|e| anyhow!(e.user_message()))?;
            self.builds += 1;
            info!(path = %key.path.display(), rows = ledger.len(), "ledger built");
            // Filters chosen for a replaced statement do not carry over.
            if self.cached.replace((key, ledger)).is_some() {
                self.filters.clear();
            }
        }
        self.current().context("no statement loaded")
    }

    pub fn current(&self) -> Option<&Ledger> {
        self.cached.as_ref().map(|(_, ledger)| ledger)
    }

    pub fn builds(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StatementSource;
    use mpesa_ingest::AllTables;
    use std::cell::Cell as Counter;
    use std::fs;

    fn tables() -> Vec<RawTable> {
        vec![RawTable::from_text_rows(
            0,
            &["Completion Time", "Details", "Paid In", "Withdrawn"],
            &[vec!["2024-01-05 10:00:00", "Pay Bill", "", "1,000"]],
        )]
    }

    fn key_for(dir: &tempfile::TempDir, name: &str, body: &str, password: &str) -> UploadKey {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        StatementSource::TabulaJson(p).upload_key(password).unwrap()
    }

    #[test]
    fn test_same_upload_is_built_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(LedgerBuilder::new().with_policy(AllTables));
        let loads = Counter::new(0);
        let source = StatementSource::TabulaJson(dir.path().join("a.json"));
        fs::write(source.path(), "[]").unwrap();

        for _ in 0..3 {
            let key = source.upload_key("1234").unwrap();
            let ledger = session
                .ledger(key, || {
                    loads.set(loads.get() + 1);
                    Ok(tables())
                })
                .unwrap();
            assert_eq!(ledger.len(), 1);
        }
        assert_eq!(loads.get(), 1);
        assert_eq!(session.builds(), 1);
    }

    #[test]
    fn test_new_password_or_file_rebuilds_and_resets_filters() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(LedgerBuilder::new().with_policy(AllTables));

        session.ledger(key_for(&dir, "a.json", "[]", "1234"), || Ok(tables())).unwrap();
        session.filters.keyword = Some("pay".into());

        session.ledger(key_for(&dir, "a.json", "[]", "0000"), || Ok(tables())).unwrap();
        assert_eq!(session.builds(), 2);
        assert!(session.filters.is_empty());

        session.ledger(key_for(&dir, "b.json", "[]", "0000"), || Ok(tables())).unwrap();
        assert_eq!(session.builds(), 3);
    }

    #[test]
    fn test_filters_set_before_first_load_survive_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(LedgerBuilder::new().with_policy(AllTables));
        session.filters.keyword = Some("pay".into());
        session.filters.min_amount = Some(100.0);

        session.ledger(key_for(&dir, "a.json", "[]", ""), || Ok(tables())).unwrap();
        assert_eq!(session.filters.keyword.as_deref(), Some("pay"));
        assert_eq!(session.filters.min_amount, Some(100.0));

        session.ledger(key_for(&dir, "b.json", "[]", ""), || Ok(tables())).unwrap();
        assert!(session.filters.is_empty());
    }

    #[test]
    fn test_build_failure_caches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(LedgerBuilder::new());

        let err = session
            .ledger(key_for(&dir, "a.json", "[]", ""), || Ok(vec![]))
            .unwrap_err();
        assert!(err.to_string().starts_with("Statement format not recognized"));
        assert!(session.current().is_none());
        assert_eq!(session.builds(), 0);
    }
}
