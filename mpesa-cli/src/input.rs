//! Where the statement's tables come from.

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use mpesa_ingest::parsers::{read_csv_dir, read_tabula_json};
use mpesa_ingest::{ExtractError, RawTable, TableExtractor};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::info;

use crate::config::{Config, Strategy};

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Password-protected statement PDF (needs tabula-java)
    #[arg(long, global = true)]
    pub pdf: Option<PathBuf>,

    /// Statement password; prompted for when omitted
    #[arg(long, global = true, env = "MPESA_STATEMENT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Tables already extracted by `tabula --format JSON`
    #[arg(long, global = true)]
    pub tabula_json: Option<PathBuf>,

    /// Directory of CSV files, one table per file
    #[arg(long, global = true)]
    pub csv_dir: Option<PathBuf>,

    /// Table selection strategy (overrides config)
    #[arg(long, global = true, value_enum)]
    pub policy: Option<Strategy>,

    /// Keep empty amounts as missing instead of zero
    #[arg(long, global = true)]
    pub strict_nulls: bool,
}

impl InputArgs {
    pub fn source(&self) -> Result<Option<StatementSource>> {
        let given: Vec<StatementSource> = [
            self.pdf.clone().map(StatementSource::Pdf),
            self.tabula_json.clone().map(StatementSource::TabulaJson),
            self.csv_dir.clone().map(StatementSource::CsvDir),
        ]
        .into_iter()
        .flatten()
        .collect();

        match given.len() {
            0 => Ok(None),
            1 => Ok(given.into_iter().next()),
            _ => bail!("pass only one of --pdf, --tabula-json, --csv-dir"),
        }
    }

    pub fn require_source(&self) -> Result<StatementSource> {
        self.source()?
            .context("no statement given (pass --pdf, --tabula-json or --csv-dir)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementSource {
    Pdf(PathBuf),
    TabulaJson(PathBuf),
    CsvDir(PathBuf),
}

impl StatementSource {
    /// Guess the kind from the path: a directory, a `.json` file, or a PDF.
    pub fn infer(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            StatementSource::CsvDir(path)
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        {
            StatementSource::TabulaJson(path)
        } else {
            StatementSource::Pdf(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            StatementSource::Pdf(p)
            | StatementSource::TabulaJson(p)
            | StatementSource::CsvDir(p) => p,
        }
    }

    pub fn needs_password(&self) -> bool {
        matches!(self, StatementSource::Pdf(_))
    }

    pub fn upload_key(&self, password: &str) -> Result<UploadKey> {
        let path = self.path();
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        let mut h = DefaultHasher::new();
        password.hash(&mut h);
        Ok(UploadKey {
            path: path.to_path_buf(),
            size: meta.len(),
            modified: meta.modified().ok(),
            password_hash: h.finish(),
        })
    }

    pub fn load_tables(&self, cfg: &Config, password: &str) -> Result<Vec<RawTable>> {
        let tables = match self {
            StatementSource::Pdf(path) => {
                let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
                cfg.extractor()
                    .extract_tables(&bytes, password)
                    .map_err(with_hint)?
            }
            StatementSource::TabulaJson(path) => {
                let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
                read_tabula_json(BufReader::new(file)).map_err(with_hint)?
            }
            StatementSource::CsvDir(dir) => read_csv_dir(dir).map_err(with_hint)?,
        };
        info!(source = %self.path().display(), tables = tables.len(), "statement tables loaded");
        Ok(tables)
    }
}

fn with_hint(e: ExtractError) -> anyhow::Error {
    anyhow!("{e}\nhint: {}", e.hint())
}

/// What identifies one upload for caching: same file, same bytes on disk,
/// same password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadKey {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    password_hash: u64,
}

pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Password for `source`: the flag/env value, else a prompt for PDFs.
pub fn resolve_password(source: &StatementSource, given: Option<&str>) -> Result<String> {
    match given {
        Some(p) => Ok(p.to_string()),
        None if source.needs_password() => prompt("Statement password"),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_source() {
        let args = InputArgs {
            pdf: Some("a.pdf".into()),
            csv_dir: Some("tables".into()),
            ..InputArgs::default()
        };
        assert!(args.source().is_err());
        assert_eq!(InputArgs::default().source().unwrap(), None);
        assert!(InputArgs::default().require_source().is_err());
    }

    #[test]
    fn test_infer_kind() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            StatementSource::infer(dir.path()),
            StatementSource::CsvDir(dir.path().to_path_buf())
        );
        assert!(matches!(StatementSource::infer("out.JSON"), StatementSource::TabulaJson(_)));
        assert!(matches!(StatementSource::infer("statement.pdf"), StatementSource::Pdf(_)));
    }

    #[test]
    fn test_upload_key_tracks_password_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tables.json");
        fs::write(&p, "[]").unwrap();
        let src = StatementSource::TabulaJson(p.clone());

        let a = src.upload_key("1234").unwrap();
        assert_eq!(a, src.upload_key("1234").unwrap());
        assert_ne!(a, src.upload_key("4321").unwrap());

        fs::write(&p, "[ ]").unwrap();
        assert_ne!(a.size, src.upload_key("1234").unwrap().size);
    }

    #[test]
    fn test_password_not_needed_offline() {
        let src = StatementSource::CsvDir("tables".into());
        assert_eq!(resolve_password(&src, None).unwrap(), "");
        let pdf = StatementSource::Pdf("s.pdf".into());
        assert_eq!(resolve_password(&pdf, Some("pw")).unwrap(), "pw");
    }

    #[test]
    fn test_load_tabula_json() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tables.json");
        fs::write(&p, "[]").unwrap();
        let tables = StatementSource::TabulaJson(p)
            .load_tables(&Config::default(), "")
            .unwrap();
        assert!(tables.is_empty());
    }
}
