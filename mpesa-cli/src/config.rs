use anyhow::{Context, Result, bail};
use mpesa_core::DEFAULT_TIMEZONE;
use mpesa_ingest::{
    AllTables, AlternatingAfterCover, HeaderMatch, LedgerBuilder, NullPolicy, TableSelectionPolicy,
    TabulaExtractor,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_mpesa_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extractor: ExtractorSection,
    #[serde(default)]
    pub selection: SelectionSection,
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorSection {
    /// Command that runs tabula-java (default: "tabula")
    pub command: String,
    /// Extra args placed before the tabula options, e.g. ["-jar", "tabula.jar"]
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ExtractorSection {
    fn default() -> Self {
        Self {
            command: "tabula".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Skip the cover tables, then every other table
    Alternating,
    /// Every extracted table
    All,
    /// Tables whose header names the statement columns
    HeaderMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSection {
    pub strategy: Strategy,
    pub skip_leading: usize,
    pub stride: usize,
}

impl Default for SelectionSection {
    fn default() -> Self {
        let alt = AlternatingAfterCover::default();
        Self {
            strategy: Strategy::Alternating,
            skip_leading: alt.skip_leading,
            stride: alt.stride,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSection {
    pub null_policy: NullPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySection {
    pub top_n: usize,
    pub currency: String,
    pub preview_rows: usize,
    /// IANA zone the statement times are in; used for UTC export
    pub timezone: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            top_n: 10,
            currency: "Ksh".to_string(),
            preview_rows: 10,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Config {
    pub fn extractor(&self) -> TabulaExtractor {
        TabulaExtractor::new(self.extractor.command.clone(), self.extractor.args.clone())
    }

    pub fn selection_policy(&self, strategy: Strategy) -> Box<dyn TableSelectionPolicy> {
        match strategy {
            Strategy::Alternating => Box::new(AlternatingAfterCover {
                skip_leading: self.selection.skip_leading,
                stride: self.selection.stride,
            }),
            Strategy::All => Box::new(AllTables),
            Strategy::HeaderMatch => Box::new(HeaderMatch::default()),
        }
    }

    /// Builder from config; flags passed as `Some` take precedence.
    pub fn ledger_builder(&self, strategy: Option<Strategy>, strict_nulls: bool) -> LedgerBuilder {
        let null_policy = if strict_nulls {
            NullPolicy::KeepMissing
        } else {
            self.ledger.null_policy
        };
        LedgerBuilder::new()
            .with_boxed_policy(self.selection_policy(strategy.unwrap_or(self.selection.strategy)))
            .with_null_policy(null_policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extractor.command.trim().is_empty() {
            bail!("extractor.command must not be empty");
        }
        if self.selection.stride == 0 {
            bail!("selection.stride must be at least 1");
        }
        if self.display.timezone.parse::<chrono_tz::Tz>().is_err() {
            bail!("display.timezone is not a known time zone: {}", self.display.timezone);
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_mpesa_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    let source = if p.exists() { "file" } else { "defaults" };
    println!("# {} ({})", p.display(), source);
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.display.top_n, 10);
        assert_eq!(cfg.display.currency, "Ksh");
        assert_eq!(cfg.selection.strategy, Strategy::Alternating);
        assert_eq!(cfg.ledger.null_policy, NullPolicy::ZeroFill);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.extractor.command = "java".into();
        cfg.extractor.args = vec!["-jar".into(), "tabula.jar".into()];
        cfg.ledger.null_policy = NullPolicy::KeepMissing;
        save_config(&cfg, &p).unwrap();

        let loaded = load_config_from(&p).unwrap();
        assert_eq!(loaded.extractor.args, vec!["-jar", "tabula.jar"]);
        assert_eq!(loaded.ledger.null_policy, NullPolicy::KeepMissing);
    }

    #[test]
    fn test_partial_file_fills_sections() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            "[selection]\nstrategy = \"header-match\"\nskip_leading = 1\nstride = 1\n",
        )
        .unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.selection.strategy, Strategy::HeaderMatch);
        assert_eq!(cfg.display.preview_rows, 10);
        assert_eq!(cfg.extractor.command, "tabula");
    }

    #[test]
    fn test_rejects_bad_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            "[display]\ntop_n = 5\ncurrency = \"Ksh\"\npreview_rows = 5\n\
             timezone = \"Mars/Olympus\"\n",
        )
        .unwrap();
        assert!(load_config_from(&p).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = Config::default();
        assert_eq!(cfg.ledger_builder(None, false).policy_name(), "alternating-after-cover");
        assert_eq!(cfg.ledger_builder(Some(Strategy::All), true).policy_name(), "all");
    }
}
