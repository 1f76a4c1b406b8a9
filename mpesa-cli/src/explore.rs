//! `mpesa explore`: a line-oriented session over one statement at a time.
//!
//! Filters set here stick until cleared or until a different statement is
//! opened.

use anyhow::{Context, Result, anyhow};
use mpesa_finance::{DateQuery, FlowKind, top_categories};
use std::io::{self, BufRead, Write};
use tracing::warn;

use crate::analyze::{self, ViewArgs};
use crate::config::Config;
use crate::input::{self, InputArgs, StatementSource};
use crate::output;
use crate::session::Session;

const HELP: &str = "\
Commands:
  open <path>        load a statement (.pdf, tabula .json, or CSV directory)
  summary            headline totals and top categories
  expenses|receipts  switch view and show it
  search <text>      filter Details (blank clears)
  date <q>           filter by day (5), date (2024-01-05) or D/M/YYYY
  min <x> | max <x>  amount bounds
  source <details>   restrict to exact Details (repeatable)
  filters            show active filters
  clear              drop all filters
  top <n>            rank the top n categories
  stats              per-category count, total and average
  recent <n>         most recent n transactions
  ledger [n]         first n ledger rows
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Open(String),
    Summary,
    View(FlowKind),
    Search(Option<String>),
    Date(DateQuery),
    Min(f64),
    Max(f64),
    Source(String),
    Filters,
    Clear,
    Top(usize),
    Stats,
    Recent(usize),
    Ledger(Option<usize>),
    Help,
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let number = |what: &str| -> Result<f64, String> {
            rest.parse::<f64>()
                .map_err(|_| format!("{what} needs a number, got '{rest}'"))
        };
        let count = |default: Option<usize>| -> Result<usize, String> {
            if rest.is_empty() {
                return default.ok_or_else(|| format!("{word} needs a count"));
            }
            rest.parse::<usize>()
                .map_err(|_| format!("{word} needs a count, got '{rest}'"))
        };

        let cmd = match word.to_lowercase().as_str() {
            "open" if !rest.is_empty() => ReplCommand::Open(rest.to_string()),
            "open" => return Err("open needs a path".to_string()),
            "summary" => ReplCommand::Summary,
            "expenses" | "withdrawn" => ReplCommand::View(FlowKind::Outflow),
            "receipts" | "paid-in" => ReplCommand::View(FlowKind::Inflow),
            "search" => ReplCommand::Search((!rest.is_empty()).then(|| rest.to_string())),
            "date" => ReplCommand::Date(
                DateQuery::parse(rest).ok_or_else(|| format!("unrecognized date '{rest}'"))?,
            ),
            "min" => ReplCommand::Min(number("min")?),
            "max" => ReplCommand::Max(number("max")?),
            "source" if !rest.is_empty() => ReplCommand::Source(rest.to_string()),
            "source" => return Err("source needs a Details value".to_string()),
            "filters" => ReplCommand::Filters,
            "clear" => ReplCommand::Clear,
            "top" => ReplCommand::Top(count(None)?),
            "stats" => ReplCommand::Stats,
            "recent" => ReplCommand::Recent(count(Some(20))?),
            "ledger" if rest.is_empty() => ReplCommand::Ledger(None),
            "ledger" => ReplCommand::Ledger(Some(count(None)?)),
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => return Err(format!("unknown command '{other}' (try help)")),
        };
        Ok(Some(cmd))
    }
}

struct Loaded {
    source: StatementSource,
    password: String,
}

pub fn run_explore(cfg: &Config, input_args: &InputArgs) -> Result<()> {
    let mut session = Session::new(cfg.ledger_builder(input_args.policy, input_args.strict_nulls));
    let mut loaded: Option<Loaded> = None;

    if let Some(source) = input_args.source()? {
        let password = input::resolve_password(&source, input_args.password.as_deref())?;
        loaded = Some(Loaded { source, password });
    }

    println!("mpesa explore (type 'help' for commands)");
    if let Some(l) = &loaded {
        if let Err(e) = show(&mut session, cfg, l, &ReplCommand::Summary) {
            println!("error: {e:#}");
        }
    }

    let stdin = io::stdin();
    loop {
        let label = match session.view {
            FlowKind::Outflow => "expenses",
            FlowKind::Inflow => "receipts",
        };
        print!("{label}> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let cmd = match ReplCommand::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match cmd {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Open(path) => {
                let source = StatementSource::infer(path);
                let password = match input::resolve_password(&source, None) {
                    Ok(p) => p,
                    Err(e) => {
                        println!("error: {e:#}");
                        continue;
                    }
                };
                let next = Loaded { source, password };
                match show(&mut session, cfg, &next, &ReplCommand::Summary) {
                    Ok(()) => loaded = Some(next),
                    Err(e) => println!("error: {e:#}"),
                }
            }
            ReplCommand::Filters => {
                if session.filters.is_empty() {
                    println!("No filters.");
                } else {
                    println!("Filters: {}", analyze::describe(&session.filters));
                }
            }
            ReplCommand::Clear => {
                session.filters.clear();
                println!("Filters cleared.");
            }
            other => {
                apply_filter(&mut session, &other);
                match &loaded {
                    Some(l) => {
                        if let Err(e) = show(&mut session, cfg, l, &other) {
                            warn!(error = %e, "command failed");
                            println!("error: {e:#}");
                        }
                    }
                    None => println!("No statement loaded; use: open <path>"),
                }
            }
        }
    }
    Ok(())
}

/// Update sticky state for filter and view commands.
fn apply_filter(session: &mut Session, cmd: &ReplCommand) {
    let f = &mut session.filters;
    match cmd {
        ReplCommand::View(kind) => session.view = *kind,
        ReplCommand::Search(keyword) => f.keyword = keyword.clone(),
        ReplCommand::Date(q) => f.date = Some(*q),
        ReplCommand::Min(x) => f.min_amount = Some(*x),
        ReplCommand::Max(x) => f.max_amount = Some(*x),
        ReplCommand::Source(s) => {
            if !f.sources.contains(s) {
                f.sources.push(s.clone());
            }
        }
        _ => {}
    }
}

fn show(session: &mut Session, cfg: &Config, loaded: &Loaded, cmd: &ReplCommand) -> Result<()> {
    let key = loaded.source.upload_key(&loaded.password)?;
    session.ledger(key, || loaded.source.load_tables(cfg, &loaded.password))?;
    let filters = session.filters.clone();
    let ledger = session.current().context("no statement loaded")?;
    let view = analyze::view_of(ledger, session.view);
    let currency = &cfg.display.currency;

    match cmd {
        ReplCommand::Summary | ReplCommand::Open(_) => analyze::run_summary(ledger, cfg, None),
        ReplCommand::View(_) => analyze::show_view(&view, &filters, &ViewArgs::default(), cfg),
        ReplCommand::Search(_)
        | ReplCommand::Date(_)
        | ReplCommand::Min(_)
        | ReplCommand::Max(_)
        | ReplCommand::Source(_) => {
            let what = analyze::describe(&filters);
            output::print_filter_result(&filters.apply(&view), &what, currency);
        }
        ReplCommand::Top(n) => {
            let scoped = filters.apply(&view).into_view();
            output::print_top(&top_categories(&scoped, *n), scoped.total_magnitude(), currency);
        }
        ReplCommand::Stats => {
            let args = ViewArgs {
                stats: true,
                ..ViewArgs::default()
            };
            analyze::show_view(&filters.apply(&view).into_view(), &Default::default(), &args, cfg);
        }
        ReplCommand::Recent(n) => {
            let scoped = filters.apply(&view).into_view();
            output::print_entries(scoped.kind(), &scoped.most_recent(*n));
        }
        ReplCommand::Ledger(n) => analyze::run_ledger(ledger, cfg, false, *n)?,
        ReplCommand::Filters | ReplCommand::Clear | ReplCommand::Help | ReplCommand::Quit => {
            return Err(anyhow!("not a display command"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("  "), Ok(None));
        assert_eq!(
            ReplCommand::parse("search Pay Bill"),
            Ok(Some(ReplCommand::Search(Some("Pay Bill".into()))))
        );
        assert_eq!(ReplCommand::parse("search"), Ok(Some(ReplCommand::Search(None))));
        assert_eq!(ReplCommand::parse("date 5"), Ok(Some(ReplCommand::Date(DateQuery::Day(5)))));
        assert_eq!(ReplCommand::parse("MIN 100.5"), Ok(Some(ReplCommand::Min(100.5))));
        assert_eq!(ReplCommand::parse("recent"), Ok(Some(ReplCommand::Recent(20))));
        assert_eq!(ReplCommand::parse("ledger 5"), Ok(Some(ReplCommand::Ledger(Some(5)))));
        assert_eq!(ReplCommand::parse("receipts"), Ok(Some(ReplCommand::View(FlowKind::Inflow))));
        assert_eq!(ReplCommand::parse("q"), Ok(Some(ReplCommand::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ReplCommand::parse("open").is_err());
        assert!(ReplCommand::parse("top").is_err());
        assert!(ReplCommand::parse("min lots").is_err());
        assert!(ReplCommand::parse("date someday").is_err());
        assert!(ReplCommand::parse("frobnicate").is_err());
    }

    #[test]
    fn test_filters_are_sticky() {
        let mut session = Session::new(mpesa_ingest::LedgerBuilder::new());
        apply_filter(&mut session, &ReplCommand::Search(Some("pay".into())));
        apply_filter(&mut session, &ReplCommand::Min(10.0));
        apply_filter(&mut session, &ReplCommand::Source("Pay Bill".into()));
        apply_filter(&mut session, &ReplCommand::Source("Pay Bill".into()));
        apply_filter(&mut session, &ReplCommand::View(FlowKind::Inflow));

        assert_eq!(session.view, FlowKind::Inflow);
        assert_eq!(session.filters.keyword.as_deref(), Some("pay"));
        assert_eq!(session.filters.min_amount, Some(10.0));
        assert_eq!(session.filters.sources, vec!["Pay Bill"]);

        apply_filter(&mut session, &ReplCommand::Search(None));
        assert_eq!(session.filters.keyword, None);
    }
}
