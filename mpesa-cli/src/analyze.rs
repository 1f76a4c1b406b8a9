use anyhow::{Context, Result, bail};
use clap::Args;
use mpesa_core::{Amount, Cell, Ledger, TransactionRecord, localize_to_utc};
use mpesa_finance::{
    DateQuery, FilterSet, FlowKind, FlowView, StatementSummary, category_stats,
    daily_totals, monthly_totals, top_categories,
};
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Number of categories to rank (default: display.top_n)
    #[arg(long)]
    pub top: Option<usize>,

    /// Case-insensitive substring of Details
    #[arg(long)]
    pub search: Option<String>,

    /// Day of month (5), ISO date (2024-01-05) or D/M/YYYY
    #[arg(long)]
    pub date: Option<String>,

    /// Smallest amount to include
    #[arg(long)]
    pub min: Option<f64>,

    /// Largest amount to include
    #[arg(long)]
    pub max: Option<f64>,

    /// Exact Details value; repeat for several
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// Per-category count, total and average
    #[arg(long)]
    pub stats: bool,

    /// Show the N most recent transactions
    #[arg(long)]
    pub recent: Option<usize>,
}

impl ViewArgs {
    pub fn filters(&self) -> Result<FilterSet> {
        let date = match &self.date {
            Some(q) => Some(DateQuery::parse(q).with_context(|| {
                format!("unrecognized date '{q}' (use 5, 2024-01-05 or 5/1/2024)")
            })?),
            None => None,
        };
        if let (Some(lo), Some(hi)) = (self.min, self.max) {
            if lo > hi {
                bail!("--min {lo} is greater than --max {hi}");
            }
        }
        Ok(FilterSet {
            keyword: self.search.clone(),
            date,
            min_amount: self.min,
            max_amount: self.max,
            sources: self.sources.clone(),
        })
    }
}

pub fn view_of(ledger: &Ledger, kind: FlowKind) -> FlowView<'_> {
    match kind {
        FlowKind::Outflow => FlowView::outflow(ledger),
        FlowKind::Inflow => FlowView::inflow(ledger),
    }
}

pub fn run_summary(ledger: &Ledger, cfg: &Config, top: Option<usize>) {
    let currency = &cfg.display.currency;
    let top = top.unwrap_or(cfg.display.top_n);
    let summary = StatementSummary::from_ledger(ledger);

    output::print_summary(&summary, currency);
    println!();
    output::print_preview(ledger, cfg.display.preview_rows);

    let outflow = FlowView::outflow(ledger);
    println!("\nTop {top} spending categories:");
    output::print_top(&top_categories(&outflow, top), outflow.total_magnitude(), currency);

    let inflow = FlowView::inflow(ledger);
    println!("\nTop {top} income sources:");
    output::print_top(&top_categories(&inflow, top), inflow.total_magnitude(), currency);
}

pub fn run_view(ledger: &Ledger, kind: FlowKind, args: &ViewArgs, cfg: &Config) -> Result<()> {
    let filters = args.filters()?;
    show_view(&view_of(ledger, kind), &filters, args, cfg);
    Ok(())
}

/// Metrics and rankings for a view, then any filter results.
pub fn show_view(view: &FlowView<'_>, filters: &FilterSet, args: &ViewArgs, cfg: &Config) {
    let currency = &cfg.display.currency;
    let top = args.top.unwrap_or(cfg.display.top_n);
    let noun = match view.kind() {
        FlowKind::Outflow => "spent",
        FlowKind::Inflow => "received",
    };

    if view.is_empty() {
        println!("No {} transactions in this statement.", view.kind().label());
        return;
    }

    println!("Total {noun}: {}", output::money(currency, view.total_magnitude()));
    if let Some(mean) = view.mean_magnitude() {
        println!("Average:    {}", output::money(currency, mean));
    }
    println!("Count:      {}", view.len());

    println!("\nBy day of month:");
    output::print_series("day", &daily_totals(view), currency);
    let monthly = monthly_totals(view);
    if monthly.len() > 1 {
        println!("\nBy month:");
        output::print_series("month", &monthly, currency);
    }

    println!("\nTop {top} by Details:");
    output::print_top(&top_categories(view, top), view.total_magnitude(), currency);

    if args.stats {
        println!();
        output::print_stats(&category_stats(view), currency);
    }

    if let Some(n) = args.recent {
        println!("\n{n} most recent:");
        output::print_entries(view.kind(), &view.most_recent(n));
    }

    if !filters.is_empty() {
        println!();
        output::print_filter_result(&filters.apply(view), &describe(filters), currency);
    }
}

/// "matching 'pay' on day 5 ..." for empty-state and total lines.
pub fn describe(filters: &FilterSet) -> String {
    let mut parts = Vec::new();
    if let Some(k) = &filters.keyword {
        parts.push(format!("matching '{k}'"));
    }
    match filters.date {
        Some(DateQuery::Day(d)) => parts.push(format!("on day {d}")),
        Some(DateQuery::Date(d)) => parts.push(format!("on {}", d.format("%-d/%-m/%Y"))),
        None => {}
    }
    match (filters.min_amount, filters.max_amount) {
        (Some(lo), Some(hi)) => parts.push(format!("between {lo} and {hi}")),
        (Some(lo), None) => parts.push(format!("of at least {lo}")),
        (None, Some(hi)) => parts.push(format!("of at most {hi}")),
        (None, None) => {}
    }
    if !filters.sources.is_empty() {
        parts.push(format!("from {}", filters.sources.join(", ")));
    }
    parts.join(" ")
}

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    completion_time: Option<String>,
    completion_time_utc: Option<String>,
    details: &'a str,
    paid_in: &'a Amount,
    withdrawn: &'a Amount,
    balance: &'a Amount,
    source_table: usize,
    extra: Vec<(&'a str, &'a Cell)>,
}

/// Export rows for `records`. A local time the zone cannot map (a DST gap
/// or overlap) exports with no UTC time; the row itself is kept.
fn export_records<'a>(records: &'a [TransactionRecord], tz: &str) -> Vec<ExportRecord<'a>> {
    records
        .iter()
        .enumerate()
        .map(|(row, r)| {
            let local = r.completion_time.datetime();
            let utc = local.and_then(|dt| match localize_to_utc(dt, tz) {
                Ok(utc) => Some(utc.to_rfc3339()),
                Err(e) => {
                    warn!(row, error = %e, "completion time has no UTC equivalent");
                    None
                }
            });
            ExportRecord {
                completion_time: local.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                completion_time_utc: utc,
                details: &r.details,
                paid_in: &r.paid_in,
                withdrawn: &r.withdrawn,
                balance: &r.balance,
                source_table: r.source_table,
                extra: r.extra.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            }
        })
        .collect()
}

pub fn run_ledger(ledger: &Ledger, cfg: &Config, json: bool, limit: Option<usize>) -> Result<()> {
    let records = ledger.head(limit.unwrap_or(ledger.len()));
    if !json {
        output::print_records(records);
        println!("{} of {} rows", records.len(), ledger.len());
        return Ok(());
    }

    let out = export_records(records, &cfg.display.timezone);

    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, &out).context("write ledger JSON")?;
    writeln!(lock)?;
    Ok(())
}
