//! Plain-text rendering for the terminal.

use mpesa_core::{Amount, Ledger, TransactionRecord};
use mpesa_finance::{
    CategoryStats, CategoryTotal, FilterResult, FlowEntry, FlowKind, Standing, StatementSummary,
};
use std::collections::BTreeMap;

/// Whole units with thousands separators: `Ksh 12,345`.
pub fn money(currency: &str, value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{currency} {sign}{}", group_thousands(rounded.abs() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn amount_cell(amount: &Amount) -> String {
    match amount {
        Amount::Number(v) => format!("{v:.2}"),
        Amount::Unparsed(raw) => format!("?{raw}"),
        Amount::Missing => "-".to_string(),
    }
}

fn time_cell(record: &TransactionRecord) -> String {
    match record.completion_time.datetime() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "(unparsed)".to_string(),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

pub fn print_summary(summary: &StatementSummary, currency: &str) {
    println!("Transactions: {}", summary.transactions);
    println!(
        "Total spent:    {}  ({} withdrawals)",
        money(currency, summary.total_spent),
        summary.outflows
    );
    println!(
        "Total received: {}  ({} receipts)",
        money(currency, summary.total_received),
        summary.inflows
    );
    let standing = match summary.standing() {
        Standing::Surplus => "surplus",
        Standing::Deficit => "deficit",
        Standing::Even => "even",
    };
    println!("Net:            {}  ({standing})", money(currency, summary.net));

    let a = &summary.anomalies;
    if !a.is_clean() || a.missing_amounts > 0 {
        println!(
            "Note: {} unparsed time(s), {} unparsed amount(s), {} missing amount(s) \
             counted as zero",
            a.unparsed_times, a.unparsed_amounts, a.missing_amounts
        );
    }
    if !summary.violations.is_empty() {
        println!(
            "Warning: {} row(s) carry both Paid In and Withdrawn:",
            summary.violations.len()
        );
        for v in &summary.violations {
            println!(
                "  row {}: {} (paid in {:.2}, withdrawn {:.2})",
                v.row, v.details, v.paid_in, v.withdrawn
            );
        }
    }
}

pub fn print_records(records: &[TransactionRecord]) {
    println!(
        "{:<17}  {:<40}  {:>12}  {:>12}  {:>12}",
        "Completion Time", "Details", "Paid In", "Withdrawn", "Balance"
    );
    for r in records {
        println!(
            "{:<17}  {:<40}  {:>12}  {:>12}  {:>12}",
            time_cell(r),
            truncate(&r.details, 40),
            amount_cell(&r.paid_in),
            amount_cell(&r.withdrawn),
            amount_cell(&r.balance)
        );
    }
}

pub fn print_preview(ledger: &Ledger, rows: usize) {
    println!("First {} of {} rows:", rows.min(ledger.len()), ledger.len());
    print_records(ledger.head(rows));
}

pub fn print_entries(kind: FlowKind, entries: &[&FlowEntry<'_>]) {
    println!("{:<17}  {:<40}  {:>12}", "Completion Time", "Details", kind.label());
    for e in entries {
        println!(
            "{:<17}  {:<40}  {:>12}",
            time_cell(e.record),
            truncate(e.details(), 40),
            amount_cell(&e.amount)
        );
    }
}

/// Ranked categories with each one's share of `grand_total`.
pub fn print_top(top: &[CategoryTotal], grand_total: f64, currency: &str) {
    if top.is_empty() {
        println!("(no transactions)");
        return;
    }
    for (i, c) in top.iter().enumerate() {
        let share = if grand_total > 0.0 {
            c.total / grand_total * 100.0
        } else {
            0.0
        };
        println!(
            "{:>2}. {:<40} {:>16}  {:>5.1}%",
            i + 1,
            truncate(&c.details, 40),
            money(currency, c.total),
            share
        );
    }
}

pub fn print_stats(stats: &[CategoryStats], currency: &str) {
    println!("{:<40}  {:>5}  {:>16}  {:>16}", "Details", "Count", "Total", "Average");
    for s in stats {
        println!(
            "{:<40}  {:>5}  {:>16}  {:>16}",
            truncate(&s.details, 40),
            s.count,
            money(currency, s.total),
            money(currency, s.average)
        );
    }
}

pub fn print_series(label: &str, series: &BTreeMap<u32, f64>, currency: &str) {
    if series.is_empty() {
        println!("(no dated transactions)");
        return;
    }
    for (key, total) in series {
        println!("{label} {key:>2}: {}", money(currency, *total));
    }
}

pub fn print_filter_result(result: &FilterResult<'_>, what: &str, currency: &str) {
    if result.is_empty() {
        println!("No transactions found {what}.");
        return;
    }
    let refs: Vec<&FlowEntry<'_>> = result.entries.iter().collect();
    print_entries(result.kind, &refs);
    println!(
        "{} transaction(s) {what}, total {}",
        result.len(),
        money(currency, result.total)
    );
}
