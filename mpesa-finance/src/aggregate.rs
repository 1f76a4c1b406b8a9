//! Groupings over a flow view: by category (`details`), by day, by month.
//!
//! Sums use magnitudes, so outflow categories rank by how much was spent.
//! Rows whose timestamp did not parse are left out of the time series.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::views::FlowView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub details: String,
    pub total: f64,
}

/// Per-category frequency, total and average (scatter data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub details: String,
    pub count: usize,
    pub total: f64,
    pub average: f64,
}

/// Category sums in first-encountered order.
fn grouped(view: &FlowView<'_>) -> Vec<(String, usize, f64)> {
    let mut order: Vec<(String, usize, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in view.iter() {
        let slot = *index.entry(entry.details()).or_insert_with(|| {
            order.push((entry.details().to_string(), 0, 0.0));
            order.len() - 1
        });
        order[slot].1 += 1;
        order[slot].2 += entry.magnitude();
    }
    order
}

/// Top `n` categories by total, descending. Ties keep first-encountered order.
pub fn top_categories(view: &FlowView<'_>, n: usize) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = grouped(view)
        .into_iter()
        .map(|(details, _, total)| CategoryTotal { details, total })
        .collect();

    // sort_by is stable
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(n);
    totals
}

pub fn category_stats(view: &FlowView<'_>) -> Vec<CategoryStats> {
    let mut stats: Vec<CategoryStats> = grouped(view)
        .into_iter()
        .map(|(details, count, total)| CategoryStats {
            details,
            count,
            total,
            average: total / count as f64,
        })
        .collect();
    stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    stats
}

/// Totals keyed by day of month
pub fn daily_totals(view: &FlowView<'_>) -> BTreeMap<u32, f64> {
    let mut out = BTreeMap::new();
    for entry in view.iter() {
        if let Some(day) = entry.day_of_month {
            *out.entry(day).or_insert(0.0) += entry.magnitude();
        }
    }
    out
}

/// Totals keyed by calendar month (1-12)
pub fn monthly_totals(view: &FlowView<'_>) -> BTreeMap<u32, f64> {
    let mut out = BTreeMap::new();
    for entry in view.iter() {
        if let Some(month) = entry.record.month() {
            *out.entry(month).or_insert(0.0) += entry.magnitude();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpesa_core::{Amount, Cell, CompletionTime, Ledger, TransactionRecord};

    fn spend(at: &str, details: &str, amount: f64) -> TransactionRecord {
        TransactionRecord::new(
            CompletionTime::from_cell(&Cell::text(at)),
            details,
            Amount::ZERO,
            Amount::Number(amount),
            Amount::ZERO,
        )
    }

    #[test]
    fn test_top_n_descending_with_stable_ties() {
        let ledger = Ledger::new(
            vec![],
            vec![
                spend("2024-01-01", "A", 100.0),
                spend("2024-01-01", "B", 300.0),
                spend("2024-01-02", "C", 300.0),
                spend("2024-01-02", "D", 50.0),
                spend("2024-01-03", "E", 200.0),
            ],
        );
        let view = FlowView::outflow(&ledger);
        let top = top_categories(&view, 2);
        assert_eq!(
            top,
            vec![
                CategoryTotal { details: "B".into(), total: 300.0 },
                CategoryTotal { details: "C".into(), total: 300.0 },
            ]
        );
    }

    #[test]
    fn test_top_n_larger_than_groups() {
        let ledger = Ledger::new(vec![], vec![spend("2024-01-01", "A", 10.0)]);
        let view = FlowView::outflow(&ledger);
        assert_eq!(top_categories(&view, 15).len(), 1);
        assert!(top_categories(&view, 0).is_empty());
    }

    #[test]
    fn test_category_stats() {
        let ledger = Ledger::new(
            vec![],
            vec![
                spend("2024-01-01", "Source A", 1000.0),
                spend("2024-01-02", "Source B", 2000.0),
                spend("2024-01-03", "Source A", 800.0),
            ],
        );
        let view = FlowView::outflow(&ledger);
        let stats = category_stats(&view);
        assert_eq!(stats[0].details, "Source B");
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].total, 1800.0);
        assert_eq!(stats[1].average, 900.0);
    }

    #[test]
    fn test_time_series_skip_unparsed() {
        let ledger = Ledger::new(
            vec![],
            vec![
                spend("2024-01-05 10:00:00", "A", 10.0),
                spend("2024-01-05 18:00:00", "B", 5.0),
                spend("2024-02-07 09:00:00", "C", 1.0),
                spend("not a date", "D", 99.0),
            ],
        );
        let view = FlowView::outflow(&ledger);

        let daily = daily_totals(&view);
        assert_eq!(daily.get(&5), Some(&15.0));
        assert_eq!(daily.get(&7), Some(&1.0));
        assert_eq!(daily.values().sum::<f64>(), 16.0);

        let monthly = monthly_totals(&view);
        assert_eq!(monthly.get(&1), Some(&15.0));
        assert_eq!(monthly.get(&2), Some(&1.0));
        assert_eq!(monthly.len(), 2);
    }
}
