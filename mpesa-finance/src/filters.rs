//! Keyword, date, amount and source filters over a flow view.
//!
//! A filter that matches nothing returns an empty [`FilterResult`]; that is
//! an informational empty state, not an error.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::views::{FlowEntry, FlowKind, FlowView};

#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult<'a> {
    pub kind: FlowKind,
    pub entries: Vec<FlowEntry<'a>>,
    /// Sum of magnitudes of the matching entries
    pub total: f64,
}

impl<'a> FilterResult<'a> {
    fn matching(view: &FlowView<'a>, keep: impl Fn(&FlowEntry<'a>) -> bool) -> Self {
        let entries: Vec<FlowEntry<'a>> = view.iter().filter(|e| keep(*e)).cloned().collect();
        let total = entries.iter().map(FlowEntry::magnitude).sum();
        Self {
            kind: view.kind(),
            entries,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-wrap the matches as a view, for further aggregation
    pub fn into_view(self) -> FlowView<'a> {
        FlowView::from_entries(self.kind, self.entries)
    }
}

/// Case-insensitive substring match on `details`. A blank keyword matches nothing.
pub fn search_details<'a>(view: &FlowView<'a>, keyword: &str) -> FilterResult<'a> {
    let needle = keyword.trim().to_lowercase();
    FilterResult::matching(view, |e| {
        !needle.is_empty() && e.details().to_lowercase().contains(&needle)
    })
}

/// Entries completed on `date`
pub fn on_date<'a>(view: &FlowView<'a>, date: NaiveDate) -> FilterResult<'a> {
    FilterResult::matching(view, |e| e.record.date() == Some(date))
}

/// Entries on a day of month, across all months in the statement
pub fn on_day_of_month<'a>(view: &FlowView<'a>, day: u32) -> FilterResult<'a> {
    FilterResult::matching(view, |e| e.day_of_month == Some(day))
}

/// Inclusive magnitude bounds; `None` leaves a side open.
pub fn amount_range<'a>(
    view: &FlowView<'a>,
    min: Option<f64>,
    max: Option<f64>,
) -> FilterResult<'a> {
    FilterResult::matching(view, |e| {
        let m = e.magnitude();
        min.is_none_or(|lo| m >= lo) && max.is_none_or(|hi| m <= hi)
    })
}

/// Exact `details` membership
pub fn from_sources<'a, S: AsRef<str>>(view: &FlowView<'a>, sources: &[S]) -> FilterResult<'a> {
    FilterResult::matching(view, |e| sources.iter().any(|s| s.as_ref() == e.details()))
}

fn day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}$").expect("invalid day regex"))
}

fn dmy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<d>\d{1,2})/(?P<m>\d{1,2})/(?P<y>\d{4})$").expect("invalid d/m/y regex")
    })
}

/// A date typed by the user: a bare day of month, an ISO date, or D/M/YYYY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DateQuery {
    Day(u32),
    Date(NaiveDate),
}

impl DateQuery {
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();

        if day_re().is_match(s) {
            let day: u32 = s.parse().ok()?;
            return (1..=31).contains(&day).then_some(DateQuery::Day(day));
        }

        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(DateQuery::Date(d));
        }

        let caps = dmy_re().captures(s)?;
        NaiveDate::from_ymd_opt(
            caps["y"].parse().ok()?,
            caps["m"].parse().ok()?,
            caps["d"].parse().ok()?,
        )
        .map(DateQuery::Date)
    }

    pub fn apply<'a>(&self, view: &FlowView<'a>) -> FilterResult<'a> {
        match self {
            DateQuery::Day(day) => on_day_of_month(view, *day),
            DateQuery::Date(date) => on_date(view, *date),
        }
    }
}

/// A combination of filters, applied together (all must match).
///
/// Interactive sessions keep one of these so selections stick between
/// commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub keyword: Option<String>,
    pub date: Option<DateQuery>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none()
            && self.date.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
            && self.sources.is_empty()
    }

    pub fn clear(&mut self) {
        *self = FilterSet::default();
    }

    pub fn apply<'a>(&self, view: &FlowView<'a>) -> FilterResult<'a> {
        let mut current = FilterResult::matching(view, |_| true);

        if let Some(keyword) = &self.keyword {
            current = search_details(&current.into_view(), keyword);
        }
        if let Some(date) = &self.date {
            current = date.apply(&current.into_view());
        }
        if self.min_amount.is_some() || self.max_amount.is_some() {
            current = amount_range(&current.into_view(), self.min_amount, self.max_amount);
        }
        if !self.sources.is_empty() {
            current = from_sources(&current.into_view(), &self.sources);
        }
        current
    }
}
