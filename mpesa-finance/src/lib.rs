//! mpesa-finance: outflow/inflow views, category aggregation, filters and
//! statement summaries over a built ledger

pub mod aggregate;
pub mod filters;
pub mod summary;
pub mod views;

pub use aggregate::{
    CategoryStats, CategoryTotal, category_stats, daily_totals, monthly_totals, top_categories,
};
pub use filters::{
    DateQuery, FilterResult, FilterSet, amount_range, from_sources, on_date, on_day_of_month,
    search_details,
};
pub use summary::{Standing, StatementSummary};
pub use views::{FlowEntry, FlowKind, FlowView, inflow_view, outflow_view};
