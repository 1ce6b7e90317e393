//! Reports and charts derived from the user's transactions.
//!
//! The heart of this module is a set of pure functions that turn a slice of
//! transactions into time-bucketed chart series, a category breakdown,
//! summary totals, and a CSV projection. The page handlers fetch the user's
//! transactions once and derive everything else from that in-memory list.

mod aggregation;
mod charts;
mod csv;
mod dashboard_page;
mod window;

pub use aggregation::{
    CategoryBreakdown, PeriodBucket, ReportPeriod, SummaryTotals, bucket_by_period,
    category_breakdown, summary_totals,
};
pub use csv::export_csv;
pub use dashboard_page::{export_csv_endpoint, get_dashboard_page, get_report_partial};
pub use window::{ReportWindow, windowed_report};
