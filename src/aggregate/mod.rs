//! Income Aggregator
//!
//! Pure, I/O-free computations over the income records a view received from
//! the API: date filtering, stable sorting, totals and chart series.
//!
//! Nothing here ever computes `income` itself; it only sums, averages and
//! reorders what the server sent.

mod charts;
mod filter;
mod sort;
mod totals;

pub use charts::{
    available_sources, capitalize, heads_over_time, income_over_time, source_series, trend_series,
    ChartSeries,
};
pub use filter::filter_by_date;
pub use sort::{sort_records, SortConfig, SortDirection, SortField};
pub use totals::{safe_average, totals, Totals};
