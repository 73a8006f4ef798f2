//! Stats module - aggregation of education metrics

mod aggregator;

pub use aggregator::{format_delta, format_percent, MetricsAggregator, NationalOverview, StateReport, StateSummary};
