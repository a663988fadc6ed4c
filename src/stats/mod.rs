//! Stats module - aggregation queries and display formatting

mod aggregator;
pub mod format;

pub use aggregator::{Aggregator, CleaningSummary, EmptyDatasetError, MetricsSummary, TOP_N};
