pub mod daily_aggregation;
pub mod report_builder;


pub use daily_aggregation::{AggregationSummary, DailyAggregationService};
