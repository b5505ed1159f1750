// Domain layer - Records, ranges and aggregations
pub mod aggregation;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod record;
