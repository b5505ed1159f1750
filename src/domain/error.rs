// Domain errors raised while filtering and aggregating
use super::record::Column;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("required column `{0}` is missing from the dataset")]
    MissingColumn(Column),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
    #[error("dataset is empty, a date range cannot default to its span")]
    EmptyDataset,
}
