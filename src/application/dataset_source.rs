// Source trait for loading the rental dataset
use crate::domain::dataset::Dataset;
use crate::domain::record::Column;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup errors while reading the dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding failure reported by the underlying reader
    #[error("malformed dataset: {0}")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("date column `dteday` is missing")]
    MissingDateColumn,

    #[error("columns missing from dataset: {}", .0.iter().map(|c| c.name()).collect::<Vec<_>>().join(", "))]
    MissingColumns(Vec<Column>),

    #[error("line {line}: invalid value {value:?} for column `{column}`")]
    InvalidValue {
        line: u64,
        column: Column,
        value: String,
    },
}

pub trait DatasetSource {
    /// Read the whole dataset. Called once at startup.
    fn load(&self) -> Result<Dataset, LoadError>;
}
