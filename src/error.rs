//! Error types for the sales dashboard.
//!
//! Only loading and export can fail. The aggregation families are infallible:
//! a filter that matches nothing produces empty results, not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{file}: required column `{column}` is missing")]
    MissingColumn { file: String, column: String },

    #[error("{file} line {line}: cannot parse timestamp `{value}`")]
    InvalidTimestamp {
        file: String,
        line: u64,
        value: String,
    },

    #[error("{file} line {line}: unknown web event channel `{value}`")]
    InvalidChannel {
        file: String,
        line: u64,
        value: String,
    },

    #[error("{table}: id {id} appears more than once")]
    DuplicateId { table: &'static str, id: i64 },

    #[error("{table} row {id}: {column} references missing {target} id {missing}")]
    DanglingReference {
        table: &'static str,
        id: i64,
        column: &'static str,
        target: &'static str,
        missing: i64,
    },

    #[error("no dataset loaded; load the CSV files first")]
    DatasetNotLoaded,
}

impl Error {
    pub(crate) fn csv(file: &str, source: csv::Error) -> Self {
        Error::Csv {
            file: file.to_string(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
