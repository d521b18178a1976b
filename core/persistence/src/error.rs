//! FILENAME: core/persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown extension: {0}")]
    UnsupportedExtension(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Stats file has no path to dump to")]
    MissingPath,

    #[error("Query error: {0}")]
    Query(#[from] engine::QueryError),

    #[error("Pivot error: {0}")]
    Pivot(#[from] pivot_engine::PivotError),
}
