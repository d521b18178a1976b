//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PivotError {
    #[error("No such column: {0}")]
    NoSuchColumn(String),

    #[error("No such row: {0}")]
    NoSuchRow(usize),

    #[error("Duplicate value for row '{row}' and column '{column}'; group or compact the records first")]
    DuplicateCell { row: String, column: String },

    #[error("Mismatch in table shape: {0}")]
    ShapeMismatch(String),

    #[error("Empty table")]
    EmptyTable,
}
