//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the stats engine.
//! CONTEXT: Re-exports the record model, aggregation policies and the query
//! engine for use by the pivot and persistence crates.

pub mod aggregation;
pub mod error;
pub mod number_format;
pub mod query;
pub mod record;
pub mod value;

// Re-export commonly used types at the crate root
pub use aggregation::{Aggregation, AggregationFn, AggregationPolicies};
pub use error::QueryError;
pub use number_format::{format_decimal, format_general, format_number, parse_number};
pub use query::{
    compact, distinct_labels, distinct_values, filter, group, Criterion, Predicate, RecordSet,
};
pub use record::Record;
pub use value::StatValue;
