//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot Table subsystem for benchmark stats.
//!
//! This crate turns query results from `engine` into pivot tables and
//! renders them as Markdown. It depends on `engine` only for shared types
//! (Record, StatValue, Aggregation).
//!
//! Layers:
//! - `definition`: Serializable configuration (layout and annotation options)
//! - `table`: The pivot grid and the builder that fills it from records
//! - `annotate`: Derived comparison columns (ranking, gains, markers)
//! - `render`: Markdown output

pub mod definition;
pub mod error;
pub mod table;
pub mod annotate;
pub mod render;

pub use definition::*;
pub use error::PivotError;
pub use table::{to_table, ChartSeries, PivotTable};
pub use render::render_markdown;
