//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a pivot table and the
//! annotations appended to it. These structures are designed to be:
//! - Serializable (so report layouts can live in JSON next to the stats)
//! - Cheap to clone and defaulted field by field

use engine::Aggregation;
use serde::{Deserialize, Serialize};

// ============================================================================
// MARKERS
// ============================================================================

/// Medal markers for the first three ranks.
pub const MEDALS: [&str; 3] = [":1st_place_medal:", ":2nd_place_medal:", ":3rd_place_medal:"];

/// Marker for a result in the favored third of the value range.
pub const THUMBS_UP: &str = ":thumbsup:";

/// Marker for a result in the unfavored third of the value range.
pub const THUMBS_DOWN: &str = ":thumbsdown:";

/// Equivalent glyphs for a dominant leader; one is picked and repeated 3 times.
pub const DOMINANCE_GLYPHS: [&str; 3] = [":fire:", ":strawberry:", ":underage:"];

/// How many times the dominance glyph is repeated.
pub const DOMINANCE_REPEAT: usize = 3;

/// Default leader/runner-up ratio above which the leader is dominant.
pub const DEFAULT_DOMINANCE_RATIO: f64 = 10.0;

// ============================================================================
// LAYOUT
// ============================================================================

/// Which record fields feed the rows, columns and cells of a pivot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotLayout {
    /// Field whose values become row labels.
    pub row_field: String,

    /// Field whose values become column labels.
    pub col_field: String,

    /// Field whose value fills the cell.
    pub cell_field: String,

    /// Explicit row labels (order and subset). Derived when absent or empty.
    #[serde(default)]
    pub row_labels: Option<Vec<String>>,

    /// Explicit column labels (order and subset). Derived when absent or empty.
    #[serde(default)]
    pub col_labels: Option<Vec<String>>,
}

impl PivotLayout {
    pub fn new(
        row_field: impl Into<String>,
        col_field: impl Into<String>,
        cell_field: impl Into<String>,
    ) -> Self {
        PivotLayout {
            row_field: row_field.into(),
            col_field: col_field.into(),
            cell_field: cell_field.into(),
            row_labels: None,
            col_labels: None,
        }
    }

    pub fn with_row_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.row_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_col_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.col_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// ANNOTATION TARGETS
// ============================================================================

/// The column an annotation is computed over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum ColumnRef {
    /// The current last column (including earlier annotations).
    #[default]
    Last,
    /// Column by 0-based index.
    Index(usize),
    /// Column by header label.
    Named(String),
    /// Per-row aggregate of the numeric cells in the pivot's own columns.
    RowAggregate(Aggregation),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(label: &str) -> Self {
        ColumnRef::Named(label.to_string())
    }
}

// ============================================================================
// ANNOTATION OPTIONS
// ============================================================================

/// Ranking column: medals for the top three, `# N` for the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingOptions {
    pub column: ColumnRef,
    pub bigger_is_better: bool,
}

impl Default for RankingOptions {
    fn default() -> Self {
        RankingOptions {
            column: ColumnRef::Last,
            bigger_is_better: true,
        }
    }
}

/// Relative gain column: every row divided by a baseline row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GainOptions {
    pub column: ColumnRef,
    pub baseline_row: usize,
    /// Wrap the best gain(s) in bold markup.
    pub highlight_best: bool,
}

/// Qualitative "stood out" column: thumbs up/down for the outer thirds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerOptions {
    pub column: ColumnRef,
    /// Compute the bracket edges in log space.
    pub log_scale: bool,
    pub bigger_is_better: bool,
    /// Leader/runner-up ratio above which the leader gets a dominance glyph.
    pub dominance_ratio: f64,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        MarkerOptions {
            column: ColumnRef::Last,
            log_scale: false,
            bigger_is_better: true,
            dominance_ratio: DEFAULT_DOMINANCE_RATIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_load_from_partial_json() {
        let ranking: RankingOptions = serde_json::from_str(r#"{"bigger_is_better": false}"#).unwrap();
        assert!(!ranking.bigger_is_better);
        assert!(matches!(ranking.column, ColumnRef::Last));

        let markers: MarkerOptions =
            serde_json::from_str(r#"{"column": {"Named": "insert"}, "log_scale": true}"#).unwrap();
        assert!(markers.log_scale);
        assert!(matches!(markers.column, ColumnRef::Named(ref n) if n == "insert"));
        assert_eq!(markers.dominance_ratio, DEFAULT_DOMINANCE_RATIO);
    }

    #[test]
    fn test_gain_defaults_target_last_column() {
        let gains: GainOptions = serde_json::from_str("{}").unwrap();
        assert!(matches!(gains.column, ColumnRef::Last));
        assert_eq!(gains.baseline_row, 0);
        assert!(!gains.highlight_best);
        assert!(matches!(ColumnRef::default(), ColumnRef::Last));
    }

    #[test]
    fn test_layout_from_json() {
        let layout: PivotLayout = serde_json::from_str(
            r#"{"row_field": "database", "col_field": "operation", "cell_field": "ops"}"#,
        )
        .unwrap();
        assert_eq!(layout, PivotLayout::new("database", "operation", "ops"));
    }
}
