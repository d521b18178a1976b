//! FILENAME: core/pivot-engine/src/table.rs
//! Pivot Table - a rectangular grid addressed by (row label, column label).
//!
//! Algorithm (`to_table`):
//! 1. Resolve row/column labels (caller supplied, or sorted distinct values)
//! 2. Allocate the grid with every cell set to the empty sentinel
//! 3. Write each record's cell value at its (row, column) position, skipping
//!    records whose labels are not part of the table

use engine::{distinct_labels, Record, StatValue};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::definition::{ColumnRef, PivotLayout};
use crate::error::PivotError;

/// A 2D grid of values with row and column headers.
///
/// Annotations append columns; existing columns are never reordered or
/// removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    grid: Vec<Vec<StatValue>>,
    /// Number of columns that came from records, before any annotation.
    source_columns: usize,
}

/// One row of numeric values, as consumed by a charting backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    /// One entry per column; `None` where the cell is not numeric.
    pub values: Vec<Option<f64>>,
}

impl PivotTable {
    /// Assembles a table from already computed parts. Shape is checked when
    /// the table is rendered, not here.
    pub fn from_parts(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        grid: Vec<Vec<StatValue>>,
    ) -> Self {
        let source_columns = col_labels.len();
        PivotTable {
            row_labels,
            col_labels,
            grid,
            source_columns,
        }
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn grid(&self) -> &[Vec<StatValue>] {
        &self.grid
    }

    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_labels.len()
    }

    /// Number of columns filled from records (annotations excluded).
    pub fn source_columns(&self) -> usize {
        self.source_columns
    }

    pub fn row(&self, row: usize) -> Option<&[StatValue]> {
        self.grid.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&StatValue> {
        self.grid.get(row)?.get(col)
    }

    /// Looks a cell up by its labels.
    pub fn cell_at(&self, row_label: &str, col_label: &str) -> Option<&StatValue> {
        let row = self.row_labels.iter().position(|l| l == row_label)?;
        let col = self.col_labels.iter().position(|l| l == col_label)?;
        self.cell(row, col)
    }

    /// Per-row numeric series over the pivot's own columns, for charts.
    pub fn series(&self) -> Vec<ChartSeries> {
        self.row_labels
            .iter()
            .zip(&self.grid)
            .map(|(label, cells)| ChartSeries {
                label: label.clone(),
                values: cells
                    .iter()
                    .take(self.source_columns)
                    .map(StatValue::as_number)
                    .collect(),
            })
            .collect()
    }

    /// Resolves a column reference to its header label and per-row numbers.
    /// Cells that are not numeric (or missing) come back as `None`.
    pub fn numeric_column(&self, column: &ColumnRef) -> Result<(String, Vec<Option<f64>>), PivotError> {
        if let ColumnRef::RowAggregate(policy) = column {
            let values = self
                .grid
                .iter()
                .map(|cells| {
                    let numbers: Vec<StatValue> = cells
                        .iter()
                        .take(self.source_columns)
                        .filter_map(StatValue::as_number)
                        .map(StatValue::Number)
                        .collect();
                    if numbers.is_empty() {
                        None
                    } else {
                        policy.apply(&numbers).as_number()
                    }
                })
                .collect();
            return Ok((format!("{} of row", policy.name()), values));
        }

        let index = self.column_index(column)?;
        let values = self
            .grid
            .iter()
            .map(|cells| cells.get(index).and_then(StatValue::as_number))
            .collect();
        Ok((self.col_labels[index].clone(), values))
    }

    /// Index of a concrete column. Fails for unknown labels and out-of-range indices.
    pub fn column_index(&self, column: &ColumnRef) -> Result<usize, PivotError> {
        match column {
            ColumnRef::Last => self
                .col_labels
                .len()
                .checked_sub(1)
                .ok_or_else(|| PivotError::NoSuchColumn("<last>".to_string())),
            ColumnRef::Index(index) if *index < self.col_labels.len() => Ok(*index),
            ColumnRef::Index(index) => Err(PivotError::NoSuchColumn(index.to_string())),
            ColumnRef::Named(label) => self
                .col_labels
                .iter()
                .position(|l| l == label)
                .ok_or_else(|| PivotError::NoSuchColumn(label.clone())),
            ColumnRef::RowAggregate(policy) => {
                Err(PivotError::NoSuchColumn(format!("{} of row", policy.name())))
            }
        }
    }

    /// Appends a derived column. `cells` holds one value per row.
    pub(crate) fn push_column(&mut self, header: String, cells: Vec<StatValue>) {
        debug_assert_eq!(cells.len(), self.grid.len());
        self.col_labels.push(header);
        for (row, cell) in self.grid.iter_mut().zip(cells) {
            row.push(cell);
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Pivots `records` into a table.
///
/// Records missing any of the three layout fields are ignored, as are
/// records whose labels are not among the table's labels (this is how a
/// caller restricts a pivot to a subset of categories). A second record for
/// an already filled cell is an error: group or compact the input first.
pub fn to_table(records: &[Record], layout: &PivotLayout) -> Result<PivotTable, PivotError> {
    let row_labels = resolve_labels(records, &layout.row_field, layout.row_labels.as_deref());
    let col_labels = resolve_labels(records, &layout.col_field, layout.col_labels.as_deref());

    let row_index = label_index(&row_labels);
    let col_index = label_index(&col_labels);

    let mut grid = vec![vec![StatValue::Empty; col_labels.len()]; row_labels.len()];
    let mut filled = vec![vec![false; col_labels.len()]; row_labels.len()];
    let mut skipped = 0usize;

    for record in records {
        let (Some(row_value), Some(col_value), Some(cell_value)) = (
            record.get(&layout.row_field),
            record.get(&layout.col_field),
            record.get(&layout.cell_field),
        ) else {
            skipped += 1;
            continue;
        };

        let row_label = row_value.label();
        let col_label = col_value.label();
        let (Some(&row), Some(&col)) = (
            row_index.get(row_label.as_str()),
            col_index.get(col_label.as_str()),
        ) else {
            skipped += 1;
            continue;
        };

        if filled[row][col] {
            return Err(PivotError::DuplicateCell {
                row: row_label,
                column: col_label,
            });
        }
        grid[row][col] = cell_value.clone();
        filled[row][col] = true;
    }

    log::info!(
        target: "PIVOT",
        "to_table rows={} cols={} records={} skipped={}",
        row_labels.len(),
        col_labels.len(),
        records.len(),
        skipped
    );

    Ok(PivotTable::from_parts(row_labels, col_labels, grid))
}

fn resolve_labels(records: &[Record], field: &str, explicit: Option<&[String]>) -> Vec<String> {
    match explicit {
        Some(labels) if !labels.is_empty() => labels.to_vec(),
        _ => distinct_labels(records, field),
    }
}

/// Label -> position. With duplicate labels the first position wins.
fn label_index(labels: &[String]) -> FxHashMap<&str, usize> {
    let mut index = FxHashMap::default();
    for (position, label) in labels.iter().enumerate() {
        index.entry(label.as_str()).or_insert(position);
    }
    index
}
