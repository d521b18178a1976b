//! FILENAME: core/pivot-engine/src/render.rs
//! Grid Renderer - serializes a pivot table into a Markdown table.
//!
//! Layout:
//! - header row: empty corner cell, then the column labels
//! - separator row: left-aligned first column, centered for the rest
//! - one row per row label

use engine::StatValue;

use crate::error::PivotError;
use crate::table::PivotTable;

const ALIGN_LEFT: &str = ":---";
const ALIGN_CENTER: &str = ":---:";

impl PivotTable {
    /// Renders the table as pipe-delimited Markdown. Fails on an empty table
    /// or when the headers and the grid disagree on shape.
    pub fn to_markdown(&self) -> Result<String, PivotError> {
        self.validate_shape()?;

        let mut lines = Vec::with_capacity(self.row_count() + 2);

        let header: Vec<&str> = std::iter::once("")
            .chain(self.col_labels().iter().map(String::as_str))
            .collect();
        lines.push(render_line(&header));

        let separator: Vec<&str> = std::iter::once(ALIGN_LEFT)
            .chain(std::iter::repeat(ALIGN_CENTER).take(self.col_count()))
            .collect();
        lines.push(render_line(&separator));

        for (label, cells) in self.row_labels().iter().zip(self.grid()) {
            let rendered: Vec<String> = cells.iter().map(StatValue::display_value).collect();
            let row: Vec<&str> = std::iter::once(label.as_str())
                .chain(rendered.iter().map(String::as_str))
                .collect();
            lines.push(render_line(&row));
        }

        Ok(lines.join("\n"))
    }

    fn validate_shape(&self) -> Result<(), PivotError> {
        if self.grid().is_empty() {
            return Err(PivotError::EmptyTable);
        }
        if self.row_labels().len() != self.grid().len() {
            return Err(PivotError::ShapeMismatch(format!(
                "{} row labels for {} rows",
                self.row_labels().len(),
                self.grid().len()
            )));
        }
        if let Some((index, cells)) = self
            .grid()
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != self.col_count())
        {
            return Err(PivotError::ShapeMismatch(format!(
                "{} column labels but row {} has {} cells",
                self.col_count(),
                index,
                cells.len()
            )));
        }
        Ok(())
    }
}

/// Renders the table as Markdown; see `PivotTable::to_markdown`.
pub fn render_markdown(table: &PivotTable) -> Result<String, PivotError> {
    table.to_markdown()
}

fn render_line(cells: &[&str]) -> String {
    let escaped: Vec<String> = cells.iter().map(|cell| escape_cell(cell)).collect();
    format!("| {} |", escaped.join(" | "))
}

/// Keeps a cell on one line and its pipes out of the column structure.
fn escape_cell(cell: &str) -> String {
    cell.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}
