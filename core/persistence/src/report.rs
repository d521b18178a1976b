//! FILENAME: core/persistence/src/report.rs
//! Markdown report assembly: text blocks and rendered pivot tables,
//! accumulated in order and written out in one go.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use pivot_engine::{PivotError, PivotTable};

use crate::error::PersistenceError;

/// An accumulating Markdown document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    content: String,
}

impl Report {
    pub fn new() -> Self {
        Report {
            content: String::new(),
        }
    }

    /// Appends a text block. Common indentation is stripped, so blocks can
    /// be written as indented raw strings. Blocks are followed by two blank
    /// lines, which Markdown headers need.
    pub fn add_text(&mut self, text: &str) -> &mut Self {
        self.content.push_str(&clean_doc(text));
        self.content.push_str("\n\n\n");
        self
    }

    /// Appends a rendered table followed by a blank line.
    pub fn add_table(&mut self, table: &PivotTable) -> Result<&mut Self, PivotError> {
        let markdown = table.to_markdown()?;
        self.content.push_str(&markdown);
        self.content.push_str("\n\n");
        Ok(self)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Writes the accumulated content to `path` (replacing or appending to
    /// the file) and starts over with an empty report.
    pub fn print_to(&mut self, path: &Path, overwrite: bool) -> Result<(), PersistenceError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(overwrite)
            .append(!overwrite)
            .open(path)?;
        file.write_all(self.content.as_bytes())?;
        file.flush()?;

        log::info!(
            target: "REPORT",
            "print_to path={} bytes={} overwrite={}",
            path.display(),
            self.content.len(),
            overwrite
        );
        self.content.clear();
        Ok(())
    }
}

/// Strips the first line's leading whitespace, the common indentation of
/// the remaining lines, and blank lines at both ends. Indentation is
/// counted in chars, so any Unicode whitespace can indent.
fn clean_doc(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_start()
            } else if line.trim().is_empty() {
                ""
            } else {
                line.char_indices().nth(margin).map_or("", |(at, _)| &line[at..])
            }
        })
        .collect();

    let start = cleaned.iter().position(|l| !l.is_empty()).unwrap_or(cleaned.len());
    let end = cleaned.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    cleaned[start..end].join("\n")
}
