//! FILENAME: core/persistence/src/lib.rs
//! Stats Persistence Module
//!
//! Loads and dumps benchmark stats files (JSON or CSV, chosen by extension),
//! supports predicate-based lookup and upsert on the loaded records, and
//! assembles Markdown reports.

mod csv_format;
mod error;
mod json_format;
mod report;

pub use csv_format::{load_csv, parse_csv, save_csv, write_csv};
pub use error::PersistenceError;
pub use json_format::{load_json, parse_json, save_json, to_json_string};
pub use report::Report;

use std::path::{Path, PathBuf};

use engine::{Predicate, Record, RecordSet};
use pivot_engine::{to_table, PivotLayout, PivotTable};

// ============================================================================
// FORMATS
// ============================================================================

/// What a stats file holds after loading: shared context fields (already
/// merged into every benchmark) and the benchmark records themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedStats {
    pub context: Record,
    pub benchmarks: Vec<Record>,
}

/// On-disk layout of a stats file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFormat {
    Json,
    Csv,
}

impl StatsFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, PersistenceError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(StatsFormat::Json),
            "csv" => Ok(StatsFormat::Csv),
            _ => Err(PersistenceError::UnsupportedExtension(format!(
                "{} (expected .json or .csv)",
                path.display()
            ))),
        }
    }

    fn load(self, path: &Path) -> Result<LoadedStats, PersistenceError> {
        match self {
            StatsFormat::Json => load_json(path),
            StatsFormat::Csv => load_csv(path),
        }
    }

    fn save(self, path: &Path, records: &[Record]) -> Result<(), PersistenceError> {
        match self {
            StatsFormat::Json => save_json(path, records),
            StatsFormat::Csv => save_csv(path, records),
        }
    }
}

// ============================================================================
// STATS FILE
// ============================================================================

/// A collection of benchmark records, optionally bound to a file.
#[derive(Debug, Clone, Default)]
pub struct StatsFile {
    path: Option<PathBuf>,
    context: Record,
    benchmarks: Vec<Record>,
}

impl StatsFile {
    /// An unbound, empty stats file.
    pub fn new() -> Self {
        StatsFile::default()
    }

    /// Wraps records that live only in memory.
    pub fn from_records(benchmarks: Vec<Record>) -> Self {
        StatsFile {
            path: None,
            context: Record::new(),
            benchmarks,
        }
    }

    /// Opens a stats file. A file that does not exist yet yields an empty
    /// collection bound to `path`, so a later `dump` creates it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let mut file = StatsFile {
            path: Some(path.to_path_buf()),
            ..StatsFile::default()
        };
        file.reset_from_file()?;
        Ok(file)
    }

    /// Discards in-memory changes and reloads from the bound path.
    pub fn reset_from_file(&mut self) -> Result<(), PersistenceError> {
        let path = self.path.clone().ok_or(PersistenceError::MissingPath)?;
        let format = StatsFormat::from_path(&path)?;

        if !path.exists() {
            log::info!(target: "PERSIST", "open path={} (new file)", path.display());
            self.context = Record::new();
            self.benchmarks.clear();
            return Ok(());
        }

        let loaded = format.load(&path)?;
        log::info!(
            target: "PERSIST",
            "open path={} benchmarks={} context_fields={}",
            path.display(),
            loaded.benchmarks.len(),
            loaded.context.len()
        );
        self.context = loaded.context;
        self.benchmarks = loaded.benchmarks;
        Ok(())
    }

    /// Writes the records back to the bound path.
    pub fn dump(&self) -> Result<(), PersistenceError> {
        let path = self.path.as_deref().ok_or(PersistenceError::MissingPath)?;
        self.dump_to(path)
    }

    /// Writes the records to `path`, in the format its extension names.
    pub fn dump_to(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let format = StatsFormat::from_path(path)?;
        format.save(path, &self.benchmarks)?;
        log::info!(
            target: "PERSIST",
            "dump path={} benchmarks={}",
            path.display(),
            self.benchmarks.len()
        );
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn context(&self) -> &Record {
        &self.context
    }

    pub fn benchmarks(&self) -> &[Record] {
        &self.benchmarks
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Appends every benchmark of `other`.
    pub fn append(&mut self, other: &StatsFile) -> &mut Self {
        self.benchmarks.extend(other.benchmarks.iter().cloned());
        self
    }

    pub fn push(&mut self, record: Record) -> &mut Self {
        self.benchmarks.push(record);
        self
    }

    /// Index of the first benchmark matching `predicate`.
    pub fn existing_index(&self, predicate: &Predicate) -> Result<Option<usize>, PersistenceError> {
        predicate.validate()?;
        Ok(self.benchmarks.iter().position(|record| predicate.matches(record)))
    }

    pub fn contains(&self, predicate: &Predicate) -> Result<bool, PersistenceError> {
        Ok(self.existing_index(predicate)?.is_some())
    }

    /// Replaces the first benchmark matching `predicate` with `record`, or
    /// appends `record` when none matches. Returns true when appended.
    pub fn upsert(&mut self, record: Record, predicate: &Predicate) -> Result<bool, PersistenceError> {
        match self.existing_index(predicate)? {
            Some(index) => {
                log::debug!(target: "PERSIST", "upsert replaced index={}", index);
                self.benchmarks[index] = record;
                Ok(false)
            }
            None => {
                log::debug!(target: "PERSIST", "upsert appended index={}", self.benchmarks.len());
                self.benchmarks.push(record);
                Ok(true)
            }
        }
    }

    /// A chainable query over all benchmarks.
    pub fn subset(&self) -> RecordSet {
        RecordSet::from_records(&self.benchmarks)
    }

    /// The benchmarks matching `predicate`.
    pub fn filtered(&self, predicate: &Predicate) -> Result<RecordSet, PersistenceError> {
        Ok(self.subset().filtered(predicate)?)
    }

    /// Pivots all benchmarks, with labels derived from the records.
    pub fn table(&self, rows: &str, cols: &str, cells: &str) -> Result<PivotTable, PersistenceError> {
        self.table_with(&PivotLayout::new(rows, cols, cells))
    }

    pub fn table_with(&self, layout: &PivotLayout) -> Result<PivotTable, PersistenceError> {
        Ok(to_table(&self.benchmarks, layout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::StatValue;

    fn record(database: &str, operation: &str, ops: f64) -> Record {
        Record::new()
            .with("database_name", database)
            .with("operation_name", operation)
            .with("operations_per_second", ops)
    }

    fn key(database: &str, operation: &str) -> Predicate {
        Predicate::new()
            .exact("database_name", database)
            .exact("operation_name", operation)
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(StatsFormat::from_path(Path::new("a.json")).unwrap(), StatsFormat::Json);
        assert_eq!(StatsFormat::from_path(Path::new("A.CSV")).unwrap(), StatsFormat::Csv);
        assert!(matches!(
            StatsFormat::from_path(Path::new("a.xlsx")),
            Err(PersistenceError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            StatsFormat::from_path(Path::new("stats")),
            Err(PersistenceError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.json");

        let file = StatsFile::open(&path).unwrap();
        assert!(file.is_empty());
        assert_eq!(file.path(), Some(path.as_path()));
        assert!(!path.exists());
    }

    #[test]
    fn test_open_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = StatsFile::open(dir.path().join("stats.txt")).unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut file = StatsFile::from_records(vec![
            record("MongoDB", "Insert", 1000.0),
            record("SQLite", "Insert", 500.0),
        ]);

        let inserted = file
            .upsert(record("SQLite", "Insert", 750.0), &key("SQLite", "Insert"))
            .unwrap();
        assert!(!inserted);
        assert_eq!(file.len(), 2);
        assert_eq!(
            file.benchmarks()[1].get("operations_per_second"),
            Some(&StatValue::Number(750.0))
        );

        let inserted = file
            .upsert(record("SQLite", "Find", 90.0), &key("SQLite", "Find"))
            .unwrap();
        assert!(inserted);
        assert_eq!(file.len(), 3);
        assert!(file.contains(&key("SQLite", "Find")).unwrap());
        assert_eq!(file.existing_index(&key("MongoDB", "Find")).unwrap(), None);
    }

    #[test]
    fn test_invalid_predicate_is_rejected() {
        let file = StatsFile::from_records(vec![record("MongoDB", "Insert", 1.0)]);
        let predicate = Predicate::new().exact("database_name", StatValue::Empty);
        let err = file.existing_index(&predicate).unwrap_err();
        assert!(matches!(err, PersistenceError::Query(_)));
    }

    #[test]
    fn test_dump_without_path() {
        let file = StatsFile::from_records(vec![record("MongoDB", "Insert", 1.0)]);
        assert!(matches!(file.dump(), Err(PersistenceError::MissingPath)));
    }

    #[test]
    fn test_json_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let mut file = StatsFile::open(&path).unwrap();
        file.push(record("MongoDB", "Insert", 1000.0));
        file.push(record("SQLite", "Insert", 0.5));
        file.dump().unwrap();

        let reopened = StatsFile::open(&path).unwrap();
        assert_eq!(reopened.benchmarks(), file.benchmarks());
    }

    #[test]
    fn test_reset_from_file_discards_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");

        let mut file = StatsFile::open(&path).unwrap();
        file.push(record("MongoDB", "Insert", 1000.0));
        file.dump().unwrap();

        file.push(record("SQLite", "Insert", 500.0));
        assert_eq!(file.len(), 2);
        file.reset_from_file().unwrap();
        assert_eq!(file.len(), 1);
    }

    #[test]
    fn test_append_and_table() {
        let mut mongo = StatsFile::from_records(vec![record("MongoDB", "Insert", 1000.0)]);
        let sqlite = StatsFile::from_records(vec![record("SQLite", "Insert", 500.0)]);
        mongo.append(&sqlite);

        let table = mongo
            .table("database_name", "operation_name", "operations_per_second")
            .unwrap();
        assert_eq!(table.row_labels(), &["MongoDB".to_string(), "SQLite".to_string()]);
        assert_eq!(table.col_labels(), &["Insert".to_string()]);
        assert_eq!(table.cell_at("SQLite", "Insert"), Some(&StatValue::Number(500.0)));
    }

    #[test]
    fn test_filtered_subset() {
        let file = StatsFile::from_records(vec![
            record("MongoDB", "Insert", 1000.0),
            record("SQLite", "Insert", 500.0),
        ]);
        let only_sqlite = file
            .filtered(&Predicate::new().exact("database_name", "SQLite"))
            .unwrap();
        assert_eq!(only_sqlite.len(), 1);
        assert_eq!(file.subset().len(), 2);
    }
}
