//! FILENAME: core/persistence/src/csv_format.rs
//! CSV stats files: a header row of field names, then one record per row.
//!
//! Empty cells load as `Empty`, cells that parse as plain numbers load as
//! numbers, everything else as text. Dumps use the sorted union of all
//! record fields as the header, leaving cells blank where a record lacks
//! the field.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use engine::{format_general, Record, StatValue};

use crate::error::PersistenceError;
use crate::LoadedStats;

pub fn load_csv(path: &Path) -> Result<LoadedStats, PersistenceError> {
    let reader = csv::Reader::from_path(path)?;
    read_records(reader)
}

/// Parses stats from any CSV source with a header row.
pub fn parse_csv<R: Read>(source: R) -> Result<LoadedStats, PersistenceError> {
    read_records(csv::Reader::from_reader(source))
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<LoadedStats, PersistenceError> {
    let headers = reader.headers()?.clone();

    let mut benchmarks = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(field, cell)| (field, csv_to_stat(cell)))
            .collect();
        benchmarks.push(record);
    }

    Ok(LoadedStats {
        context: Record::new(),
        benchmarks,
    })
}

pub fn save_csv(path: &Path, records: &[Record]) -> Result<(), PersistenceError> {
    let writer = csv::Writer::from_path(path)?;
    write_records(writer, records)
}

/// Writes records as CSV into any sink.
pub fn write_csv<W: Write>(sink: W, records: &[Record]) -> Result<(), PersistenceError> {
    write_records(csv::Writer::from_writer(sink), records)
}

fn write_records<W: Write>(mut writer: csv::Writer<W>, records: &[Record]) -> Result<(), PersistenceError> {
    if records.is_empty() {
        return Ok(());
    }

    let fields: BTreeSet<&str> = records.iter().flat_map(Record::fields).collect();
    writer.write_record(&fields)?;

    for record in records {
        writer.write_record(
            fields
                .iter()
                .map(|field| record.get(field).map(stat_to_csv).unwrap_or_default()),
        )?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_to_stat(cell: &str) -> StatValue {
    if cell.is_empty() {
        return StatValue::Empty;
    }
    match cell.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => StatValue::Number(n),
        _ => StatValue::text(cell),
    }
}

fn stat_to_csv(value: &StatValue) -> String {
    match value {
        StatValue::Empty => String::new(),
        StatValue::Number(n) => format_general(*n),
        StatValue::Text(s) => s.clone(),
    }
}
