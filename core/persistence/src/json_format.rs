//! FILENAME: core/persistence/src/json_format.rs
//! JSON stats files.
//!
//! Two layouts are accepted on load:
//! - a bare array of records
//! - an object with `context` (shared fields) and `benchmarks` (records);
//!   every benchmark inherits the context fields it does not set itself
//!
//! Dumps always write a bare array, indented by four spaces.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use engine::{Record, StatValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PersistenceError;
use crate::LoadedStats;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatsJson {
    Records(Vec<Value>),
    Document(StatsDocument),
}

#[derive(Debug, Default, Deserialize)]
struct StatsDocument {
    #[serde(default)]
    context: Map<String, Value>,
    #[serde(default)]
    benchmarks: Vec<Value>,
}

pub fn load_json(path: &Path) -> Result<LoadedStats, PersistenceError> {
    let reader = BufReader::new(File::open(path)?);
    let parsed: StatsJson = serde_json::from_reader(reader).map_err(|e| {
        PersistenceError::InvalidFormat(format!("{}: {}", path.display(), e))
    })?;
    parse_stats(parsed)
}

/// Parses stats from an in-memory JSON document.
pub fn parse_json(text: &str) -> Result<LoadedStats, PersistenceError> {
    let parsed: StatsJson = serde_json::from_str(text)
        .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;
    parse_stats(parsed)
}

fn parse_stats(parsed: StatsJson) -> Result<LoadedStats, PersistenceError> {
    match parsed {
        StatsJson::Records(values) => Ok(LoadedStats {
            context: Record::new(),
            benchmarks: values
                .into_iter()
                .map(value_to_record)
                .collect::<Result<_, _>>()?,
        }),
        StatsJson::Document(document) => {
            let context = object_to_record(document.context);
            let benchmarks = document
                .benchmarks
                .into_iter()
                .map(|value| {
                    let mut record = value_to_record(value)?;
                    record.merge_missing(&context);
                    Ok(record)
                })
                .collect::<Result<_, PersistenceError>>()?;
            Ok(LoadedStats { context, benchmarks })
        }
    }
}

pub fn save_json(path: &Path, records: &[Record]) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(to_json_string(records)?.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Pretty JSON array of records, indented by four spaces.
pub fn to_json_string(records: &[Record]) -> Result<String, PersistenceError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|e| PersistenceError::InvalidFormat(e.to_string()))
}

fn value_to_record(value: Value) -> Result<Record, PersistenceError> {
    match value {
        Value::Object(fields) => Ok(object_to_record(fields)),
        other => Err(PersistenceError::InvalidFormat(format!(
            "expected a benchmark object, found: {}",
            other
        ))),
    }
}

fn object_to_record(fields: Map<String, Value>) -> Record {
    fields
        .into_iter()
        .map(|(field, value)| (field, json_to_stat(value)))
        .collect()
}

/// Flattens a JSON value into a scalar. Booleans and nested structures
/// keep their JSON text so they can still be matched as strings.
fn json_to_stat(value: Value) -> StatValue {
    match value {
        Value::Null => StatValue::Empty,
        Value::Number(n) => n.as_f64().map_or(StatValue::Empty, StatValue::Number),
        Value::String(s) => StatValue::Text(s),
        Value::Bool(b) => StatValue::Text(b.to_string()),
        nested => StatValue::Text(nested.to_string()),
    }
}
