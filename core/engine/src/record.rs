//! FILENAME: core/engine/src/record.rs
//! PURPOSE: A single benchmark observation: field name -> scalar value.
//! CONTEXT: Records are plain owned data. Every query operation works on
//! clones, so a caller's records are never modified in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::StatValue;

/// One flat mapping of field names to scalar values.
/// Fields are kept in name order so exports and debug output are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, StatValue>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: BTreeMap::new(),
        }
    }

    /// Builds a record from `(field, value)` pairs. Later duplicates win.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<StatValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs.into_iter().collect()
    }

    /// Chaining form of `insert`, convenient for fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&StatValue> {
        self.fields.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<StatValue>,
    ) -> Option<StatValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<StatValue> {
        self.fields.remove(field)
    }

    /// Copies every field of `other` that this record does not already have.
    pub fn merge_missing(&mut self, other: &Record) {
        for (field, value) in &other.fields {
            self.fields
                .entry(field.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<StatValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, StatValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, StatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
