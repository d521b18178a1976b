//! FILENAME: core/engine/src/query/record_set.rs
//! PURPOSE: Chainable owner of an independent copy of a record collection.

use crate::aggregation::AggregationPolicies;
use crate::error::QueryError;
use crate::query::{compact, filter, group, Predicate};
use crate::record::Record;

/// A working set of records. Ingested records are cloned, so the caller's
/// collection stays untouched while the set is filtered and reshaped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        RecordSet {
            records: Vec::new(),
        }
    }

    pub fn from_records(records: &[Record]) -> Self {
        RecordSet {
            records: records.to_vec(),
        }
    }

    /// Appends copies of `records`.
    pub fn include(mut self, records: &[Record]) -> Self {
        self.records.extend_from_slice(records);
        self
    }

    pub fn filtered(mut self, predicate: &Predicate) -> Result<Self, QueryError> {
        self.records = filter(&self.records, predicate)?;
        Ok(self)
    }

    /// Collapses the whole set into (at most) one record.
    pub fn compacted(mut self, policies: &AggregationPolicies) -> Self {
        let reduced = compact(&self.records, policies);
        self.records = if reduced.is_empty() {
            Vec::new()
        } else {
            vec![reduced]
        };
        self
    }

    pub fn grouped<S: AsRef<str>>(
        mut self,
        keys: &[S],
        policies: &AggregationPolicies,
    ) -> Result<Self, QueryError> {
        self.records = group(&self.records, keys, policies)?;
        Ok(self)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        RecordSet { records }
    }
}
