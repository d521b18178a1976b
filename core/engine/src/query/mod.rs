//! FILENAME: core/engine/src/query/mod.rs
//! Record Query Engine - filtering, compaction and grouping of stats records.
//!
//! All operations take records by reference and return new collections of
//! cloned records, so intermediate results can be reused freely.
//!
//! Grouping is filtering and compaction chained together:
//! 1. Collect the distinct values of every grouping key
//! 2. Walk the cartesian product of those value sets
//! 3. Filter the records matching each combination
//! 4. Compact every filtered subset into a single record

mod predicate;
mod record_set;

pub use predicate::{Criterion, Predicate};
pub use record_set::RecordSet;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::aggregation::AggregationPolicies;
use crate::error::QueryError;
use crate::record::Record;
use crate::value::StatValue;

/// Returns clones of the records matching `predicate`, in input order.
pub fn filter(records: &[Record], predicate: &Predicate) -> Result<Vec<Record>, QueryError> {
    predicate.validate()?;

    let kept: Vec<Record> = records
        .iter()
        .filter(|record| predicate.matches(record))
        .cloned()
        .collect();

    log::debug!(
        target: "QUERY",
        "filter criteria={} kept={}/{}",
        predicate.len(),
        kept.len(),
        records.len()
    );
    Ok(kept)
}

/// Reduces `records` to a single record by applying `policies` per field.
///
/// - no records: an empty record
/// - one record: that record, unchanged
/// - otherwise: one field per policy that had at least one contributing
///   value; fields without a policy are dropped
pub fn compact(records: &[Record], policies: &AggregationPolicies) -> Record {
    match records {
        [] => Record::new(),
        [single] => single.clone(),
        _ => {
            let mut reduced = Record::new();
            for (field, policy) in policies.iter() {
                let values: Vec<StatValue> = records
                    .iter()
                    .filter_map(|record| record.get(field).cloned())
                    .collect();
                if values.is_empty() {
                    continue;
                }
                reduced.insert(field, policy.apply(&values));
            }
            reduced
        }
    }
}

/// Groups `records` by every combination of the distinct labels of `keys`
/// and compacts each group with `policies`.
///
/// Key values are compared by label, so `Number(1.0)` and `Text("1")` land
/// in the same group and an `Empty` key forms its own group. Records
/// lacking a key field belong to no group. Emits exactly one record per
/// combination, in cartesian-product order, including combinations that
/// match nothing (those compact to an empty record).
pub fn group<S: AsRef<str>>(
    records: &[Record],
    keys: &[S],
    policies: &AggregationPolicies,
) -> Result<Vec<Record>, QueryError> {
    let labels_per_key: Vec<Vec<String>> = keys
        .iter()
        .map(|key| distinct_labels(records, key.as_ref()))
        .collect();

    let total: usize = labels_per_key.iter().map(Vec::len).product();
    let mut result = Vec::with_capacity(total);

    if total > 0 {
        // Odometer over the per-key label indices; the last key varies fastest.
        let mut combo: SmallVec<[usize; 4]> = SmallVec::from_elem(0, keys.len());
        loop {
            let matching: Vec<Record> = records
                .iter()
                .filter(|record| {
                    keys.iter().zip(&combo).enumerate().all(|(k, (key, &idx))| {
                        record
                            .get(key.as_ref())
                            .is_some_and(|value| value.label() == labels_per_key[k][idx])
                    })
                })
                .cloned()
                .collect();
            result.push(compact(&matching, policies));

            if !advance(&mut combo, &labels_per_key) {
                break;
            }
        }
    }

    log::debug!(
        target: "QUERY",
        "group keys={} combinations={} input={}",
        keys.len(),
        result.len(),
        records.len()
    );
    Ok(result)
}

/// Moves the odometer one step. Returns false once every combination was visited.
fn advance(combo: &mut [usize], labels_per_key: &[Vec<String>]) -> bool {
    for position in (0..combo.len()).rev() {
        combo[position] += 1;
        if combo[position] < labels_per_key[position].len() {
            return true;
        }
        combo[position] = 0;
    }
    false
}

/// One value per distinct label of `field`, ordered by label. The first
/// value seen stands for its label; `Empty` is kept (label `""`).
pub fn distinct_values(records: &[Record], field: &str) -> Vec<StatValue> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut values: Vec<(String, StatValue)> = Vec::new();

    for value in records.iter().filter_map(|record| record.get(field)) {
        let label = value.label();
        if seen.insert(label.clone()) {
            values.push((label, value.clone()));
        }
    }

    values.sort_by(|(a, _), (b, _)| a.cmp(b));
    values.into_iter().map(|(_, value)| value).collect()
}

/// Sorted distinct labels of `field` across the records that have it.
pub fn distinct_labels(records: &[Record], field: &str) -> Vec<String> {
    let labels: FxHashSet<String> = records
        .iter()
        .filter_map(|record| record.get(field))
        .map(StatValue::label)
        .collect();

    let mut labels: Vec<String> = labels.into_iter().collect();
    labels.sort();
    labels
}
