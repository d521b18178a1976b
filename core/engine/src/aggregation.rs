//! FILENAME: core/engine/src/aggregation.rs
//! PURPOSE: Reduction policies used when many records collapse into one.
//! CONTEXT: Every policy is a pure function over a slice of values. Numeric
//! policies coerce their inputs (numbers, numeric-looking strings) and skip
//! whatever does not coerce. With no usable input, every built-in policy
//! yields `Number(0.0)` so compaction never has to special-case a field.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::StatValue;

/// Signature of a caller-supplied reduction.
pub type AggregationFn = fn(&[StatValue]) -> StatValue;

/// Supported reduction policies for a field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum Aggregation {
    #[default]
    First,
    Last,
    Min,
    Max,
    Sum,
    Mean,
    Median,
    Mode,
    StdDev,
    Variance,
    Count,
    /// Caller-supplied reduction. Not serializable.
    #[serde(skip)]
    Custom(AggregationFn),
}

/// The value every built-in policy returns when it has nothing to reduce.
fn no_data() -> StatValue {
    StatValue::Number(0.0)
}

impl Aggregation {
    /// Short lowercase name, used in derived column labels.
    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::First => "first",
            Aggregation::Last => "last",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Mode => "mode",
            Aggregation::StdDev => "stdev",
            Aggregation::Variance => "variance",
            Aggregation::Count => "count",
            Aggregation::Custom(_) => "custom",
        }
    }

    /// Reduces `values` to a single value.
    pub fn apply(&self, values: &[StatValue]) -> StatValue {
        match self {
            Aggregation::First => values.first().cloned().unwrap_or_else(no_data),
            Aggregation::Last => values.last().cloned().unwrap_or_else(no_data),
            Aggregation::Count => StatValue::Number(values.len() as f64),
            Aggregation::Mode => take_mode(values),
            Aggregation::Custom(f) => f(values),
            numeric => {
                let numbers: Vec<f64> = values.iter().filter_map(StatValue::as_number).collect();
                if numbers.is_empty() {
                    return no_data();
                }
                StatValue::Number(numeric.reduce_numbers(&numbers))
            }
        }
    }

    /// Reduces a non-empty slice of numbers with a numeric policy.
    fn reduce_numbers(&self, numbers: &[f64]) -> f64 {
        match self {
            Aggregation::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Sum => numbers.iter().sum(),
            Aggregation::Mean => numbers.iter().sum::<f64>() / numbers.len() as f64,
            Aggregation::Median => median(numbers),
            Aggregation::Variance => sample_variance(numbers),
            Aggregation::StdDev => sample_variance(numbers).sqrt(),
            // Non-numeric policies are dispatched in `apply`
            _ => 0.0,
        }
    }
}

fn median(numbers: &[f64]) -> f64 {
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample variance (n - 1 denominator) using Welford's algorithm for
/// numerical stability. Fewer than two numbers have no spread.
fn sample_variance(numbers: &[f64]) -> f64 {
    if numbers.len() < 2 {
        return 0.0;
    }

    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &value) in numbers.iter().enumerate() {
        let delta = value - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (value - mean);
    }

    m2 / (numbers.len() - 1) as f64
}

/// Most frequent value, compared by label. Ties go to the value seen first.
fn take_mode(values: &[StatValue]) -> StatValue {
    let mut counts: FxHashMap<String, (usize, usize)> = FxHashMap::default();
    for (position, value) in values.iter().enumerate() {
        counts
            .entry(value.label())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    counts
        .values()
        .max_by(|(count_a, first_a), (count_b, first_b)| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|&(_, first)| values[first].clone())
        .unwrap_or_else(no_data)
}

// ============================================================================
// POLICY SET
// ============================================================================

/// Ordered mapping of field name -> reduction policy.
#[derive(Debug, Clone, Default)]
pub struct AggregationPolicies {
    policies: Vec<(String, Aggregation)>,
}

impl AggregationPolicies {
    pub fn new() -> Self {
        AggregationPolicies {
            policies: Vec::new(),
        }
    }

    /// Adds (or replaces) the policy for `field`.
    pub fn with(mut self, field: impl Into<String>, policy: Aggregation) -> Self {
        self.set(field, policy);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, policy: Aggregation) {
        let field = field.into();
        match self.policies.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = policy,
            None => self.policies.push((field, policy)),
        }
    }

    pub fn get(&self, field: &str) -> Option<Aggregation> {
        self.policies
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, policy)| *policy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Aggregation)> {
        self.policies.iter().map(|(name, policy)| (name.as_str(), *policy))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Aggregation)> for AggregationPolicies {
    fn from_iter<I: IntoIterator<Item = (K, Aggregation)>>(iter: I) -> Self {
        let mut policies = AggregationPolicies::new();
        for (field, policy) in iter {
            policies.set(field, policy);
        }
        policies
    }
}
