//! FILENAME: core/engine/src/query/predicate.rs
//! PURPOSE: Per-field match criteria used to select a subset of records.
//! CONTEXT: A criterion is either an exact scalar or a regular expression.
//! Every entry must name a field and carry a real criterion: an empty field
//! name or an `Empty` exact value is rejected instead of matching everything.

use regex::Regex;

use crate::error::QueryError;
use crate::record::Record;
use crate::value::StatValue;

/// How a single field is matched.
#[derive(Debug, Clone)]
pub enum Criterion {
    /// The field must equal this value (numbers to numbers, text to text).
    Exact(StatValue),
    /// The field must be text containing a match for this expression.
    Pattern(Regex),
}

impl Criterion {
    /// Tests a field value. A missing field (`None`) never matches.
    pub fn matches(&self, value: Option<&StatValue>) -> bool {
        let Some(value) = value else {
            return false;
        };

        match self {
            Criterion::Exact(expected) => value.matches_exactly(expected),
            Criterion::Pattern(regex) => value.as_text().is_some_and(|text| regex.is_match(text)),
        }
    }
}

impl From<StatValue> for Criterion {
    fn from(value: StatValue) -> Self {
        Criterion::Exact(value)
    }
}

impl From<Regex> for Criterion {
    fn from(regex: Regex) -> Self {
        Criterion::Pattern(regex)
    }
}

/// A conjunction of per-field criteria.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    criteria: Vec<(String, Criterion)>,
}

impl Predicate {
    pub fn new() -> Self {
        Predicate {
            criteria: Vec::new(),
        }
    }

    /// Requires `field` to equal `value`.
    pub fn exact(mut self, field: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.criteria
            .push((field.into(), Criterion::Exact(value.into())));
        self
    }

    /// Requires `field` to be text containing a match for `regex`.
    pub fn pattern(mut self, field: impl Into<String>, regex: Regex) -> Self {
        self.criteria.push((field.into(), Criterion::Pattern(regex)));
        self
    }

    /// Compiles `pattern` and requires `field` to contain a match for it.
    pub fn regex(self, field: impl Into<String>, pattern: &str) -> Result<Self, QueryError> {
        let field = field.into();
        let regex = Regex::new(pattern).map_err(|source| QueryError::InvalidPattern {
            field: field.clone(),
            source,
        })?;
        Ok(self.pattern(field, regex))
    }

    pub fn with(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        self.criteria.push((field.into(), criterion));
        self
    }

    pub fn criteria(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.criteria.iter().map(|(field, c)| (field.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Checks that every entry names a field and carries a criterion.
    pub fn validate(&self) -> Result<(), QueryError> {
        for (field, criterion) in &self.criteria {
            if field.is_empty() {
                return Err(QueryError::InvalidPredicate(
                    "Undefined key in the filter".to_string(),
                ));
            }
            if let Criterion::Exact(StatValue::Empty) = criterion {
                return Err(QueryError::InvalidPredicate(format!(
                    "Undefined value in the filter for field '{}'",
                    field
                )));
            }
        }
        Ok(())
    }

    /// True when every criterion matches the record.
    /// Call `validate` first; an unvalidated `Empty` criterion simply never matches.
    pub fn matches(&self, record: &Record) -> bool {
        self.criteria
            .iter()
            .all(|(field, criterion)| criterion.matches(record.get(field)))
    }
}
