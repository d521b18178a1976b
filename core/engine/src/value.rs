//! FILENAME: core/engine/src/value.rs
//! PURPOSE: Defines the scalar value stored in a stats record field.
//! CONTEXT: A record field holds a number, a string, or nothing. `Empty` is
//! an explicit sentinel, distinct from `Number(0.0)`, used both for absent
//! inputs and for pivot cells that received no record.

use serde::{Deserialize, Serialize};

use crate::number_format::{format_general, format_number, parse_number};

/// The scalar value of a single record field or pivot cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl StatValue {
    pub fn text(s: impl Into<String>) -> Self {
        StatValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StatValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value. Numbers pass through, numeric-looking
    /// strings ("1,024.5") are parsed, everything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) if n.is_finite() => Some(*n),
            StatValue::Number(_) => None,
            StatValue::Text(s) => parse_number(s),
            StatValue::Empty => None,
        }
    }

    /// Stringified form used for grouping keys and pivot labels.
    pub fn label(&self) -> String {
        match self {
            StatValue::Empty => String::new(),
            StatValue::Number(n) => format_general(*n),
            StatValue::Text(s) => s.clone(),
        }
    }

    /// Display form used in rendered tables: numbers get thousands
    /// separators and two decimals, empty renders as nothing.
    pub fn display_value(&self) -> String {
        match self {
            StatValue::Empty => String::new(),
            StatValue::Number(n) => format_number(*n),
            StatValue::Text(s) => s.clone(),
        }
    }

    /// Equality used by exact-match predicates. `Empty` never matches,
    /// and numbers never equal strings.
    pub fn matches_exactly(&self, criterion: &StatValue) -> bool {
        match (self, criterion) {
            (StatValue::Number(a), StatValue::Number(b)) => a == b,
            (StatValue::Text(a), StatValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Number(value)
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        StatValue::Number(value as f64)
    }
}

impl From<i32> for StatValue {
    fn from(value: i32) -> Self {
        StatValue::Number(f64::from(value))
    }
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Number(value as f64)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        StatValue::Text(value)
    }
}

impl<T: Into<StatValue>> From<Option<T>> for StatValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StatValue::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_number_coerces_numeric_text() {
        assert_eq!(StatValue::Number(3.5).as_number(), Some(3.5));
        assert_eq!(StatValue::text("1,000").as_number(), Some(1000.0));
        assert_eq!(StatValue::text("fast").as_number(), None);
        assert_eq!(StatValue::Empty.as_number(), None);
    }

    #[test]
    fn test_label_and_display() {
        assert_eq!(StatValue::Number(8.0).label(), "8");
        assert_eq!(StatValue::Number(8.0).display_value(), "8.00");
        assert_eq!(StatValue::Number(12345.678).display_value(), "12,345.68");
        assert_eq!(StatValue::Empty.display_value(), "");
        assert_eq!(StatValue::text("Redis").label(), "Redis");
    }

    #[test]
    fn test_exact_matching_is_variant_strict() {
        assert!(StatValue::Number(1.0).matches_exactly(&StatValue::Number(1.0)));
        assert!(!StatValue::text("1").matches_exactly(&StatValue::Number(1.0)));
        assert!(!StatValue::Empty.matches_exactly(&StatValue::Empty));
    }

    #[test]
    fn test_default_is_empty() {
        assert_eq!(StatValue::default(), StatValue::Empty);
        assert_eq!(StatValue::from(None::<f64>), StatValue::default());
    }

    #[test]
    fn test_serde_untagged() {
        let values: Vec<StatValue> = serde_json::from_str(r#"[null, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![StatValue::Empty, StatValue::Number(2.5), StatValue::text("x")]
        );
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[null,2.5,"x"]"#);
    }
}
