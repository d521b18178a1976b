//! FILENAME: core/engine/src/number_format.rs
//! PURPOSE: Number formatting and parsing for stats values.
//! CONTEXT: Rendered tables show numbers with thousands separators and two
//! decimal places, while labels and CSV round-trips need a compact general
//! form. Parsing accepts the separated form back so rendered numbers stay
//! numeric when they re-enter the engine.

/// Decimal places used for numbers in rendered tables.
pub const TABLE_DECIMAL_PLACES: u8 = 2;

/// Format a number the way table cells show it: `1,234.57`.
pub fn format_number(value: f64) -> String {
    format_decimal(value, TABLE_DECIMAL_PLACES, true)
}

/// Format a number in general form (auto-detect best representation).
/// Integers print without a decimal point, everything else uses the
/// shortest representation that round-trips.
pub fn format_general(value: f64) -> String {
    if value.is_nan() || value.is_infinite() {
        return value.to_string();
    }

    if value == 0.0 {
        return "0".to_string();
    }

    // For integers, don't show decimal point
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{:.0}", value);
    }

    format!("{}", value)
}

/// Format a number with specified decimal places and optional thousands separator.
pub fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);

    if use_thousands_separator && value.is_finite() {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let mut parts = s.splitn(2, '.');
    let integer_part = parts.next().unwrap_or_default();
    let decimal_part = parts.next();

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::with_capacity(s.len() + digits.len() / 3);
    if negative {
        result.push('-');
    }

    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Parse a numeric-looking string, ignoring thousands separators and
/// surrounding whitespace. Returns `None` for anything that is not a number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let value = cleaned.parse::<f64>().ok()?;

    // "inf"/"nan" parse as f64 but are labels, not measurements
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
