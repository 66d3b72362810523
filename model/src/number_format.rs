//! FILENAME: model/src/number_format.rs
//! PURPOSE: Decimal parsing and formatting utilities shared by the numeric constraints.
//! CONTEXT: Numbers are kept as `Decimal` end to end so sums over many records
//! do not drift the way f64 sums do.

use std::str::FromStr;
use rust_decimal::{Decimal, RoundingStrategy};
use crate::error::ParseError;
use crate::record::RawValue;

/// Parses a raw JSON value into a decimal.
pub fn parse_decimal(raw: &RawValue) -> Result<Decimal, ParseError> {
    match raw {
        RawValue::Null => Err(ParseError::Empty),
        RawValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Decimal::from(u))
            } else {
                parse_decimal_str(&n.to_string())
            }
        }
        RawValue::String(s) => parse_decimal_str(s),
        other => Err(ParseError::NotNumber(other.to_string())),
    }
}

/// Parses user-entered numeric text. Whitespace and `_` are ignored, a lone
/// `,` is accepted as decimal separator and scientific notation is allowed.
pub fn parse_decimal_str(text: &str) -> Result<Decimal, ParseError> {
    let mut cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();

    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    if !cleaned.contains('.') && cleaned.matches(',').count() == 1 {
        cleaned = cleaned.replace(',', ".");
    }

    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .map_err(|_| ParseError::NotNumber(text.to_string()))
}

/// Whether a raw value would parse as a number.
pub fn looks_numeric(raw: &RawValue) -> bool {
    parse_decimal(raw).is_ok()
}

/// Format a decimal with optional fixed decimal places and thousands separator.
pub fn format_decimal(value: Decimal, decimal_places: Option<u32>, use_thousands_separator: bool) -> String {
    let rounded = match decimal_places {
        Some(places) => {
            let r = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.prec$}", r, prec = places as usize)
        }
        None => value.normalize().to_string(),
    };

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal(&json!(7)), Ok(Decimal::from(7)));
        assert_eq!(parse_decimal(&json!("7")), Ok(Decimal::from(7)));
        assert_eq!(parse_decimal(&json!(" 1 000,5 ")), Ok(Decimal::new(10005, 1)));
        assert_eq!(parse_decimal(&json!("1e3")), Ok(Decimal::from(1000)));
        assert_eq!(parse_decimal(&json!(0.1)), Ok(Decimal::new(1, 1)));
        assert_eq!(parse_decimal(&json!(null)), Err(ParseError::Empty));
        assert!(matches!(parse_decimal(&json!("abc")), Err(ParseError::NotNumber(_))));
        assert!(matches!(parse_decimal(&json!(true)), Err(ParseError::NotNumber(_))));
    }

    #[test]
    fn test_format_decimal() {
        let v = Decimal::new(123456789, 3);
        assert_eq!(format_decimal(v, Some(2), false), "123456.79");
        assert_eq!(format_decimal(v, Some(2), true), "123,456.79");
        assert_eq!(format_decimal(Decimal::new(2500, 2), None, false), "25");
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(add_thousands_separator("1234567"), "1,234,567");
        assert_eq!(add_thousands_separator("-1234.5"), "-1,234.5");
        assert_eq!(add_thousands_separator("123"), "123");
    }
}
