//! FILENAME: model/src/constraint/number.rs

use std::cmp::Ordering;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::constraint::{compare_parsed, parse_is_valid, raw_to_text};
use crate::error::ParseError;
use crate::number_format::{format_decimal, parse_decimal};
use crate::record::RawValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberConfig {
    /// Fixed number of decimal places; `None` shows the value as stored.
    #[serde(default)]
    pub decimals: Option<u32>,

    /// Show thousands separators.
    #[serde(default)]
    pub separated: bool,

    /// Currency symbol placed before the number.
    #[serde(default)]
    pub currency: Option<String>,

    /// Prefix positive values with `+`.
    #[serde(default)]
    pub force_sign: bool,

    #[serde(default)]
    pub min: Option<Decimal>,

    #[serde(default)]
    pub max: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberDataValue {
    raw: RawValue,
    parsed: Result<Decimal, ParseError>,
    config: NumberConfig,
}

impl NumberDataValue {
    pub fn new(raw: &RawValue, config: &NumberConfig) -> Self {
        NumberDataValue {
            raw: raw.clone(),
            parsed: parse_decimal(raw),
            config: config.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match &self.parsed {
            Ok(n) => in_bounds(*n, self.config.min, self.config.max),
            other => parse_is_valid(other),
        }
    }

    pub fn format(&self) -> String {
        match &self.parsed {
            Ok(n) => format_number(*n, &self.config),
            Err(_) => raw_to_text(&self.raw),
        }
    }

    pub fn serialize(&self) -> RawValue {
        match &self.parsed {
            Ok(n) => RawValue::String(n.normalize().to_string()),
            Err(ParseError::Empty) => RawValue::Null,
            Err(_) => self.raw.clone(),
        }
    }

    pub fn numeric(&self) -> Option<Decimal> {
        self.parsed.as_ref().ok().copied()
    }

    pub fn compare_to(&self, other: &NumberDataValue) -> Ordering {
        compare_parsed(
            self.parsed.as_ref().ok(),
            other.parsed.as_ref().ok(),
            &self.format(),
            &other.format(),
        )
    }
}

pub(crate) fn in_bounds(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

/// Renders a decimal with the number constraint's display options.
pub fn format_number(value: Decimal, config: &NumberConfig) -> String {
    let mut text = format_decimal(value, config.decimals, config.separated);

    if let Some(symbol) = &config.currency {
        text = match text.strip_prefix('-') {
            Some(unsigned) => format!("-{}{}", symbol, unsigned),
            None => format!("{}{}", symbol, text),
        };
    }

    if config.force_sign && value.is_sign_positive() && !value.is_zero() {
        text.insert(0, '+');
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_numbers_format_identically() {
        let config = NumberConfig::default();
        let a = NumberDataValue::new(&json!(7), &config);
        let b = NumberDataValue::new(&json!("7"), &config);
        assert_eq!(a.format(), b.format());
        assert_eq!(a.compare_to(&b), Ordering::Equal);
    }

    #[test]
    fn test_display_options() {
        let config = NumberConfig {
            decimals: Some(2),
            separated: true,
            currency: Some("$".to_string()),
            force_sign: true,
            ..NumberConfig::default()
        };
        assert_eq!(NumberDataValue::new(&json!(1234.5), &config).format(), "+$1,234.50");
        assert_eq!(NumberDataValue::new(&json!(-3), &config).format(), "-$3.00");
    }

    #[test]
    fn test_bounds_and_invalid() {
        let config = NumberConfig {
            min: Some(Decimal::ZERO),
            max: Some(Decimal::from(10)),
            ..NumberConfig::default()
        };
        assert!(NumberDataValue::new(&json!(5), &config).is_valid());
        assert!(!NumberDataValue::new(&json!(11), &config).is_valid());

        let bad = NumberDataValue::new(&json!("ten"), &config);
        assert!(!bad.is_valid());
        assert_eq!(bad.format(), "ten");
    }

    #[test]
    fn test_unparsable_sorts_last() {
        let config = NumberConfig::default();
        let bad = NumberDataValue::new(&json!("ten"), &config);
        let big = NumberDataValue::new(&json!(1000), &config);
        let small = NumberDataValue::new(&json!(2), &config);
        assert_eq!(small.compare_to(&big), Ordering::Less);
        assert_eq!(bad.compare_to(&big), Ordering::Greater);
    }

    #[test]
    fn test_serialize_is_normalized() {
        let value = NumberDataValue::new(&json!("2.500"), &NumberConfig::default());
        assert_eq!(value.serialize(), json!("2.5"));
    }
}
