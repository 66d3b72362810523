//! FILENAME: model/src/constraint/unknown.rs
//! Fallback for attributes without a declared constraint. Values that look
//! numeric behave like numbers, everything else is an opaque string.

use std::cmp::Ordering;
use rust_decimal::Decimal;
use crate::constraint::{compare_parsed, raw_to_text};
use crate::number_format::parse_decimal;
use crate::record::RawValue;

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownDataValue {
    raw: RawValue,
    number: Option<Decimal>,
}

impl UnknownDataValue {
    pub fn new(raw: &RawValue) -> Self {
        UnknownDataValue {
            raw: raw.clone(),
            number: parse_decimal(raw).ok(),
        }
    }

    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn format(&self) -> String {
        match self.number {
            Some(n) if self.raw.is_number() => n.normalize().to_string(),
            _ => raw_to_text(&self.raw),
        }
    }

    pub fn serialize(&self) -> RawValue {
        self.raw.clone()
    }

    pub fn numeric(&self) -> Option<Decimal> {
        self.number
    }

    pub fn compare_to(&self, other: &UnknownDataValue) -> Ordering {
        compare_parsed(
            self.number.as_ref(),
            other.number.as_ref(),
            &self.format(),
            &other.format(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_looking_values_order_numerically() {
        let nine = UnknownDataValue::new(&json!("9"));
        let ten = UnknownDataValue::new(&json!(10));
        let word = UnknownDataValue::new(&json!("abc"));
        assert_eq!(nine.compare_to(&ten), Ordering::Less);
        assert_eq!(ten.compare_to(&word), Ordering::Less);
    }

    #[test]
    fn test_format_arrays() {
        assert_eq!(UnknownDataValue::new(&json!(["a", 1])).format(), "a, 1");
        assert_eq!(UnknownDataValue::new(&json!(2.50)).format(), "2.5");
    }
}
