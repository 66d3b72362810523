//! FILENAME: model/src/constraint/boolean.rs

use std::cmp::Ordering;
use crate::constraint::{parse_is_valid, raw_to_text};
use crate::error::ParseError;
use crate::record::RawValue;

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanDataValue {
    raw: RawValue,
    parsed: Result<bool, ParseError>,
}

impl BooleanDataValue {
    pub fn new(raw: &RawValue) -> Self {
        BooleanDataValue {
            raw: raw.clone(),
            parsed: parse_boolean(raw),
        }
    }

    pub fn is_valid(&self) -> bool {
        parse_is_valid(&self.parsed)
    }

    pub fn format(&self) -> String {
        match &self.parsed {
            Ok(b) => b.to_string(),
            Err(_) => raw_to_text(&self.raw),
        }
    }

    pub fn serialize(&self) -> RawValue {
        match &self.parsed {
            Ok(b) => RawValue::Bool(*b),
            Err(_) => self.raw.clone(),
        }
    }

    pub fn compare_to(&self, other: &BooleanDataValue) -> Ordering {
        crate::constraint::compare_parsed(
            self.parsed.as_ref().ok(),
            other.parsed.as_ref().ok(),
            &self.format(),
            &other.format(),
        )
    }
}

/// Missing and empty values read as `false`.
fn parse_boolean(raw: &RawValue) -> Result<bool, ParseError> {
    match raw {
        RawValue::Null => Ok(false),
        RawValue::Bool(b) => Ok(*b),
        RawValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ParseError::NotBoolean(n.to_string())),
        },
        RawValue::String(s) => match s.trim().to_lowercase().as_str() {
            "" | "false" | "no" | "0" | "off" => Ok(false),
            "true" | "yes" | "1" | "on" => Ok(true),
            _ => Err(ParseError::NotBoolean(s.clone())),
        },
        other => Err(ParseError::NotBoolean(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepted_spellings() {
        assert_eq!(BooleanDataValue::new(&json!("Yes")).format(), "true");
        assert_eq!(BooleanDataValue::new(&json!(0)).format(), "false");
        assert_eq!(BooleanDataValue::new(&json!(null)).serialize(), json!(false));
    }

    #[test]
    fn test_unrecognised_is_invalid() {
        let value = BooleanDataValue::new(&json!("maybe"));
        assert!(!value.is_valid());
        assert_eq!(value.format(), "maybe");
        assert_eq!(value.serialize(), json!("maybe"));
    }

    #[test]
    fn test_false_before_true_before_invalid() {
        let f = BooleanDataValue::new(&json!(false));
        let t = BooleanDataValue::new(&json!(true));
        let bad = BooleanDataValue::new(&json!("maybe"));
        assert_eq!(f.compare_to(&t), Ordering::Less);
        assert_eq!(t.compare_to(&bad), Ordering::Less);
    }
}
