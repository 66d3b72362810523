//! FILENAME: model/src/constraint/color.rs

use std::cmp::Ordering;
use crate::constraint::{compare_parsed, parse_is_valid, raw_to_text};
use crate::error::ParseError;
use crate::record::RawValue;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorDataValue {
    raw: RawValue,
    /// Normalized `#rrggbb`.
    parsed: Result<String, ParseError>,
}

impl ColorDataValue {
    pub fn new(raw: &RawValue) -> Self {
        ColorDataValue {
            raw: raw.clone(),
            parsed: parse_color(raw),
        }
    }

    pub fn is_valid(&self) -> bool {
        parse_is_valid(&self.parsed)
    }

    pub fn format(&self) -> String {
        match &self.parsed {
            Ok(hex) => hex.clone(),
            Err(ParseError::Empty) => String::new(),
            Err(_) => raw_to_text(&self.raw),
        }
    }

    pub fn serialize(&self) -> RawValue {
        match &self.parsed {
            Ok(hex) => RawValue::String(hex.clone()),
            Err(ParseError::Empty) => RawValue::Null,
            Err(_) => self.raw.clone(),
        }
    }

    pub fn compare_to(&self, other: &ColorDataValue) -> Ordering {
        compare_parsed(
            self.parsed.as_ref().ok(),
            other.parsed.as_ref().ok(),
            &self.format(),
            &other.format(),
        )
    }
}

fn parse_color(raw: &RawValue) -> Result<String, ParseError> {
    let text = raw_to_text(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let digits = trimmed
        .strip_prefix('#')
        .ok_or_else(|| ParseError::NotColor(text.clone()))?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::NotColor(text.clone()));
    }

    let digits = digits.to_ascii_lowercase();
    match digits.len() {
        6 => Ok(format!("#{}", digits)),
        3 => Ok(digits.chars().fold(String::from("#"), |mut acc, c| {
            acc.push(c);
            acc.push(c);
            acc
        })),
        _ => Err(ParseError::NotColor(text.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_short_hex_expands() {
        let value = ColorDataValue::new(&json!("#A0c"));
        assert_eq!(value.format(), "#aa00cc");
        assert_eq!(value.serialize(), json!("#aa00cc"));
    }

    #[test]
    fn test_invalid_colors() {
        assert!(!ColorDataValue::new(&json!("red")).is_valid());
        assert!(!ColorDataValue::new(&json!("#12345")).is_valid());
        assert!(ColorDataValue::new(&json!(null)).is_valid());
    }
}
