//! FILENAME: model/src/constraint/text.rs

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::constraint::raw_to_text;
use crate::record::RawValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseStyle {
    #[default]
    None,
    LowerCase,
    UpperCase,
    TitleCase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default)]
    pub case_style: CaseStyle,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDataValue {
    text: String,
    config: TextConfig,
}

impl TextDataValue {
    pub fn new(raw: &RawValue, config: &TextConfig) -> Self {
        TextDataValue {
            text: raw_to_text(raw),
            config: config.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        let len = self.text.chars().count();
        self.config.min_length.map_or(true, |min| len >= min)
            && self.config.max_length.map_or(true, |max| len <= max)
    }

    pub fn format(&self) -> String {
        match self.config.case_style {
            CaseStyle::None => self.text.clone(),
            CaseStyle::LowerCase => self.text.to_lowercase(),
            CaseStyle::UpperCase => self.text.to_uppercase(),
            CaseStyle::TitleCase => title_case(&self.text),
        }
    }

    pub fn serialize(&self) -> RawValue {
        RawValue::String(self.text.clone())
    }

    /// Case-insensitive on the display form, ties by raw text.
    pub fn compare_to(&self, other: &TextDataValue) -> Ordering {
        self.format()
            .to_lowercase()
            .cmp(&other.format().to_lowercase())
            .then_with(|| self.text.cmp(&other.text))
    }
}

fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
        at_word_start = c.is_whitespace();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_styles() {
        let raw = json!("hello wORLD");
        let title = TextConfig { case_style: CaseStyle::TitleCase, ..TextConfig::default() };
        let upper = TextConfig { case_style: CaseStyle::UpperCase, ..TextConfig::default() };
        assert_eq!(TextDataValue::new(&raw, &title).format(), "Hello World");
        assert_eq!(TextDataValue::new(&raw, &upper).format(), "HELLO WORLD");
    }

    #[test]
    fn test_length_bounds() {
        let config = TextConfig { min_length: Some(2), max_length: Some(4), ..TextConfig::default() };
        assert!(!TextDataValue::new(&json!("a"), &config).is_valid());
        assert!(TextDataValue::new(&json!("abc"), &config).is_valid());
        assert!(!TextDataValue::new(&json!("abcde"), &config).is_valid());
    }

    #[test]
    fn test_numbers_stringify() {
        let value = TextDataValue::new(&json!(7), &TextConfig::default());
        assert_eq!(value.format(), "7");
        assert_eq!(value.serialize(), json!("7"));
    }

    #[test]
    fn test_compare_ignores_case() {
        let config = TextConfig::default();
        let a = TextDataValue::new(&json!("apple"), &config);
        let b = TextDataValue::new(&json!("Banana"), &config);
        assert_eq!(a.compare_to(&b), Ordering::Less);
    }
}
