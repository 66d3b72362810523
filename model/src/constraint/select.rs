//! FILENAME: model/src/constraint/select.rs
//! Select (tag) constraint: values must be one of the declared options.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::constraint::{list_to_raw, raw_to_list};
use crate::record::RawValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            display_value: None,
            background: None,
        }
    }

    pub fn with_display(value: impl Into<String>, display_value: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            display_value: Some(display_value.into()),
            background: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectConfig {
    #[serde(default)]
    pub multi: bool,
    /// Show `display_value` instead of the stored value.
    #[serde(default)]
    pub display_values: bool,
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl SelectConfig {
    fn position(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|o| o.value == value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectDataValue {
    values: Vec<String>,
    config: SelectConfig,
}

impl SelectDataValue {
    pub fn new(raw: &RawValue, config: &SelectConfig) -> Self {
        SelectDataValue {
            values: raw_to_list(raw),
            config: config.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        (self.config.multi || self.values.len() <= 1)
            && self.values.iter().all(|v| self.config.position(v).is_some())
    }

    pub fn format(&self) -> String {
        self.values
            .iter()
            .map(|v| self.display(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn serialize(&self) -> RawValue {
        list_to_raw(&self.values, self.config.multi)
    }

    /// Ordered by option position; unknown values after all options.
    pub fn compare_to(&self, other: &SelectDataValue) -> Ordering {
        let a = self.values.first().and_then(|v| self.config.position(v));
        let b = other.values.first().and_then(|v| other.config.position(v));
        crate::constraint::compare_parsed(a.as_ref(), b.as_ref(), &self.format(), &other.format())
    }

    fn display(&self, value: &str) -> String {
        if !self.config.display_values {
            return value.to_string();
        }
        self.config
            .options
            .iter()
            .find(|o| o.value == value)
            .and_then(|o| o.display_value.clone())
            .unwrap_or_else(|| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(multi: bool) -> SelectConfig {
        SelectConfig {
            multi,
            display_values: true,
            options: vec![
                SelectOption::with_display("lo", "Low"),
                SelectOption::with_display("hi", "High"),
            ],
        }
    }

    #[test]
    fn test_display_values() {
        let value = SelectDataValue::new(&json!(["hi", "lo"]), &config(true));
        assert!(value.is_valid());
        assert_eq!(value.format(), "High, Low");
    }

    #[test]
    fn test_single_select_rejects_many() {
        assert!(!SelectDataValue::new(&json!(["hi", "lo"]), &config(false)).is_valid());
        assert!(!SelectDataValue::new(&json!("mid"), &config(false)).is_valid());
        assert_eq!(SelectDataValue::new(&json!("mid"), &config(false)).format(), "mid");
    }

    #[test]
    fn test_option_order() {
        let lo = SelectDataValue::new(&json!("lo"), &config(false));
        let hi = SelectDataValue::new(&json!("hi"), &config(false));
        let other = SelectDataValue::new(&json!("aaa"), &config(false));
        assert_eq!(lo.compare_to(&hi), Ordering::Less);
        assert_eq!(hi.compare_to(&other), Ordering::Less);
    }
}
