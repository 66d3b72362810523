//! FILENAME: model/src/constraint/mod.rs
//! PURPOSE: Per-attribute value type system.
//! CONTEXT: Every attribute carries a `Constraint` describing how its raw
//! stored values are parsed, displayed, serialized back, ordered and
//! aggregated. The set of constraint types is closed: adding one means adding
//! a variant here and a variant to `DataValue`, and the compiler points at
//! every match that needs a new arm.
//!
//! Nothing in this module fails. A raw value that does not parse under its
//! constraint produces a `DataValue` whose `is_valid()` is false but which
//! still formats and compares.

pub mod aggregation;
pub mod boolean;
pub mod color;
pub mod datetime;
pub mod duration;
pub mod number;
pub mod percentage;
pub mod select;
pub mod text;
pub mod unknown;
pub mod user;

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use crate::error::ParseError;
use crate::record::RawValue;

pub use aggregation::{AggregatedValue, DataAggregationType};
pub use boolean::BooleanDataValue;
pub use color::ColorDataValue;
pub use datetime::{DateTimeConfig, DateTimeDataValue};
pub use duration::{DurationConfig, DurationDataValue, DurationType, DurationUnit};
pub use number::{NumberConfig, NumberDataValue};
pub use percentage::{PercentageConfig, PercentageDataValue};
pub use select::{SelectConfig, SelectDataValue, SelectOption};
pub use text::{CaseStyle, TextConfig, TextDataValue};
pub use unknown::UnknownDataValue;
pub use user::{User, UserConfig, UserDataValue};

// ============================================================================
// CONTEXT
// ============================================================================

/// Cross-cutting lookups some formatters need (e.g. the user directory).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintData {
    #[serde(default)]
    pub users: Vec<User>,
}

impl ConstraintData {
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }
}

// ============================================================================
// CONSTRAINT
// ============================================================================

/// Discriminant of a `Constraint`, used for compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    Unknown,
    Text,
    Number,
    Percentage,
    DateTime,
    Duration,
    Boolean,
    Select,
    User,
    Color,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config")]
pub enum Constraint {
    #[default]
    Unknown,
    Text(TextConfig),
    Number(NumberConfig),
    Percentage(PercentageConfig),
    DateTime(DateTimeConfig),
    Duration(DurationConfig),
    Boolean,
    Select(SelectConfig),
    User(UserConfig),
    Color,
}

impl Constraint {
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Constraint::Unknown => ConstraintType::Unknown,
            Constraint::Text(_) => ConstraintType::Text,
            Constraint::Number(_) => ConstraintType::Number,
            Constraint::Percentage(_) => ConstraintType::Percentage,
            Constraint::DateTime(_) => ConstraintType::DateTime,
            Constraint::Duration(_) => ConstraintType::Duration,
            Constraint::Boolean => ConstraintType::Boolean,
            Constraint::Select(_) => ConstraintType::Select,
            Constraint::User(_) => ConstraintType::User,
            Constraint::Color => ConstraintType::Color,
        }
    }

    /// Numeric constraints aggregate with decimal arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Constraint::Number(_) | Constraint::Percentage(_) | Constraint::Duration(_)
        )
    }

    /// Parses/wraps a raw stored value. Never fails.
    pub fn create_data_value(&self, raw: &RawValue, context: &ConstraintData) -> DataValue {
        match self {
            Constraint::Unknown => DataValue::Unknown(UnknownDataValue::new(raw)),
            Constraint::Text(config) => DataValue::Text(TextDataValue::new(raw, config)),
            Constraint::Number(config) => DataValue::Number(NumberDataValue::new(raw, config)),
            Constraint::Percentage(config) => {
                DataValue::Percentage(PercentageDataValue::new(raw, config))
            }
            Constraint::DateTime(config) => DataValue::DateTime(DateTimeDataValue::new(raw, config)),
            Constraint::Duration(config) => DataValue::Duration(DurationDataValue::new(raw, config)),
            Constraint::Boolean => DataValue::Boolean(BooleanDataValue::new(raw)),
            Constraint::Select(config) => DataValue::Select(SelectDataValue::new(raw, config)),
            Constraint::User(config) => DataValue::User(UserDataValue::new(raw, config, context)),
            Constraint::Color => DataValue::Color(ColorDataValue::new(raw)),
        }
    }

    /// Shorthand for `create_data_value(raw, context).format()`.
    pub fn format_raw(&self, raw: &RawValue, context: &ConstraintData) -> String {
        self.create_data_value(raw, context).format()
    }

    /// Whether `other` may replace this constraint for display purposes.
    pub fn accepts_override(&self, other: &Constraint) -> bool {
        self.constraint_type() == other.constraint_type()
            || (self.is_numeric() && other.is_numeric())
            || matches!(self, Constraint::Unknown)
    }

    /// Picks the override when it is compatible, otherwise this constraint.
    pub fn resolve<'a>(&'a self, override_constraint: Option<&'a Constraint>) -> &'a Constraint {
        match override_constraint {
            Some(other) if self.accepts_override(other) => other,
            Some(other) => {
                log::debug!(
                    "ignoring {:?} override for {:?} attribute",
                    other.constraint_type(),
                    self.constraint_type()
                );
                self
            }
            None => self,
        }
    }
}

// ============================================================================
// DATA VALUE
// ============================================================================

/// A raw value parsed under a constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Unknown(UnknownDataValue),
    Text(TextDataValue),
    Number(NumberDataValue),
    Percentage(PercentageDataValue),
    DateTime(DateTimeDataValue),
    Duration(DurationDataValue),
    Boolean(BooleanDataValue),
    Select(SelectDataValue),
    User(UserDataValue),
    Color(ColorDataValue),
}

impl DataValue {
    pub fn is_valid(&self) -> bool {
        match self {
            DataValue::Unknown(v) => v.is_valid(),
            DataValue::Text(v) => v.is_valid(),
            DataValue::Number(v) => v.is_valid(),
            DataValue::Percentage(v) => v.is_valid(),
            DataValue::DateTime(v) => v.is_valid(),
            DataValue::Duration(v) => v.is_valid(),
            DataValue::Boolean(v) => v.is_valid(),
            DataValue::Select(v) => v.is_valid(),
            DataValue::User(v) => v.is_valid(),
            DataValue::Color(v) => v.is_valid(),
        }
    }

    /// Display form.
    pub fn format(&self) -> String {
        match self {
            DataValue::Unknown(v) => v.format(),
            DataValue::Text(v) => v.format(),
            DataValue::Number(v) => v.format(),
            DataValue::Percentage(v) => v.format(),
            DataValue::DateTime(v) => v.format(),
            DataValue::Duration(v) => v.format(),
            DataValue::Boolean(v) => v.format(),
            DataValue::Select(v) => v.format(),
            DataValue::User(v) => v.format(),
            DataValue::Color(v) => v.format(),
        }
    }

    /// Storage form.
    pub fn serialize(&self) -> RawValue {
        match self {
            DataValue::Unknown(v) => v.serialize(),
            DataValue::Text(v) => v.serialize(),
            DataValue::Number(v) => v.serialize(),
            DataValue::Percentage(v) => v.serialize(),
            DataValue::DateTime(v) => v.serialize(),
            DataValue::Duration(v) => v.serialize(),
            DataValue::Boolean(v) => v.serialize(),
            DataValue::Select(v) => v.serialize(),
            DataValue::User(v) => v.serialize(),
            DataValue::Color(v) => v.serialize(),
        }
    }

    /// Decimal view of the value for numeric aggregation.
    pub fn numeric(&self) -> Option<Decimal> {
        match self {
            DataValue::Unknown(v) => v.numeric(),
            DataValue::Number(v) => v.numeric(),
            DataValue::Percentage(v) => v.numeric(),
            DataValue::Duration(v) => v.numeric(),
            _ => None,
        }
    }

    /// Total order. Unparsable values sort after parsable ones and ties are
    /// broken by comparing display strings.
    pub fn compare_to(&self, other: &DataValue) -> Ordering {
        match (self, other) {
            (DataValue::Unknown(a), DataValue::Unknown(b)) => a.compare_to(b),
            (DataValue::Text(a), DataValue::Text(b)) => a.compare_to(b),
            (DataValue::Number(a), DataValue::Number(b)) => a.compare_to(b),
            (DataValue::Percentage(a), DataValue::Percentage(b)) => a.compare_to(b),
            (DataValue::DateTime(a), DataValue::DateTime(b)) => a.compare_to(b),
            (DataValue::Duration(a), DataValue::Duration(b)) => a.compare_to(b),
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a.compare_to(b),
            (DataValue::Select(a), DataValue::Select(b)) => a.compare_to(b),
            (DataValue::User(a), DataValue::User(b)) => a.compare_to(b),
            (DataValue::Color(a), DataValue::Color(b)) => a.compare_to(b),
            (a, b) => a.format().cmp(&b.format()),
        }
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Generic text form of a raw value.
pub fn raw_to_text(raw: &RawValue) -> String {
    match raw {
        RawValue::Null => String::new(),
        RawValue::String(s) => s.clone(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Number(n) => n.to_string(),
        RawValue::Array(items) => items
            .iter()
            .map(raw_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        RawValue::Object(_) => raw.to_string(),
    }
}

/// Splits a raw value into its string elements (arrays fan out, empties drop).
pub(crate) fn raw_to_list(raw: &RawValue) -> Vec<String> {
    match raw {
        RawValue::Null => Vec::new(),
        RawValue::Array(items) => items
            .iter()
            .map(raw_to_text)
            .filter(|s| !s.is_empty())
            .collect(),
        other => {
            let text = raw_to_text(other);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    }
}

/// Storage form for list-valued constraints (select, user).
pub(crate) fn list_to_raw(values: &[String], multi: bool) -> RawValue {
    if multi {
        RawValue::Array(values.iter().cloned().map(RawValue::String).collect())
    } else {
        RawValue::String(values.first().cloned().unwrap_or_default())
    }
}

/// Empty values are valid; anything else that failed to parse is not.
pub(crate) fn parse_is_valid<T>(parsed: &Result<T, ParseError>) -> bool {
    matches!(parsed, Ok(_) | Err(ParseError::Empty))
}

/// Orders parsed values first, then falls back to the display strings.
pub(crate) fn compare_parsed<T: Ord>(
    a: Option<&T>,
    b: Option<&T>,
    a_text: &str,
    b_text: &str,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a_text.cmp(b_text)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_text.cmp(b_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn all_constraints() -> Vec<Constraint> {
        vec![
            Constraint::Unknown,
            Constraint::Text(TextConfig::default()),
            Constraint::Number(NumberConfig::default()),
            Constraint::Percentage(PercentageConfig::default()),
            Constraint::DateTime(DateTimeConfig::default()),
            Constraint::Duration(DurationConfig::default()),
            Constraint::Boolean,
            Constraint::Select(SelectConfig {
                multi: true,
                display_values: false,
                options: vec![SelectOption::new("a"), SelectOption::new("b")],
            }),
            Constraint::User(UserConfig { multi: false }),
            Constraint::Color,
        ]
    }

    #[test]
    fn test_serialize_round_trip_for_every_type() {
        let context = ConstraintData {
            users: vec![User::new("u1", "ann@example.com", "Ann")],
        };
        let samples = [
            json!("hello"),
            json!(42),
            json!("12.5"),
            json!("25%"),
            json!("2024-03-01T10:30:00Z"),
            json!("1d 2h"),
            json!(true),
            json!(["a", "b"]),
            json!("ann@example.com"),
            json!("#ABC"),
            json!(null),
        ];

        for constraint in all_constraints() {
            for raw in &samples {
                let value = constraint.create_data_value(raw, &context);
                if !value.is_valid() {
                    continue;
                }
                let stored = value.serialize();
                let again = constraint.create_data_value(&stored, &context).serialize();
                assert_eq!(again, stored, "{:?} with {}", constraint, raw);
            }
        }
    }

    #[test]
    fn test_invalid_values_never_panic() {
        let context = ConstraintData::default();
        let garbage = [
            json!({"x": 1}),
            json!("???"),
            json!([1, [2]]),
            json!(-0.0),
            json!("1e28"),
            json!("7.9e28"),
            json!("-7.9e28"),
            json!("79228162514264337593543950335"),
            json!("9999999999999999999999999999w"),
        ];
        for constraint in all_constraints() {
            for raw in &garbage {
                let value = constraint.create_data_value(raw, &context);
                let _ = value.format();
                let _ = value.serialize();
                let _ = value.numeric();
                let _ = value.compare_to(&value);
            }
        }
    }

    #[test]
    fn test_constraint_json_shape() {
        let parsed: Constraint = serde_json::from_value(json!({
            "type": "Number",
            "config": { "decimals": 2 }
        }))
        .unwrap();
        assert_eq!(
            parsed,
            Constraint::Number(NumberConfig {
                decimals: Some(2),
                ..NumberConfig::default()
            })
        );

        let unit: Constraint = serde_json::from_value(json!({ "type": "Boolean" })).unwrap();
        assert_eq!(unit, Constraint::Boolean);
    }

    #[test]
    fn test_override_compatibility() {
        let number = Constraint::Number(NumberConfig::default());
        let percent = Constraint::Percentage(PercentageConfig::default());
        let text = Constraint::Text(TextConfig::default());

        assert!(number.accepts_override(&percent));
        assert!(!number.accepts_override(&text));
        assert!(Constraint::Unknown.accepts_override(&text));
        assert_eq!(number.resolve(Some(&text)), &number);
        assert_eq!(number.resolve(Some(&percent)), &percent);
    }

    #[test]
    fn test_cross_type_compare_uses_display() {
        let context = ConstraintData::default();
        let a = Constraint::Text(TextConfig::default()).create_data_value(&json!("b"), &context);
        let b = Constraint::Unknown.create_data_value(&json!("a"), &context);
        assert_eq!(a.compare_to(&b), Ordering::Greater);
    }
}
