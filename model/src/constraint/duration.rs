//! FILENAME: model/src/constraint/duration.rs
//! PURPOSE: Duration constraint.
//! CONTEXT: Durations are stored as whole milliseconds. Users type them as
//! unit strings (`1w 2d 3h 4m 5s`); how long a day or week is depends on the
//! duration type: work time (8h days, 5d weeks) or classic time.

use std::cmp::Ordering;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::constraint::{compare_parsed, parse_is_valid, raw_to_text};
use crate::error::ParseError;
use crate::number_format::parse_decimal;
use crate::record::RawValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DurationType {
    Work,
    #[default]
    Classic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    const DESCENDING: [DurationUnit; 5] = [
        DurationUnit::Weeks,
        DurationUnit::Days,
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
    ];

    fn letter(self) -> char {
        match self {
            DurationUnit::Weeks => 'w',
            DurationUnit::Days => 'd',
            DurationUnit::Hours => 'h',
            DurationUnit::Minutes => 'm',
            DurationUnit::Seconds => 's',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(DurationUnit::Weeks),
            'd' => Some(DurationUnit::Days),
            'h' => Some(DurationUnit::Hours),
            'm' => Some(DurationUnit::Minutes),
            's' => Some(DurationUnit::Seconds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationConfig {
    #[serde(default, rename = "type")]
    pub duration_type: DurationType,
    /// Largest unit used when displaying; defaults to weeks.
    #[serde(default)]
    pub max_unit: Option<DurationUnit>,
}

impl DurationConfig {
    /// Milliseconds in one unit under this configuration.
    pub fn unit_millis(&self, unit: DurationUnit) -> i64 {
        let (hours_per_day, days_per_week) = match self.duration_type {
            DurationType::Work => (8, 5),
            DurationType::Classic => (24, 7),
        };
        match unit {
            DurationUnit::Seconds => 1_000,
            DurationUnit::Minutes => 60_000,
            DurationUnit::Hours => 3_600_000,
            DurationUnit::Days => hours_per_day * 3_600_000,
            DurationUnit::Weeks => days_per_week * hours_per_day * 3_600_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationDataValue {
    raw: RawValue,
    parsed: Result<i64, ParseError>,
    config: DurationConfig,
}

impl DurationDataValue {
    pub fn new(raw: &RawValue, config: &DurationConfig) -> Self {
        DurationDataValue {
            raw: raw.clone(),
            parsed: parse_duration(raw, config),
            config: config.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        parse_is_valid(&self.parsed)
    }

    pub fn format(&self) -> String {
        match &self.parsed {
            Ok(millis) => format_duration(*millis, &self.config),
            Err(_) => raw_to_text(&self.raw),
        }
    }

    pub fn serialize(&self) -> RawValue {
        match &self.parsed {
            Ok(millis) => RawValue::from(*millis),
            Err(ParseError::Empty) => RawValue::Null,
            Err(_) => self.raw.clone(),
        }
    }

    pub fn numeric(&self) -> Option<Decimal> {
        self.parsed.as_ref().ok().map(|m| Decimal::from(*m))
    }

    pub fn compare_to(&self, other: &DurationDataValue) -> Ordering {
        compare_parsed(
            self.parsed.as_ref().ok(),
            other.parsed.as_ref().ok(),
            &self.format(),
            &other.format(),
        )
    }
}

fn parse_duration(raw: &RawValue, config: &DurationConfig) -> Result<i64, ParseError> {
    match parse_decimal(raw) {
        Ok(millis) => millis
            .round()
            .to_i64()
            .ok_or_else(|| ParseError::NotDuration(raw.to_string())),
        Err(ParseError::Empty) => Err(ParseError::Empty),
        Err(_) => match raw {
            RawValue::String(s) => parse_unit_string(s, config),
            other => Err(ParseError::NotDuration(other.to_string())),
        },
    }
}

/// Parses `1w 2d 3.5h`: every number must be followed by a unit letter.
fn parse_unit_string(text: &str, config: &DurationConfig) -> Result<i64, ParseError> {
    let invalid = || ParseError::NotDuration(text.to_string());
    let mut total = Decimal::ZERO;
    let mut number = String::new();
    let mut seen_unit = false;

    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
        } else if c.is_whitespace() {
            continue;
        } else {
            let unit = DurationUnit::from_letter(c).ok_or_else(invalid)?;
            if number.is_empty() {
                return Err(invalid());
            }
            let amount: Decimal = number.parse().map_err(|_| invalid())?;
            total = amount
                .checked_mul(Decimal::from(config.unit_millis(unit)))
                .and_then(|millis| total.checked_add(millis))
                .ok_or_else(invalid)?;
            number.clear();
            seen_unit = true;
        }
    }

    if !number.is_empty() || !seen_unit {
        return Err(invalid());
    }
    total.round().to_i64().ok_or_else(invalid)
}

/// Unit breakdown such as `1d 2h 30m`; sub-second remainders are dropped.
pub fn format_duration(millis: i64, config: &DurationConfig) -> String {
    let max_unit = config.max_unit.unwrap_or(DurationUnit::Weeks);
    let mut remaining = millis.unsigned_abs();
    let mut parts = Vec::new();

    for unit in DurationUnit::DESCENDING.iter().filter(|u| **u <= max_unit) {
        let size = config.unit_millis(*unit).unsigned_abs();
        let count = remaining / size;
        if count > 0 {
            parts.push(format!("{}{}", count, unit.letter()));
            remaining -= count * size;
        }
    }

    if parts.is_empty() {
        return "0".to_string();
    }

    let text = parts.join(" ");
    if millis < 0 {
        format!("-{}", text)
    } else {
        text
    }
}
