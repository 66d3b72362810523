//! FILENAME: model/src/constraint/percentage.rs
//! Percentages are stored as fractions: `0.25` is displayed as `25%`.

use std::cmp::Ordering;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::constraint::number::in_bounds;
use crate::constraint::{compare_parsed, parse_is_valid, raw_to_text};
use crate::error::ParseError;
use crate::number_format::{format_decimal, parse_decimal, parse_decimal_str};
use crate::record::RawValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentageConfig {
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Bounds on the fraction.
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentageDataValue {
    raw: RawValue,
    parsed: Result<Decimal, ParseError>,
    config: PercentageConfig,
}

impl PercentageDataValue {
    pub fn new(raw: &RawValue, config: &PercentageConfig) -> Self {
        PercentageDataValue {
            raw: raw.clone(),
            parsed: parse_percentage(raw),
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
            Ok(fraction) => format_percentage(*fraction, self.config.decimals)
                .unwrap_or_else(|| raw_to_text(&self.raw)),
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

    pub fn compare_to(&self, other: &PercentageDataValue) -> Ordering {
        compare_parsed(
            self.parsed.as_ref().ok(),
            other.parsed.as_ref().ok(),
            &self.format(),
            &other.format(),
        )
    }
}

fn parse_percentage(raw: &RawValue) -> Result<Decimal, ParseError> {
    if let RawValue::String(s) = raw {
        if let Some(number) = s.trim().strip_suffix('%') {
            return parse_decimal_str(number).map(|n| n / Decimal::ONE_HUNDRED);
        }
    }
    parse_decimal(raw)
}

/// `None` when the fraction is too large to scale to percent.
pub fn format_percentage(fraction: Decimal, decimals: Option<u32>) -> Option<String> {
    let percent = fraction.checked_mul(Decimal::ONE_HUNDRED)?;
    Some(format!("{}%", format_decimal(percent, decimals, false)))
}
