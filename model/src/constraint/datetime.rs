//! FILENAME: model/src/constraint/datetime.rs
//! PURPOSE: Date-time constraint.
//! CONTEXT: Values are stored as RFC 3339 UTC strings. Display uses a small
//! token language (`YYYY-MM-DD HH:mm`, `Q/YYYY`, `MMMM YYYY`, ...), which is
//! also how callers bucket dates by month or quarter: they override the
//! attribute's constraint with a coarser display format.

use std::cmp::Ordering;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use crate::constraint::{compare_parsed, parse_is_valid, raw_to_text};
use crate::error::ParseError;
use crate::record::RawValue;

fn default_format() -> String {
    "YYYY-MM-DD HH:mm".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub min: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max: Option<DateTime<Utc>>,
}

impl Default for DateTimeConfig {
    fn default() -> Self {
        DateTimeConfig {
            format: default_format(),
            min: None,
            max: None,
        }
    }
}

impl DateTimeConfig {
    pub fn with_format(format: impl Into<String>) -> Self {
        DateTimeConfig {
            format: format.into(),
            ..DateTimeConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeDataValue {
    raw: RawValue,
    parsed: Result<DateTime<Utc>, ParseError>,
    config: DateTimeConfig,
}

impl DateTimeDataValue {
    pub fn new(raw: &RawValue, config: &DateTimeConfig) -> Self {
        DateTimeDataValue {
            raw: raw.clone(),
            parsed: parse_datetime(raw),
            config: config.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match &self.parsed {
            Ok(dt) => {
                self.config.min.map_or(true, |m| *dt >= m)
                    && self.config.max.map_or(true, |m| *dt <= m)
            }
            other => parse_is_valid(other),
        }
    }

    pub fn format(&self) -> String {
        match &self.parsed {
            Ok(dt) => format_datetime(dt, &self.config.format),
            Err(_) => raw_to_text(&self.raw),
        }
    }

    pub fn serialize(&self) -> RawValue {
        match &self.parsed {
            Ok(dt) => RawValue::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Err(ParseError::Empty) => RawValue::Null,
            Err(_) => self.raw.clone(),
        }
    }

    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        self.parsed.as_ref().ok().copied()
    }

    pub fn compare_to(&self, other: &DateTimeDataValue) -> Ordering {
        compare_parsed(
            self.parsed.as_ref().ok(),
            other.parsed.as_ref().ok(),
            &self.format(),
            &other.format(),
        )
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Accepts RFC 3339, naive ISO date/date-times (read as UTC) and epoch milliseconds.
fn parse_datetime(raw: &RawValue) -> Result<DateTime<Utc>, ParseError> {
    match raw {
        RawValue::Null => Err(ParseError::Empty),
        RawValue::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
                .ok_or_else(|| ParseError::NotDate(n.to_string()))?;
            from_millis(millis).ok_or_else(|| ParseError::NotDate(n.to_string()))
        }
        RawValue::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return Err(ParseError::Empty);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.with_timezone(&Utc));
            }
            for pattern in NAIVE_FORMATS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
            }
            if let Ok(millis) = text.parse::<i64>() {
                if let Some(dt) = from_millis(millis) {
                    return Ok(dt);
                }
            }
            Err(ParseError::NotDate(s.clone()))
        }
        other => Err(ParseError::NotDate(other.to_string())),
    }
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Tokens, longest first so `MMMM` wins over `MM`.
const TOKENS: [&str; 16] = [
    "YYYY", "MMMM", "MMM", "YY", "MM", "DD", "HH", "hh", "mm", "ss", "M", "D", "H", "h", "A", "Q",
];

/// Renders a date-time with the display token language. Text inside `[...]`
/// is copied literally, unknown characters are copied as they are.
pub fn format_datetime(dt: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        match TOKENS.iter().find(|t| rest.starts_with(**t)) {
            Some(token) => {
                out.push_str(&render_token(dt, token));
                rest = &rest[token.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out
}

fn render_token(dt: &DateTime<Utc>, token: &str) -> String {
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    match token {
        "YYYY" => format!("{:04}", dt.year()),
        "YY" => format!("{:02}", dt.year().rem_euclid(100)),
        "MMMM" => dt.format("%B").to_string(),
        "MMM" => dt.format("%b").to_string(),
        "MM" => format!("{:02}", dt.month()),
        "M" => dt.month().to_string(),
        "DD" => format!("{:02}", dt.day()),
        "D" => dt.day().to_string(),
        "HH" => format!("{:02}", dt.hour()),
        "H" => dt.hour().to_string(),
        "hh" => format!("{:02}", hour12),
        "h" => hour12.to_string(),
        "mm" => format!("{:02}", dt.minute()),
        "ss" => format!("{:02}", dt.second()),
        "A" => if dt.hour() < 12 { "AM" } else { "PM" }.to_string(),
        "Q" => ((dt.month() - 1) / 3 + 1).to_string(),
        _ => token.to_string(),
    }
}
