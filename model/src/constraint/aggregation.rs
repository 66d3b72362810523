//! FILENAME: model/src/constraint/aggregation.rs
//! PURPOSE: Statistical aggregation of raw attribute values.
//! CONTEXT: Callers collect the raw values of one attribute (nulls already
//! removed) and ask the attribute's constraint to aggregate them. Numeric
//! constraints work on `Decimal`; every other constraint only knows how to
//! count, so any requested operation degrades to count or unique.

use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use crate::constraint::{Constraint, ConstraintData, DataValue};
use crate::number_format::looks_numeric;
use crate::record::RawValue;

/// Supported aggregation functions for value attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataAggregationType {
    #[default]
    Sum,
    Avg,
    Min,
    Max,
    Median,
    Count,
    Unique,
}

/// Result of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggregatedValue {
    Null,
    Number(Decimal),
    Count(usize),
    /// Distinct raw values in order of first appearance.
    Unique(Vec<RawValue>),
}

impl AggregatedValue {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            AggregatedValue::Number(n) => Some(*n),
            AggregatedValue::Count(c) => Some(Decimal::from(*c)),
            _ => None,
        }
    }
}

impl Constraint {
    /// Aggregates raw values. With `only_numeric`, `Unique` returns the
    /// distinct count rather than the values themselves.
    pub fn aggregate(
        &self,
        aggregation: DataAggregationType,
        values: &[RawValue],
        only_numeric: bool,
    ) -> AggregatedValue {
        let context = ConstraintData::default();

        match aggregation {
            DataAggregationType::Count => AggregatedValue::Count(values.len()),
            DataAggregationType::Unique => {
                let unique = self.unique_values(values, &context);
                if only_numeric {
                    AggregatedValue::Count(unique.len())
                } else {
                    AggregatedValue::Unique(unique)
                }
            }
            _ if values.is_empty() => AggregatedValue::Null,
            _ if self.aggregates_numerically(values) => {
                let numbers: Vec<Decimal> = values
                    .iter()
                    .filter_map(|v| self.create_data_value(v, &context).numeric())
                    .collect();
                aggregate_numbers(aggregation, numbers)
            }
            _ => AggregatedValue::Count(values.len()),
        }
    }

    fn aggregates_numerically(&self, values: &[RawValue]) -> bool {
        match self {
            Constraint::Unknown => values.iter().all(looks_numeric),
            other => other.is_numeric(),
        }
    }

    /// Distinct values, compared by storage form.
    fn unique_values(&self, values: &[RawValue], context: &ConstraintData) -> Vec<RawValue> {
        let mut seen: Vec<RawValue> = Vec::new();
        let mut unique = Vec::new();
        for raw in values {
            let stored = self.create_data_value(raw, context).serialize();
            if !seen.contains(&stored) {
                seen.push(stored);
                unique.push(raw.clone());
            }
        }
        unique
    }

    /// Display form of an aggregation result through this constraint, so a
    /// sum of durations reads `2d 4h` and an average of percentages `12.5%`.
    pub fn format_aggregated(&self, value: &AggregatedValue, context: &ConstraintData) -> String {
        match value {
            AggregatedValue::Null => String::new(),
            AggregatedValue::Count(count) => count.to_string(),
            AggregatedValue::Unique(values) => values
                .iter()
                .map(|v| self.format_raw(v, context))
                .collect::<Vec<_>>()
                .join(", "),
            AggregatedValue::Number(n) => {
                let raw = RawValue::String(n.normalize().to_string());
                match self.create_data_value(&raw, context) {
                    value @ (DataValue::Number(_) | DataValue::Percentage(_) | DataValue::Duration(_)) => {
                        value.format()
                    }
                    _ => n.normalize().to_string(),
                }
            }
        }
    }
}

fn aggregate_numbers(aggregation: DataAggregationType, mut numbers: Vec<Decimal>) -> AggregatedValue {
    if numbers.is_empty() {
        return AggregatedValue::Null;
    }

    let result = match aggregation {
        DataAggregationType::Sum => checked_sum(&numbers),
        DataAggregationType::Avg => {
            checked_sum(&numbers).and_then(|sum| sum.checked_div(Decimal::from(numbers.len())))
        }
        DataAggregationType::Min => numbers.iter().min().copied(),
        DataAggregationType::Max => numbers.iter().max().copied(),
        DataAggregationType::Median => {
            numbers.sort();
            let mid = numbers.len() / 2;
            if numbers.len() % 2 == 1 {
                Some(numbers[mid])
            } else {
                numbers[mid - 1]
                    .checked_add(numbers[mid])
                    .and_then(|s| s.checked_div(Decimal::TWO))
            }
        }
        DataAggregationType::Count => return AggregatedValue::Count(numbers.len()),
        DataAggregationType::Unique => return AggregatedValue::Count(numbers.len()),
    };

    match result {
        Some(n) => AggregatedValue::Number(n.normalize()),
        None => {
            log::debug!("decimal overflow while computing {:?}", aggregation);
            AggregatedValue::Null
        }
    }
}

fn checked_sum(numbers: &[Decimal]) -> Option<Decimal> {
    numbers
        .iter()
        .try_fold(Decimal::ZERO, |acc, n| acc.checked_add(*n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{DurationConfig, NumberConfig, PercentageConfig, TextConfig};
    use serde_json::json;

    fn number() -> Constraint {
        Constraint::Number(NumberConfig::default())
    }

    #[test]
    fn test_sum_of_small_numbers() {
        let values = [json!(1), json!(2), json!(3)];
        assert_eq!(
            number().aggregate(DataAggregationType::Sum, &values, false),
            AggregatedValue::Number(Decimal::from(6))
        );
    }

    #[test]
    fn test_decimal_sum_has_no_drift() {
        let values = vec![json!(0.1); 10];
        assert_eq!(
            number().aggregate(DataAggregationType::Sum, &values, true),
            AggregatedValue::Number(Decimal::ONE)
        );
    }

    #[test]
    fn test_empty_inputs() {
        let c = number();
        assert_eq!(c.aggregate(DataAggregationType::Avg, &[], false), AggregatedValue::Null);
        assert_eq!(c.aggregate(DataAggregationType::Sum, &[], false), AggregatedValue::Null);
        assert_eq!(c.aggregate(DataAggregationType::Median, &[], false), AggregatedValue::Null);
        assert_eq!(c.aggregate(DataAggregationType::Count, &[], false), AggregatedValue::Count(0));
        assert_eq!(
            c.aggregate(DataAggregationType::Unique, &[], false),
            AggregatedValue::Unique(vec![])
        );
    }

    #[test]
    fn test_count_after_null_filtering() {
        let raw = [json!(null), json!(1), json!(2)];
        let values: Vec<RawValue> = raw.iter().filter(|v| !v.is_null()).cloned().collect();
        assert_eq!(
            number().aggregate(DataAggregationType::Count, &values, true),
            AggregatedValue::Count(2)
        );
    }

    #[test]
    fn test_avg_min_max_median() {
        let values = [json!(4), json!("1"), json!(3), json!(10), json!("oops")];
        let c = number();
        assert_eq!(
            c.aggregate(DataAggregationType::Avg, &values, false),
            AggregatedValue::Number(Decimal::new(45, 1))
        );
        assert_eq!(c.aggregate(DataAggregationType::Min, &values, false), AggregatedValue::Number(Decimal::ONE));
        assert_eq!(c.aggregate(DataAggregationType::Max, &values, false), AggregatedValue::Number(Decimal::TEN));
        assert_eq!(
            c.aggregate(DataAggregationType::Median, &values, false),
            AggregatedValue::Number(Decimal::new(35, 1))
        );
    }

    #[test]
    fn test_non_numeric_falls_back_to_count() {
        let text = Constraint::Text(TextConfig::default());
        let values = [json!("a"), json!("b"), json!("a")];
        assert_eq!(text.aggregate(DataAggregationType::Sum, &values, false), AggregatedValue::Count(3));
        assert_eq!(
            text.aggregate(DataAggregationType::Unique, &values, false),
            AggregatedValue::Unique(vec![json!("a"), json!("b")])
        );
        assert_eq!(text.aggregate(DataAggregationType::Unique, &values, true), AggregatedValue::Count(2));
    }

    #[test]
    fn test_unknown_defers_to_numbers_when_possible() {
        let numeric = [json!("2"), json!(5)];
        let mixed = [json!("2"), json!("x")];
        assert_eq!(
            Constraint::Unknown.aggregate(DataAggregationType::Max, &numeric, false),
            AggregatedValue::Number(Decimal::from(5))
        );
        assert_eq!(
            Constraint::Unknown.aggregate(DataAggregationType::Max, &mixed, false),
            AggregatedValue::Count(2)
        );
    }

    #[test]
    fn test_unique_merges_equal_numbers() {
        let values = [json!(7), json!("7"), json!("7.0")];
        assert_eq!(number().aggregate(DataAggregationType::Unique, &values, true), AggregatedValue::Count(1));
    }

    #[test]
    fn test_format_aggregated_through_constraint() {
        let context = ConstraintData::default();
        let duration = Constraint::Duration(DurationConfig::default());
        let sum = duration.aggregate(
            DataAggregationType::Sum,
            &[json!("1d"), json!("3h"), json!("1h")],
            true,
        );
        assert_eq!(duration.format_aggregated(&sum, &context), "1d 4h");

        let percent = Constraint::Percentage(PercentageConfig::default());
        let avg = percent.aggregate(DataAggregationType::Avg, &[json!("10%"), json!("15%")], true);
        assert_eq!(percent.format_aggregated(&avg, &context), "12.5%");
    }
}
