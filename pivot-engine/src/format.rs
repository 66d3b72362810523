//! FILENAME: pivot-engine/src/format.rs
//! PURPOSE: Turns a raw attribute value into its group key.
//! CONTEXT: The aggregator never formats values itself. Hosts that need a
//! different display (localized dates, custom labels) plug in their own
//! `ValueFormatter`.

use model::{Constraint, ConstraintData, RawValue};

/// Formatting strategy used to derive group keys.
pub trait ValueFormatter {
    fn format(&self, value: &RawValue, constraint: &Constraint, context: &ConstraintData) -> String;
}

/// Formats through the constraint's own display rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueFormatter;

impl ValueFormatter for DefaultValueFormatter {
    fn format(&self, value: &RawValue, constraint: &Constraint, context: &ConstraintData) -> String {
        constraint.format_raw(value, context)
    }
}
