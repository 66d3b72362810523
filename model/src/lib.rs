//! FILENAME: model/src/lib.rs
//! PURPOSE: Main library entry point for the record data model.
//! CONTEXT: Re-exports the schema, record and constraint types shared by the
//! aggregation crates.

pub mod constraint;
pub mod error;
pub mod number_format;
pub mod record;
pub mod resource;
pub mod snapshot;

// Re-export commonly used types at the crate root
pub use constraint::{
    AggregatedValue, Constraint, ConstraintData, ConstraintType, DataAggregationType, DataValue, User,
};
pub use error::{ModelError, ParseError};
pub use number_format::{format_decimal, parse_decimal};
pub use record::{DataRecord, RawValue};
pub use resource::{
    AttributeDefinition, AttributesResource, ResourceIndex, ResourceKey, ResourcePath, ResourceType,
};
pub use snapshot::Snapshot;

pub use rust_decimal::Decimal;
