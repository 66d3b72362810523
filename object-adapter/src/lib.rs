//! FILENAME: object-adapter/src/lib.rs
//! Object adapter for aggregated record trees.
//!
//! Turns tree-mode aggregation output into flat objects keyed by logical
//! names. Depends on `pivot-engine` for the traversal and on `model` for
//! records.

pub mod definition;
pub mod conversion;

pub use definition::{NamedAttribute, NamedValueAttribute, ObjectRequest};
pub use conversion::{aggregate_objects, tree_to_objects, AggregatedObject};
