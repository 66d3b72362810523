//! FILENAME: pivot-engine/src/lib.rs
//! Record aggregation subsystem.
//!
//! This crate groups linked records into pivot maps and trees. It depends on
//! `model` for records, resources and the constraint type system.
//!
//! Layers:
//! - `definition`: Serializable requests and options (WHAT to aggregate)
//! - `graph`: Per-pass record graph (HOW records connect)
//! - `plan`: Traversal chain over the resource path (WHERE to walk)
//! - `format`: Group key formatting strategy
//! - `view`: Pivot and tree output (WHAT we hand back)
//! - `engine`: Aggregation engine (HOW we aggregate)

pub mod definition;
pub mod graph;
pub mod plan;
pub mod format;
pub mod view;
pub mod engine;

pub use definition::*;
pub use format::{DefaultValueFormatter, ValueFormatter};
pub use graph::{Neighbor, RecordGraph, RecordWithNeighbors};
pub use plan::{plan_traversal, Stage, TraversalPlan, ValueChain};
pub use view::*;
pub use engine::{aggregate_bucket, aggregate_pivot, aggregate_tree, DataAggregator};
