//! FILENAME: pivot-engine/src/definition.rs
//! Aggregation Definition - The serializable request.
//!
//! This module contains all the types needed to DESCRIBE an aggregation.
//! These structures are designed to be:
//! - Serializable (sent over the UI bridge as JSON)
//! - Immutable snapshots of user intent

use serde::{Deserialize, Serialize};
use model::{Constraint, DataAggregationType, ResourceIndex};

// ============================================================================
// ATTRIBUTE ROLES
// ============================================================================

/// An attribute chosen to partition records (row, column or tree level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingAttribute {
    pub attribute_id: String,

    /// Position of the attribute's resource in the query's resource path.
    pub resource_index: ResourceIndex,

    /// Display override (e.g. a date attribute grouped by month). Only used
    /// when compatible with the attribute's own constraint.
    #[serde(default)]
    pub constraint: Option<Constraint>,

    /// Treat equal values as distinct siblings (one group per record).
    #[serde(default)]
    pub unique: bool,
}

impl GroupingAttribute {
    pub fn new(attribute_id: impl Into<String>, resource_index: ResourceIndex) -> Self {
        GroupingAttribute {
            attribute_id: attribute_id.into(),
            resource_index,
            constraint: None,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

/// An attribute whose values are collected into buckets for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAttribute {
    pub attribute_id: String,
    pub resource_index: ResourceIndex,
    #[serde(default)]
    pub aggregation: DataAggregationType,
}

impl ValueAttribute {
    pub fn new(
        attribute_id: impl Into<String>,
        resource_index: ResourceIndex,
        aggregation: DataAggregationType,
    ) -> Self {
        ValueAttribute {
            attribute_id: attribute_id.into(),
            resource_index,
            aggregation,
        }
    }
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Pivot mode: rows nested before columns, buckets at the leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotRequest {
    #[serde(default)]
    pub rows: Vec<GroupingAttribute>,
    #[serde(default)]
    pub columns: Vec<GroupingAttribute>,
    #[serde(default)]
    pub values: Vec<ValueAttribute>,
}

/// Tree mode: nested group nodes, one level per attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeRequest {
    #[serde(default)]
    pub levels: Vec<GroupingAttribute>,
    #[serde(default)]
    pub values: Vec<ValueAttribute>,
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Sort order for group keys within one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
    /// Order of first appearance in the source records.
    #[default]
    DataSourceOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationOptions {
    #[serde(default)]
    pub sort_order: SortOrder,
}
