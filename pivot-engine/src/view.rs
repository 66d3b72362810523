//! FILENAME: pivot-engine/src/view.rs
//! Aggregation View - The output handed back to the UI layer.
//!
//! Two shapes are produced from the same traversal:
//! - Pivot mode: nested maps keyed by group keys, rows before columns,
//!   value buckets at the leaves.
//! - Tree mode: nested group nodes carrying the records they matched.
//!
//! Buckets hold record copies, so results stay valid after the snapshot
//! that produced them is dropped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use model::{DataRecord, ResourceType};

// ============================================================================
// VALUE BUCKETS
// ============================================================================

/// Records of one resource collected under a group, ready for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBucket {
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub records: Vec<DataRecord>,
}

impl ValueBucket {
    pub fn new(resource_id: impl Into<String>, resource_type: ResourceType) -> Self {
        ValueBucket {
            resource_id: resource_id.into(),
            resource_type,
            records: Vec::new(),
        }
    }

    pub fn is_for(&self, resource_id: &str, resource_type: ResourceType) -> bool {
        self.resource_id == resource_id && self.resource_type == resource_type
    }

    pub fn record_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Merges buckets of equal resource, keeping each record once.
pub fn merge_buckets(target: &mut Vec<ValueBucket>, source: Vec<ValueBucket>) {
    for bucket in source {
        match target
            .iter_mut()
            .find(|b| b.is_for(&bucket.resource_id, bucket.resource_type))
        {
            Some(existing) => {
                for record in bucket.records {
                    if !existing.records.iter().any(|r| r.id == record.id) {
                        existing.records.push(record);
                    }
                }
            }
            None => target.push(bucket),
        }
    }
}

// ============================================================================
// PIVOT MODE
// ============================================================================

/// One level of the pivot map. Leaves appear once every row and column
/// level has been consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PivotNode {
    Leaf(Vec<ValueBucket>),
    Branch(IndexMap<String, PivotNode>),
}

impl PivotNode {
    pub fn empty_branch() -> Self {
        PivotNode::Branch(IndexMap::new())
    }

    pub fn children(&self) -> Option<&IndexMap<String, PivotNode>> {
        match self {
            PivotNode::Branch(children) => Some(children),
            PivotNode::Leaf(_) => None,
        }
    }

    pub fn buckets(&self) -> Option<&[ValueBucket]> {
        match self {
            PivotNode::Leaf(buckets) => Some(buckets),
            PivotNode::Branch(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PivotNode> {
        self.children().and_then(|c| c.get(key))
    }

    /// Follows a key path, e.g. `["Sport", "2024"]`.
    pub fn get_path(&self, keys: &[&str]) -> Option<&PivotNode> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Folds `other` into this node. Branches merge key by key, leaves merge
    /// their buckets.
    pub fn merge(&mut self, other: PivotNode) {
        match (self, other) {
            (PivotNode::Branch(mine), PivotNode::Branch(theirs)) => {
                for (key, node) in theirs {
                    match mine.get_mut(&key) {
                        Some(existing) => existing.merge(node),
                        None => {
                            mine.insert(key, node);
                        }
                    }
                }
            }
            (PivotNode::Leaf(mine), PivotNode::Leaf(theirs)) => merge_buckets(mine, theirs),
            (_, other) => {
                log::debug!("pivot node shape mismatch while merging: {:?}", other);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    /// Row keys, then column keys, then value buckets.
    pub map: IndexMap<String, PivotNode>,

    /// Union of every column key path seen under any row, with empty leaves.
    pub columns_map: IndexMap<String, PivotNode>,

    pub row_levels: usize,
    pub column_levels: usize,
}

impl PivotResult {
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get_path(&self, keys: &[&str]) -> Option<&PivotNode> {
        let (first, rest) = keys.split_first()?;
        self.map.get(*first)?.get_path(rest)
    }
}

// ============================================================================
// TREE MODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Group key at this level.
    pub value: String,

    /// Records of this level's resource that fell into the group.
    pub matched_records: Vec<DataRecord>,

    /// Record ids committed by the first traversal that reached this group,
    /// one per path position in path order. Positions visited again on the
    /// way back hold the same record and appear once.
    pub record_id_chain: Vec<String>,

    #[serde(default)]
    pub children: Vec<TreeNode>,

    /// Filled on the last level only.
    #[serde(default)]
    pub value_buckets: Vec<ValueBucket>,
}

impl TreeNode {
    pub fn child(&self, value: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.value == value)
    }

    pub fn matched_ids(&self) -> Vec<&str> {
        self.matched_records.iter().map(|r| r.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeResult {
    pub items: Vec<TreeNode>,
    pub levels: usize,
}

impl TreeResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, value: &str) -> Option<&TreeNode> {
        self.items.iter().find(|c| c.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket(ids: &[&str]) -> ValueBucket {
        let mut bucket = ValueBucket::new("tasks", ResourceType::Collection);
        bucket.records = ids.iter().map(|id| DataRecord::new(*id, "tasks")).collect();
        bucket
    }

    #[test]
    fn test_merge_buckets_keeps_records_once() {
        let mut target = vec![bucket(&["T1", "T2"])];
        merge_buckets(&mut target, vec![bucket(&["T2", "T3"])]);
        assert_eq!(target.len(), 1);
        assert_eq!(target[0].record_ids(), vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_merge_pivot_branches() {
        let mut a = PivotNode::Branch(IndexMap::from([("x".to_string(), PivotNode::Leaf(vec![bucket(&["T1"])]))]));
        let b = PivotNode::Branch(IndexMap::from([
            ("x".to_string(), PivotNode::Leaf(vec![bucket(&["T2"])])),
            ("y".to_string(), PivotNode::Leaf(vec![])),
        ]));
        a.merge(b);

        assert_eq!(a.children().map(|c| c.len()), Some(2));
        let leaf = a.get("x").and_then(PivotNode::buckets).unwrap();
        assert_eq!(leaf[0].record_ids(), vec!["T1", "T2"]);
    }

    #[test]
    fn test_pivot_node_json_shape() {
        let node = PivotNode::Branch(IndexMap::from([("Sport".to_string(), PivotNode::Leaf(vec![]))]));
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({ "Sport": [] }));

        let back: PivotNode = serde_json::from_value(json!({ "Sport": [] })).unwrap();
        assert_eq!(back, node);
    }
}
