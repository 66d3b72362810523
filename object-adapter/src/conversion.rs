//! FILENAME: object-adapter/src/conversion.rs
//! Tree -> object conversion logic.
//!
//! Flattens tree-mode output into one object per leaf combination of
//! grouping levels. No traversal happens here: every record and bucket
//! already sits on the tree, this module only re-keys it by logical name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use model::{AggregatedValue, DataRecord, ResourcePath, Snapshot};
use pivot_engine::engine::{aggregate_bucket, DataAggregator};
use pivot_engine::view::{TreeNode, TreeResult, ValueBucket};
use crate::definition::ObjectRequest;

/// One leaf combination of the grouping levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedObject {
    /// Level name -> group key at that level.
    pub values: IndexMap<String, String>,

    /// Level name -> records that matched the group at that level.
    pub records: IndexMap<String, Vec<DataRecord>>,

    /// Value name -> buckets of that value attribute's resource.
    pub buckets: IndexMap<String, Vec<ValueBucket>>,

    /// Record ids along the traversal that reached the leaf.
    pub record_id_chain: Vec<String>,
}

impl AggregatedObject {
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Aggregates the named value attribute over this object's buckets.
    pub fn aggregate(&self, name: &str, request: &ObjectRequest, snapshot: &Snapshot) -> Option<AggregatedValue> {
        let value = request.value(name)?;
        let buckets = self.buckets.get(name).map(Vec::as_slice).unwrap_or(&[]);
        Some(aggregate_bucket(buckets, &value.attribute, snapshot))
    }
}

/// Flattens a tree result. A node without children ends a combination even
/// when it sits above the last level, so records that stop early are kept.
pub fn tree_to_objects(tree: &TreeResult, request: &ObjectRequest, path: &ResourcePath) -> Vec<AggregatedObject> {
    let mut objects = Vec::new();
    for item in &tree.items {
        flatten(item, 0, AggregatedObject::default(), request, path, &mut objects);
    }
    objects
}

fn flatten(
    node: &TreeNode,
    depth: usize,
    mut current: AggregatedObject,
    request: &ObjectRequest,
    path: &ResourcePath,
    out: &mut Vec<AggregatedObject>,
) {
    let Some(level) = request.levels.get(depth) else {
        log::debug!("tree deeper than the {} named levels; node {} ignored", request.levels.len(), node.value);
        return;
    };

    current.values.insert(level.name.clone(), node.value.clone());
    current.records.insert(level.name.clone(), node.matched_records.clone());

    if node.children.is_empty() {
        current.record_id_chain = node.record_id_chain.clone();
        for value in &request.values {
            let Some(key) = path.key_at(value.attribute.resource_index) else {
                continue;
            };
            let buckets: Vec<ValueBucket> = node
                .value_buckets
                .iter()
                .filter(|b| b.is_for(&key.id, key.resource_type))
                .cloned()
                .collect();
            current.buckets.insert(value.name.clone(), buckets);
        }
        out.push(current);
        return;
    }

    for child in &node.children {
        flatten(child, depth + 1, current.clone(), request, path, out);
    }
}

/// Runs tree-mode aggregation for the request and flattens the result.
pub fn aggregate_objects(snapshot: &Snapshot, request: &ObjectRequest) -> Vec<AggregatedObject> {
    let tree = DataAggregator::new(snapshot).aggregate_tree(&request.to_tree_request());
    tree_to_objects(&tree, request, &snapshot.path)
}
