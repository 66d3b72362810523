//! FILENAME: pivot-engine/src/graph.rs
//! PURPOSE: Builds the per-pass record graph used by the aggregator.
//! CONTEXT: Records arrive as flat lists per resource. This module turns
//! them into an arena of nodes with forward (`to`) and backward (`from`)
//! neighbor lists so traversal never has to scan link tables.
//!
//! DIRECTION:
//! Every link record sits between its two endpoint records. The endpoint
//! whose resource comes first in the query path points `to` the link, and
//! the link points `to` the other endpoint. For a link type connecting a
//! collection to itself, the first endpoint of the link record comes first
//! and traversal never turns such a link around.
//!
//! The graph borrows the snapshot and is rebuilt from scratch for every pass.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use model::{DataRecord, ResourceIndex, ResourceKey, ResourceType, Snapshot};

/// Index of a node in the graph arena.
pub type NodeIndex = usize;

/// Interned resource of the query path.
pub type ResourceSlot = usize;

type Neighbors = SmallVec<[NodeIndex; 4]>;

// ============================================================================
// NODES
// ============================================================================

#[derive(Debug, Clone)]
pub struct GraphNode<'a> {
    pub record: &'a DataRecord,
    pub resource: ResourceSlot,
    to: Neighbors,
    from: Neighbors,
}

impl<'a> GraphNode<'a> {
    fn new(record: &'a DataRecord, resource: ResourceSlot) -> Self {
        GraphNode {
            record,
            resource,
            to: SmallVec::new(),
            from: SmallVec::new(),
        }
    }

    pub fn to(&self) -> &[NodeIndex] {
        &self.to
    }

    pub fn from(&self) -> &[NodeIndex] {
        &self.from
    }
}

/// Minimal reference to a neighboring record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Neighbor<'a> {
    pub id: &'a str,
    pub owner_resource_id: &'a str,
}

/// A record together with its resolved neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWithNeighbors<'a> {
    pub record: &'a DataRecord,
    pub to: Vec<Neighbor<'a>>,
    pub from: Vec<Neighbor<'a>>,
}

// ============================================================================
// GRAPH
// ============================================================================

#[derive(Debug, Default)]
pub struct RecordGraph<'a> {
    nodes: Vec<GraphNode<'a>>,

    /// Distinct resources of the path, in order of first appearance.
    resources: Vec<ResourceKey>,

    /// First path position of each resource.
    first_position: Vec<usize>,

    /// Link types whose two endpoints are the same collection.
    self_linked: Vec<bool>,

    /// Path position -> resource.
    path_slots: Vec<ResourceSlot>,

    /// Resource -> its nodes in snapshot order.
    members: Vec<Vec<NodeIndex>>,

    /// Primary and link records live in separate id spaces.
    index: FxHashMap<(ResourceType, &'a str), NodeIndex>,
}

impl<'a> RecordGraph<'a> {
    /// Builds the graph for the snapshot's resource path. Only resources on
    /// the path take part; link records whose endpoints cannot be resolved
    /// are dropped.
    pub fn build(snapshot: &'a Snapshot) -> Self {
        let mut graph = RecordGraph::default();

        for (position, key) in snapshot.path.keys().enumerate() {
            let slot = match graph.slot_of(&key) {
                Some(slot) => slot,
                None => {
                    graph.resources.push(key);
                    graph.first_position.push(position);
                    graph.self_linked.push(false);
                    graph.members.push(Vec::new());
                    graph.resources.len() - 1
                }
            };
            graph.path_slots.push(slot);
        }

        // Endpoints must exist before links can reference them.
        for slot in 0..graph.resources.len() {
            let key = graph.resources[slot].clone();
            if key.resource_type == ResourceType::Collection {
                for record in snapshot.records_of(&key) {
                    graph.insert(slot, record);
                }
            }
        }

        for slot in 0..graph.resources.len() {
            if graph.resources[slot].resource_type == ResourceType::LinkType {
                graph.connect_links(snapshot, slot);
            }
        }

        log::debug!(
            "record graph built: {} nodes over {} resources",
            graph.nodes.len(),
            graph.resources.len()
        );
        graph
    }

    fn insert(&mut self, slot: ResourceSlot, record: &'a DataRecord) -> Option<NodeIndex> {
        let resource_type = self.resources[slot].resource_type;
        let key = (resource_type, record.id.as_str());
        if self.index.contains_key(&key) {
            log::debug!("duplicate record id {} skipped", record.id);
            return None;
        }

        let node = self.nodes.len();
        self.nodes.push(GraphNode::new(record, slot));
        self.members[slot].push(node);
        self.index.insert(key, node);
        Some(node)
    }

    fn connect_links(&mut self, snapshot: &'a Snapshot, slot: ResourceSlot) {
        let key = self.resources[slot].clone();
        let ends = match snapshot.resource(&key).and_then(|r| r.collection_ids.as_ref()) {
            Some(ends) => ends,
            None => {
                log::debug!("link type {} has no collection metadata; links skipped", key.id);
                return;
            }
        };

        self.self_linked[slot] = ends[0] == ends[1];

        for link in snapshot.records_of(&key) {
            let Some([first, second]) = link.linked_record_ids.as_ref() else {
                log::debug!("link {} has no endpoints; skipped", link.id);
                continue;
            };

            let endpoints = (
                self.find(ResourceType::Collection, first),
                self.find(ResourceType::Collection, second),
            );
            let (Some(a), Some(b)) = endpoints else {
                log::debug!("link {} points to a missing record; skipped", link.id);
                continue;
            };

            let first_owner = &self.resources[self.nodes[a].resource].id;
            let second_owner = &self.resources[self.nodes[b].resource].id;
            let declared = (*first_owner == ends[0] && *second_owner == ends[1])
                || (*first_owner == ends[1] && *second_owner == ends[0]);
            if !declared {
                log::debug!("link {} connects records outside of {}; skipped", link.id, key.id);
                continue;
            }

            let Some(node) = self.insert(slot, link) else {
                continue;
            };

            let (lower, upper) = if self.first_position[self.nodes[a].resource]
                <= self.first_position[self.nodes[b].resource]
            {
                (a, b)
            } else {
                (b, a)
            };

            push_unique(&mut self.nodes[lower].to, node);
            push_unique(&mut self.nodes[node].from, lower);
            push_unique(&mut self.nodes[node].to, upper);
            push_unique(&mut self.nodes[upper].from, node);
        }
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node: NodeIndex) -> &GraphNode<'a> {
        &self.nodes[node]
    }

    pub fn record(&self, node: NodeIndex) -> &'a DataRecord {
        self.nodes[node].record
    }

    pub fn slot_of(&self, key: &ResourceKey) -> Option<ResourceSlot> {
        self.resources.iter().position(|k| k == key)
    }

    /// Resource at a path position.
    pub fn slot_at(&self, index: ResourceIndex) -> Option<ResourceSlot> {
        self.path_slots.get(index).copied()
    }

    pub fn resource_key(&self, slot: ResourceSlot) -> &ResourceKey {
        &self.resources[slot]
    }

    /// Nodes of one resource in snapshot order.
    pub fn members(&self, slot: ResourceSlot) -> &[NodeIndex] {
        &self.members[slot]
    }

    pub fn find(&self, resource_type: ResourceType, id: &str) -> Option<NodeIndex> {
        self.index.get(&(resource_type, id)).copied()
    }

    pub fn neighbor(&self, node: NodeIndex) -> Neighbor<'a> {
        let record = self.nodes[node].record;
        Neighbor {
            id: &record.id,
            owner_resource_id: &record.resource_id,
        }
    }

    pub fn with_neighbors(&self, node: NodeIndex) -> RecordWithNeighbors<'a> {
        let n = &self.nodes[node];
        RecordWithNeighbors {
            record: n.record,
            to: n.to.iter().map(|i| self.neighbor(*i)).collect(),
            from: n.from.iter().map(|i| self.neighbor(*i)).collect(),
        }
    }

    /// Neighbors of `node` owned by `target`. Hops toward a later path
    /// position follow `to`, hops toward an earlier one follow `from`. The
    /// opposite list is consulted only when the preferred one holds no
    /// record of the target resource, which happens when a path visits a
    /// link type in the reverse of its first-seen orientation. Hops into or
    /// out of a self-linked type use the preferred list only.
    pub fn hop(&self, node: NodeIndex, forward: bool, target: ResourceSlot) -> Neighbors {
        let n = &self.nodes[node];
        let (preferred, other) = if forward {
            (&n.to, &n.from)
        } else {
            (&n.from, &n.to)
        };

        let hits: Neighbors = preferred
            .iter()
            .copied()
            .filter(|i| self.nodes[*i].resource == target)
            .collect();
        if !hits.is_empty() || self.self_linked[target] || self.self_linked[n.resource] {
            return hits;
        }

        other
            .iter()
            .copied()
            .filter(|i| self.nodes[*i].resource == target)
            .collect()
    }
}

fn push_unique(list: &mut Neighbors, node: NodeIndex) {
    if !list.contains(&node) {
        list.push(node);
    }
}
