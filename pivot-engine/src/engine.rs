//! FILENAME: pivot-engine/src/engine.rs
//! Aggregation Engine - Groups linked records into pivot maps and trees.
//!
//! This module takes a Snapshot (records, links, schema) and a request
//! (grouping and value attributes) and produces either a PivotResult or a
//! TreeResult.
//!
//! Algorithm:
//! 1. Build the record graph for the snapshot's resource path
//! 2. Plan the traversal chain (grouping stages plus filler hops)
//! 3. Walk the chain recursively, partitioning records by formatted key
//! 4. At the last grouping stage, follow the value chains into buckets
//! 5. Shape the resulting group tree into the requested output
//!
//! Every cursor carries a trail of the record committed at each path
//! position. A hop into a position that is already on the trail may only
//! land on the committed record, so paths that walk back over resources
//! they already visited never fan out into unrelated records.

use std::cmp::Ordering;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use model::{AggregatedValue, Constraint, ConstraintData, RawValue, ResourceIndex, Snapshot};
use crate::definition::{
    AggregationOptions, GroupingAttribute, PivotRequest, SortOrder, TreeRequest, ValueAttribute,
};
use crate::format::{DefaultValueFormatter, ValueFormatter};
use crate::graph::{NodeIndex, RecordGraph, ResourceSlot};
use crate::plan::{plan_traversal, TraversalPlan};
use crate::view::{PivotNode, PivotResult, TreeNode, TreeResult, ValueBucket};

static DEFAULT_FORMATTER: DefaultValueFormatter = DefaultValueFormatter;

// ============================================================================
// TRAVERSAL STATE
// ============================================================================

/// Record committed at each path position, `None` where not visited yet.
type Trail = SmallVec<[Option<NodeIndex>; 8]>;

#[derive(Debug, Clone)]
struct Cursor {
    node: NodeIndex,
    trail: Trail,
}

impl Cursor {
    fn start(node: NodeIndex, path_len: usize) -> Self {
        let mut trail: Trail = smallvec![None; path_len];
        if let Some(first) = trail.first_mut() {
            *first = Some(node);
        }
        Cursor { node, trail }
    }

    fn moved(&self, node: NodeIndex, index: ResourceIndex) -> Self {
        let mut trail = self.trail.clone();
        trail[index] = Some(node);
        Cursor { node, trail }
    }
}

/// Records of one group before it is handed to the next stage.
#[derive(Debug)]
struct PendingGroup {
    key: String,
    raw: RawValue,
    matched: Vec<NodeIndex>,
    cursors: Vec<Cursor>,
}

impl PendingGroup {
    fn new(key: String, raw: RawValue) -> Self {
        PendingGroup {
            key,
            raw,
            matched: Vec::new(),
            cursors: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct SlotBucket {
    slot: ResourceSlot,
    nodes: Vec<NodeIndex>,
}

/// Mode-independent result of one traversal.
#[derive(Debug)]
struct GroupNode {
    key: String,
    raw: RawValue,
    level: usize,
    matched: Vec<NodeIndex>,
    chain: Vec<NodeIndex>,
    children: Vec<GroupNode>,
    buckets: Vec<SlotBucket>,
}

/// Everything one request needs while walking.
struct Traversal<'r> {
    plan: TraversalPlan,
    levels: &'r [GroupingAttribute],
    constraints: Vec<Constraint>,
    values_requested: bool,
}

/// Column key paths merged across all rows.
#[derive(Default)]
struct ColumnTree<'g> {
    entries: IndexMap<String, (&'g RawValue, ColumnTree<'g>)>,
}

// ============================================================================
// DATA AGGREGATOR
// ============================================================================

/// The main aggregation engine. Holds the record graph of one snapshot.
pub struct DataAggregator<'a> {
    snapshot: &'a Snapshot,
    graph: RecordGraph<'a>,
    formatter: &'a dyn ValueFormatter,
    options: AggregationOptions,
}

impl<'a> DataAggregator<'a> {
    /// Creates an aggregator over a snapshot using the default formatter.
    pub fn new(snapshot: &'a Snapshot) -> Self {
        check_path(snapshot);
        DataAggregator {
            snapshot,
            graph: RecordGraph::build(snapshot),
            formatter: &DEFAULT_FORMATTER,
            options: AggregationOptions::default(),
        }
    }

    pub fn with_formatter(mut self, formatter: &'a dyn ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_options(mut self, options: AggregationOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the snapshot and rebuilds the record graph.
    pub fn update_data(&mut self, snapshot: &'a Snapshot) {
        check_path(snapshot);
        self.snapshot = snapshot;
        self.graph = RecordGraph::build(snapshot);
    }

    pub fn graph(&self) -> &RecordGraph<'a> {
        &self.graph
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    // ========================================================================
    // PUBLIC MODES
    // ========================================================================

    /// Pivot mode: rows nested before columns, buckets at the leaves.
    pub fn aggregate_pivot(&self, request: &PivotRequest) -> PivotResult {
        let levels: Vec<GroupingAttribute> = request
            .rows
            .iter()
            .chain(&request.columns)
            .cloned()
            .collect();
        let row_levels = request.rows.len();
        let column_levels = request.columns.len();

        let (groups, constraints) = self.group_records(&levels, &request.values);
        let map = self.pivot_entries(&groups, levels.len());

        let mut columns = ColumnTree::default();
        collect_columns(&groups, row_levels, &mut columns);
        let columns_map = self.columns_entries(columns, row_levels, &constraints, levels.len());

        PivotResult {
            map,
            columns_map,
            row_levels,
            column_levels,
        }
    }

    /// Tree mode: one node per group, children for the next level.
    pub fn aggregate_tree(&self, request: &TreeRequest) -> TreeResult {
        let (groups, _) = self.group_records(&request.levels, &request.values);
        TreeResult {
            items: groups.into_iter().map(|g| self.tree_node(g)).collect(),
            levels: request.levels.len(),
        }
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    fn group_records(
        &self,
        levels: &[GroupingAttribute],
        values: &[ValueAttribute],
    ) -> (Vec<GroupNode>, Vec<Constraint>) {
        let path_len = self.snapshot.path.len();
        let plan = plan_traversal(levels, values, path_len);
        if plan.is_empty() {
            return (Vec::new(), Vec::new());
        }
        log::debug!(
            "planned {} stages and {} value chains over a path of length {}",
            plan.stages.len(),
            plan.value_chains.len(),
            path_len
        );

        let constraints: Vec<Constraint> = levels
            .iter()
            .map(|attribute| {
                let own = self
                    .snapshot
                    .constraint_at(attribute.resource_index, &attribute.attribute_id);
                own.resolve(attribute.constraint.as_ref()).clone()
            })
            .collect();

        let cursors: Vec<Cursor> = match self.graph.slot_at(0) {
            Some(start) => self
                .graph
                .members(start)
                .iter()
                .map(|node| Cursor::start(*node, path_len))
                .collect(),
            None => Vec::new(),
        };

        let traversal = Traversal {
            plan,
            levels,
            constraints,
            values_requested: !values.is_empty(),
        };
        let groups = self.walk(&traversal, 0, cursors);
        (groups, traversal.constraints)
    }

    fn walk(&self, t: &Traversal, position: usize, cursors: Vec<Cursor>) -> Vec<GroupNode> {
        if cursors.is_empty() {
            return Vec::new();
        }

        let stage = t.plan.stages[position];
        log::trace!(
            "stage {} at path position {}: {} cursors",
            position,
            stage.resource_index,
            cursors.len()
        );

        let next_index = t.plan.stages.get(position + 1).map(|s| s.resource_index);

        let Some(level) = stage.level else {
            // Filler stages are never last.
            return match next_index {
                Some(next) => {
                    let moved = self.advance(cursors, stage.resource_index, next);
                    self.walk(t, position + 1, moved)
                }
                None => Vec::new(),
            };
        };

        let groups = self.partition(t, level, cursors);

        groups
            .into_iter()
            .map(|group| {
                let chain: Vec<NodeIndex> = group
                    .cursors
                    .first()
                    .map(|c| c.trail.iter().flatten().copied().collect())
                    .unwrap_or_default();

                let (children, buckets) = match next_index {
                    Some(next) => {
                        let moved = self.advance(group.cursors, stage.resource_index, next);
                        (self.walk(t, position + 1, moved), Vec::new())
                    }
                    None => (
                        Vec::new(),
                        self.collect_buckets(t, stage.resource_index, &group.matched, &group.cursors),
                    ),
                };

                GroupNode {
                    key: group.key,
                    raw: group.raw,
                    level,
                    matched: group.matched,
                    chain,
                    children,
                    buckets,
                }
            })
            .collect()
    }

    /// Splits cursors by the formatted value of the stage's attribute.
    fn partition(&self, t: &Traversal, level: usize, cursors: Vec<Cursor>) -> Vec<PendingGroup> {
        let attribute = &t.levels[level];
        let constraint = &t.constraints[level];
        let context = &self.snapshot.context;
        let empty = RawValue::String(String::new());

        let mut groups: Vec<PendingGroup> = Vec::new();
        // Unique stages key by record as well, so equal values stay apart.
        let mut by_key: FxHashMap<(Option<NodeIndex>, String), usize> = FxHashMap::default();

        for cursor in cursors {
            let raw = self
                .graph
                .record(cursor.node)
                .value(&attribute.attribute_id)
                .unwrap_or(&empty);

            let elements: Vec<&RawValue> = match raw {
                RawValue::Array(items) if !items.is_empty() => items.iter().collect(),
                RawValue::Array(_) => vec![&empty],
                other => vec![other],
            };

            for element in elements {
                let key = self.formatter.format(element, constraint, context);
                let owner = attribute.unique.then_some(cursor.node);

                let index = match by_key.get(&(owner, key.clone())) {
                    Some(index) => *index,
                    None => {
                        groups.push(PendingGroup::new(key.clone(), element.clone()));
                        by_key.insert((owner, key), groups.len() - 1);
                        groups.len() - 1
                    }
                };

                let group = &mut groups[index];
                if !group.matched.contains(&cursor.node) {
                    group.matched.push(cursor.node);
                }
                group.cursors.push(cursor.clone());
            }
        }

        self.sort_groups(&mut groups, constraint, context);
        groups
    }

    fn sort_groups(&self, groups: &mut [PendingGroup], constraint: &Constraint, context: &ConstraintData) {
        let descending = match self.options.sort_order {
            SortOrder::DataSourceOrder => return,
            SortOrder::Ascending => false,
            SortOrder::Descending => true,
        };
        groups.sort_by(|a, b| directed(compare_raw(constraint, &a.raw, &b.raw, context), descending));
    }

    /// Moves every cursor one path position.
    fn advance(&self, cursors: Vec<Cursor>, from: ResourceIndex, to: ResourceIndex) -> Vec<Cursor> {
        if from == to {
            return cursors;
        }
        let Some(target) = self.graph.slot_at(to) else {
            return Vec::new();
        };

        let forward = to > from;
        let mut moved = Vec::with_capacity(cursors.len());
        for cursor in &cursors {
            let committed = cursor.trail.get(to).copied().flatten();
            for neighbor in self.graph.hop(cursor.node, forward, target) {
                if committed.map_or(true, |c| c == neighbor) {
                    moved.push(cursor.moved(neighbor, to));
                }
            }
        }
        moved
    }

    /// Follows every value chain from the last grouping stage. Buckets are
    /// keyed by resource, so two chains ending in the same resource share a
    /// bucket and every record lands in it once.
    fn collect_buckets(
        &self,
        t: &Traversal,
        index: ResourceIndex,
        matched: &[NodeIndex],
        cursors: &[Cursor],
    ) -> Vec<SlotBucket> {
        let mut buckets: Vec<SlotBucket> = Vec::new();

        if !t.values_requested {
            if let Some(slot) = self.graph.slot_at(index) {
                buckets.push(SlotBucket {
                    slot,
                    nodes: matched.to_vec(),
                });
            }
            return buckets;
        }

        for chain in &t.plan.value_chains {
            let Some(slot) = self.graph.slot_at(chain.resource_index) else {
                continue;
            };

            let mut reached = cursors.to_vec();
            let mut current = index;
            for hop in &chain.hops {
                reached = self.advance(reached, current, *hop);
                current = *hop;
            }
            if reached.is_empty() {
                continue;
            }

            let position = match buckets.iter().position(|b| b.slot == slot) {
                Some(position) => position,
                None => {
                    buckets.push(SlotBucket { slot, nodes: Vec::new() });
                    buckets.len() - 1
                }
            };
            let bucket = &mut buckets[position];
            for cursor in reached {
                if !bucket.nodes.contains(&cursor.node) {
                    bucket.nodes.push(cursor.node);
                }
            }
        }

        buckets
    }

    // ========================================================================
    // OUTPUT SHAPING
    // ========================================================================

    fn to_buckets(&self, buckets: &[SlotBucket]) -> Vec<ValueBucket> {
        buckets
            .iter()
            .map(|bucket| {
                let key = self.graph.resource_key(bucket.slot);
                let mut out = ValueBucket::new(key.id.clone(), key.resource_type);
                out.records = bucket
                    .nodes
                    .iter()
                    .map(|n| self.graph.record(*n).clone())
                    .collect();
                out
            })
            .collect()
    }

    fn pivot_entries(&self, groups: &[GroupNode], total_levels: usize) -> IndexMap<String, PivotNode> {
        let mut map: IndexMap<String, PivotNode> = IndexMap::new();
        for group in groups {
            let node = if group.level + 1 >= total_levels {
                PivotNode::Leaf(self.to_buckets(&group.buckets))
            } else {
                PivotNode::Branch(self.pivot_entries(&group.children, total_levels))
            };

            match map.get_mut(&group.key) {
                Some(existing) => existing.merge(node),
                None => {
                    map.insert(group.key.clone(), node);
                }
            }
        }
        map
    }

    fn columns_entries(
        &self,
        mut columns: ColumnTree,
        level: usize,
        constraints: &[Constraint],
        total_levels: usize,
    ) -> IndexMap<String, PivotNode> {
        let descending = match self.options.sort_order {
            SortOrder::DataSourceOrder => None,
            SortOrder::Ascending => Some(false),
            SortOrder::Descending => Some(true),
        };
        if let (Some(descending), Some(constraint)) = (descending, constraints.get(level)) {
            let context = &self.snapshot.context;
            columns.entries.sort_by(|_, a, _, b| {
                directed(compare_raw(constraint, a.0, b.0, context), descending)
            });
        }

        columns
            .entries
            .into_iter()
            .map(|(key, (_, children))| {
                let node = if level + 1 >= total_levels {
                    PivotNode::Leaf(Vec::new())
                } else {
                    PivotNode::Branch(self.columns_entries(children, level + 1, constraints, total_levels))
                };
                (key, node)
            })
            .collect()
    }

    fn tree_node(&self, group: GroupNode) -> TreeNode {
        TreeNode {
            value: group.key,
            matched_records: group
                .matched
                .iter()
                .map(|n| self.graph.record(*n).clone())
                .collect(),
            record_id_chain: group
                .chain
                .iter()
                .map(|n| self.graph.record(*n).id.clone())
                .collect(),
            value_buckets: self.to_buckets(&group.buckets),
            children: group
                .children
                .into_iter()
                .map(|child| self.tree_node(child))
                .collect(),
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn check_path(snapshot: &Snapshot) {
    if let Err(e) = snapshot.path.validate(&snapshot.resources) {
        log::warn!("resource path does not match the resource metadata: {}", e);
    }
}

fn compare_raw(constraint: &Constraint, a: &RawValue, b: &RawValue, context: &ConstraintData) -> Ordering {
    constraint
        .create_data_value(a, context)
        .compare_to(&constraint.create_data_value(b, context))
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Merges every column-level group found under any row into one tree.
fn collect_columns<'g>(groups: &'g [GroupNode], row_levels: usize, out: &mut ColumnTree<'g>) {
    for group in groups {
        if group.level < row_levels {
            collect_columns(&group.children, row_levels, out);
        } else {
            let entry = out
                .entries
                .entry(group.key.clone())
                .or_insert_with(|| (&group.raw, ColumnTree::default()));
            collect_columns(&group.children, row_levels, &mut entry.1);
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Runs a pivot-mode aggregation with the default formatter and options.
pub fn aggregate_pivot(snapshot: &Snapshot, request: &PivotRequest) -> PivotResult {
    DataAggregator::new(snapshot).aggregate_pivot(request)
}

/// Runs a tree-mode aggregation with the default formatter and options.
pub fn aggregate_tree(snapshot: &Snapshot, request: &TreeRequest) -> TreeResult {
    DataAggregator::new(snapshot).aggregate_tree(request)
}

/// Aggregates the non-null values of a value attribute from the bucket of
/// its resource.
pub fn aggregate_bucket(
    buckets: &[ValueBucket],
    value: &ValueAttribute,
    snapshot: &Snapshot,
) -> AggregatedValue {
    let Some(key) = snapshot.path.key_at(value.resource_index) else {
        return Constraint::Unknown.aggregate(value.aggregation, &[], false);
    };
    let constraint = snapshot.constraint_at(value.resource_index, &value.attribute_id);

    let values: Vec<RawValue> = buckets
        .iter()
        .filter(|b| b.is_for(&key.id, key.resource_type))
        .flat_map(|b| b.records.iter())
        .filter_map(|r| r.value(&value.attribute_id))
        .filter(|v| !v.is_null())
        .cloned()
        .collect();

    constraint.aggregate(value.aggregation, &values, false)
}
