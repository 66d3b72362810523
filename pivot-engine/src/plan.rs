//! FILENAME: pivot-engine/src/plan.rs
//! PURPOSE: Plans the traversal order over the resource path.
//! CONTEXT: Grouping attributes may live at any path position and in any
//! order. The aggregator walks records position by position, so the planner
//! inserts pass-through (filler) stages for every position between two
//! consecutive attributes. Value attributes get their own short chains that
//! start where the last grouping stage ends.

use model::ResourceIndex;
use crate::definition::{GroupingAttribute, ValueAttribute};

/// One step of the traversal chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub resource_index: ResourceIndex,

    /// Index into the grouping attributes when this stage groups records;
    /// `None` for filler stages that only move between positions.
    pub level: Option<usize>,
}

impl Stage {
    fn filler(resource_index: ResourceIndex) -> Self {
        Stage { resource_index, level: None }
    }

    fn grouping(resource_index: ResourceIndex, level: usize) -> Self {
        Stage { resource_index, level: Some(level) }
    }

    pub fn is_filler(&self) -> bool {
        self.level.is_none()
    }
}

/// Positions visited after the last grouping stage to reach a value
/// attribute's resource. Empty when the value lives on the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChain {
    pub resource_index: ResourceIndex,
    pub hops: Vec<ResourceIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalPlan {
    pub stages: Vec<Stage>,
    pub value_chains: Vec<ValueChain>,
}

impl TraversalPlan {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Path position of the last grouping stage.
    pub fn last_index(&self) -> Option<ResourceIndex> {
        self.stages.last().map(|s| s.resource_index)
    }
}

/// Positions from `from` (exclusive) to `to` (inclusive), one step at a time.
fn steps(from: ResourceIndex, to: ResourceIndex) -> Vec<ResourceIndex> {
    if to > from {
        (from + 1..=to).collect()
    } else {
        (to..from).rev().collect()
    }
}

/// Builds the traversal plan. Traversal always starts at path position 0.
pub fn plan_traversal(
    grouping: &[GroupingAttribute],
    values: &[ValueAttribute],
    path_len: usize,
) -> TraversalPlan {
    if grouping.is_empty() {
        return TraversalPlan::default();
    }

    if let Some(attribute) = grouping.iter().find(|a| a.resource_index >= path_len) {
        log::warn!(
            "grouping attribute {} refers to position {} outside a path of length {}",
            attribute.attribute_id,
            attribute.resource_index,
            path_len
        );
        return TraversalPlan::default();
    }

    let mut stages = Vec::new();
    let mut current: Option<ResourceIndex> = None;

    for (level, attribute) in grouping.iter().enumerate() {
        let target = attribute.resource_index;
        match current {
            None => stages.extend((0..target).map(Stage::filler)),
            Some(from) => {
                let between = steps(from, target);
                let fillers = between.len().saturating_sub(1);
                stages.extend(between[..fillers].iter().copied().map(Stage::filler));
            }
        }
        stages.push(Stage::grouping(target, level));
        current = Some(target);
    }

    let last = current.unwrap_or_default();
    let mut value_chains: Vec<ValueChain> = Vec::new();

    for value in values {
        let index = value.resource_index;
        if index >= path_len {
            log::debug!(
                "value attribute {} refers to position {} outside the path",
                value.attribute_id,
                index
            );
            continue;
        }
        if value_chains.iter().any(|c| c.resource_index == index) {
            continue;
        }
        value_chains.push(ValueChain {
            resource_index: index,
            hops: steps(last, index),
        });
    }

    TraversalPlan { stages, value_chains }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::DataAggregationType;

    fn group(index: ResourceIndex) -> GroupingAttribute {
        GroupingAttribute::new(format!("a{}", index), index)
    }

    fn value(index: ResourceIndex) -> ValueAttribute {
        ValueAttribute::new(format!("v{}", index), index, DataAggregationType::Sum)
    }

    fn shape(plan: &TraversalPlan) -> Vec<(ResourceIndex, bool)> {
        plan.stages.iter().map(|s| (s.resource_index, s.is_filler())).collect()
    }

    #[test]
    fn test_fillers_lead_to_first_attribute() {
        let plan = plan_traversal(&[group(2)], &[], 3);
        assert_eq!(shape(&plan), vec![(0, true), (1, true), (2, false)]);
    }

    #[test]
    fn test_walks_back_between_attributes() {
        let plan = plan_traversal(&[group(2), group(0)], &[], 3);
        assert_eq!(
            shape(&plan),
            vec![(0, true), (1, true), (2, false), (1, true), (0, false)]
        );
        assert_eq!(plan.stages[4].level, Some(1));
    }

    #[test]
    fn test_same_position_needs_no_hop() {
        let plan = plan_traversal(&[group(0), group(0)], &[], 1);
        assert_eq!(shape(&plan), vec![(0, false), (0, false)]);
    }

    #[test]
    fn test_value_chains_start_at_last_grouping() {
        let plan = plan_traversal(&[group(2)], &[value(4), value(2), value(0), value(4)], 5);
        assert_eq!(
            plan.value_chains,
            vec![
                ValueChain { resource_index: 4, hops: vec![3, 4] },
                ValueChain { resource_index: 2, hops: vec![] },
                ValueChain { resource_index: 0, hops: vec![1, 0] },
            ]
        );
    }

    #[test]
    fn test_out_of_range_value_gets_no_chain() {
        let plan = plan_traversal(&[group(0)], &[value(7)], 3);
        assert!(plan.value_chains.is_empty());
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_no_grouping_means_empty_plan() {
        assert!(plan_traversal(&[], &[value(0)], 3).is_empty());
        assert!(plan_traversal(&[group(5)], &[], 3).is_empty());
    }
}
