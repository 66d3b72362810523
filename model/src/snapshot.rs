//! FILENAME: model/src/snapshot.rs
//! PURPOSE: The input snapshot handed to one aggregation pass.
//! CONTEXT: The UI layer serializes its current records, link records and
//! schema into this structure. Everything built from it lives only for the
//! duration of one pass.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::constraint::{Constraint, ConstraintData};
use crate::error::ModelError;
use crate::record::DataRecord;
use crate::resource::{find_resource, AttributesResource, ResourceIndex, ResourceKey, ResourcePath};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Collection id -> records of that collection.
    #[serde(default)]
    pub records: HashMap<String, Vec<DataRecord>>,

    /// Link type id -> link records of that link type.
    #[serde(default)]
    pub link_records: HashMap<String, Vec<DataRecord>>,

    #[serde(default)]
    pub resources: Vec<AttributesResource>,

    #[serde(default)]
    pub path: ResourcePath,

    #[serde(default)]
    pub context: ConstraintData,
}

impl Snapshot {
    pub fn new(resources: Vec<AttributesResource>, path: ResourcePath) -> Self {
        Snapshot {
            resources,
            path,
            ..Snapshot::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn add_record(&mut self, record: DataRecord) {
        self.records
            .entry(record.resource_id.clone())
            .or_default()
            .push(record);
    }

    pub fn add_link_record(&mut self, record: DataRecord) {
        self.link_records
            .entry(record.resource_id.clone())
            .or_default()
            .push(record);
    }

    pub fn resource(&self, key: &ResourceKey) -> Option<&AttributesResource> {
        find_resource(&self.resources, key)
    }

    pub fn resource_at(&self, index: ResourceIndex) -> Option<&AttributesResource> {
        self.path.key_at(index).and_then(|key| self.resource(&key))
    }

    /// Constraint of an attribute at a path position (`Unknown` when missing).
    pub fn constraint_at(&self, index: ResourceIndex, attribute_id: &str) -> Constraint {
        self.resource_at(index)
            .map(|r| r.constraint_of(attribute_id))
            .unwrap_or_default()
    }

    /// Records stored for a resource key.
    pub fn records_of(&self, key: &ResourceKey) -> &[DataRecord] {
        let source = match key.resource_type {
            crate::resource::ResourceType::Collection => &self.records,
            crate::resource::ResourceType::LinkType => &self.link_records,
        };
        source.get(&key.id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::NumberConfig;
    use crate::resource::AttributeDefinition;

    #[test]
    fn test_from_json() {
        let snapshot = Snapshot::from_json(
            r#"{
                "records": { "tasks": [ { "id": "T1", "resource_id": "tasks", "data": { "a": 1 } } ] },
                "resources": [
                    { "id": "tasks", "resource_type": "Collection",
                      "attributes": [ { "id": "a", "name": "Score", "constraint": { "type": "Number", "config": {} } } ] }
                ],
                "path": ["tasks"]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.records_of(&ResourceKey::collection("tasks")).len(), 1);
        assert_eq!(
            snapshot.constraint_at(0, "a"),
            Constraint::Number(NumberConfig::default())
        );
        assert_eq!(snapshot.constraint_at(0, "missing"), Constraint::Unknown);
        assert_eq!(snapshot.constraint_at(4, "a"), Constraint::Unknown);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Snapshot::from_json("{"), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_add_records_groups_by_resource() {
        let mut snapshot = Snapshot::new(
            vec![AttributesResource::collection(
                "tasks",
                vec![AttributeDefinition::new("a", "A", Constraint::Unknown)],
            )],
            ResourcePath::new(["tasks"]),
        );
        snapshot.add_record(DataRecord::new("T1", "tasks"));
        snapshot.add_record(DataRecord::new("T2", "tasks"));
        snapshot.add_link_record(DataRecord::new_link("L1", "assigned", "T1", "P1"));

        assert_eq!(snapshot.records_of(&ResourceKey::collection("tasks")).len(), 2);
        assert_eq!(snapshot.records_of(&ResourceKey::link_type("assigned")).len(), 1);
        assert!(snapshot.records_of(&ResourceKey::link_type("tasks")).is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut snapshot = Snapshot::new(vec![], ResourcePath::new(["tasks"]));
        snapshot.add_record(DataRecord::new("T1", "tasks"));
        let text = snapshot.to_json().unwrap();
        assert_eq!(Snapshot::from_json(&text).unwrap(), snapshot);
    }
}
