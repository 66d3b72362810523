//! FILENAME: model/src/record.rs
//! PURPOSE: Defines a single record of a collection or link type.
//! CONTEXT: Records are immutable snapshots handed in by the UI layer. The
//! aggregation pass only borrows them; neighbor information lives in the
//! record graph, never on the record itself.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// A raw stored attribute value, exactly as the UI keeps it.
pub type RawValue = serde_json::Value;

/// One instance of an attributes resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub id: String,

    /// Id of the collection or link type owning this record.
    pub resource_id: String,

    /// Attribute id -> raw value.
    #[serde(default)]
    pub data: HashMap<String, RawValue>,

    /// Endpoint record ids for link records, in the order of the link
    /// type's `collection_ids`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_record_ids: Option<[String; 2]>,
}

impl DataRecord {
    pub fn new(id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        DataRecord {
            id: id.into(),
            resource_id: resource_id.into(),
            data: HashMap::new(),
            linked_record_ids: None,
        }
    }

    /// Creates a link record connecting two primary records.
    pub fn new_link(
        id: impl Into<String>,
        resource_id: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        DataRecord {
            id: id.into(),
            resource_id: resource_id.into(),
            data: HashMap::new(),
            linked_record_ids: Some([first.into(), second.into()]),
        }
    }

    /// Builder-style attribute setter, mostly used by tests and fixtures.
    pub fn with_value(mut self, attribute_id: impl Into<String>, value: RawValue) -> Self {
        self.data.insert(attribute_id.into(), value);
        self
    }

    pub fn value(&self, attribute_id: &str) -> Option<&RawValue> {
        self.data.get(attribute_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json() {
        let record: DataRecord = serde_json::from_value(json!({
            "id": "L1",
            "resource_id": "assigned",
            "data": { "a1": 3 },
            "linked_record_ids": ["T1", "P1"]
        }))
        .unwrap();

        assert_eq!(record.value("a1"), Some(&json!(3)));
        assert_eq!(
            record.linked_record_ids,
            Some(["T1".to_string(), "P1".to_string()])
        );
    }

    #[test]
    fn test_missing_data_defaults_to_empty() {
        let record: DataRecord =
            serde_json::from_value(json!({ "id": "T1", "resource_id": "tasks" })).unwrap();
        assert!(record.data.is_empty());
        assert!(record.linked_record_ids.is_none());
    }
}
