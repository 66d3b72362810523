//! FILENAME: object-adapter/src/definition.rs
//! Object Definition - Logical names for grouping and value attributes.
//!
//! Callers describe the objects they want in their own vocabulary
//! ("project", "owner", "hours"); these names become the keys of every
//! flattened object.

use serde::{Deserialize, Serialize};
use pivot_engine::definition::{GroupingAttribute, TreeRequest, ValueAttribute};

/// A grouping level under a caller-chosen name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAttribute {
    pub name: String,
    pub attribute: GroupingAttribute,
}

impl NamedAttribute {
    pub fn new(name: impl Into<String>, attribute: GroupingAttribute) -> Self {
        NamedAttribute {
            name: name.into(),
            attribute,
        }
    }
}

/// A value attribute under a caller-chosen name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValueAttribute {
    pub name: String,
    pub attribute: ValueAttribute,
}

impl NamedValueAttribute {
    pub fn new(name: impl Into<String>, attribute: ValueAttribute) -> Self {
        NamedValueAttribute {
            name: name.into(),
            attribute,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRequest {
    #[serde(default)]
    pub levels: Vec<NamedAttribute>,
    #[serde(default)]
    pub values: Vec<NamedValueAttribute>,
}

impl ObjectRequest {
    /// The tree-mode request this object request runs on.
    pub fn to_tree_request(&self) -> TreeRequest {
        TreeRequest {
            levels: self.levels.iter().map(|l| l.attribute.clone()).collect(),
            values: self.values.iter().map(|v| v.attribute.clone()).collect(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&NamedValueAttribute> {
        self.values.iter().find(|v| v.name == name)
    }
}
