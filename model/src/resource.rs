//! FILENAME: model/src/resource.rs
//! PURPOSE: Schema side of the data model: resources, attributes, query paths.
//! CONTEXT: A resource is either a collection (primary entity type) or a
//! link type connecting exactly two collections. A `ResourcePath` is the
//! caller-declared ordering of resources for one query and always alternates
//! collection, link type, collection, ...

use serde::{Deserialize, Serialize};
use crate::constraint::Constraint;
use crate::error::ModelError;

/// Index into a `ResourcePath` (0-based).
pub type ResourceIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    Collection,
    LinkType,
}

impl ResourceType {
    /// Resource type expected at a path position.
    pub fn at_index(index: ResourceIndex) -> Self {
        if index % 2 == 0 {
            ResourceType::Collection
        } else {
            ResourceType::LinkType
        }
    }
}

/// Synthetic `(type, id)` key. Keeps collection and link type ids apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_type: ResourceType,
    pub id: String,
}

impl ResourceKey {
    pub fn new(resource_type: ResourceType, id: impl Into<String>) -> Self {
        ResourceKey {
            resource_type,
            id: id.into(),
        }
    }

    pub fn collection(id: impl Into<String>) -> Self {
        Self::new(ResourceType::Collection, id)
    }

    pub fn link_type(id: impl Into<String>) -> Self {
        Self::new(ResourceType::LinkType, id)
    }
}

/// One attribute of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub constraint: Constraint,
}

impl AttributeDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, constraint: Constraint) -> Self {
        AttributeDefinition {
            id: id.into(),
            name: name.into(),
            constraint,
        }
    }
}

/// A named entity type owning an ordered list of attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributesResource {
    pub id: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
    /// The two connected collections (link types only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ids: Option<[String; 2]>,
}

impl AttributesResource {
    pub fn collection(id: impl Into<String>, attributes: Vec<AttributeDefinition>) -> Self {
        let id = id.into();
        AttributesResource {
            name: id.clone(),
            id,
            resource_type: ResourceType::Collection,
            attributes,
            collection_ids: None,
        }
    }

    pub fn link_type(
        id: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
        attributes: Vec<AttributeDefinition>,
    ) -> Self {
        let id = id.into();
        AttributesResource {
            name: id.clone(),
            id,
            resource_type: ResourceType::LinkType,
            attributes,
            collection_ids: Some([first.into(), second.into()]),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type, self.id.clone())
    }

    pub fn attribute(&self, attribute_id: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.id == attribute_id)
    }

    /// Constraint of an attribute, `Unknown` when the attribute is not declared.
    pub fn constraint_of(&self, attribute_id: &str) -> Constraint {
        self.attribute(attribute_id)
            .map(|a| a.constraint.clone())
            .unwrap_or_default()
    }
}

/// Finds a resource by key in a metadata list.
pub fn find_resource<'a>(
    resources: &'a [AttributesResource],
    key: &ResourceKey,
) -> Option<&'a AttributesResource> {
    resources
        .iter()
        .find(|r| r.resource_type == key.resource_type && r.id == key.id)
}

/// Ordered resources of one query: `[Collection, LinkType, Collection, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePath {
    resource_ids: Vec<String>,
}

impl ResourcePath {
    pub fn new<I, S>(resource_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResourcePath {
            resource_ids: resource_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.resource_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_ids.is_empty()
    }

    pub fn id_at(&self, index: ResourceIndex) -> Option<&str> {
        self.resource_ids.get(index).map(String::as_str)
    }

    pub fn key_at(&self, index: ResourceIndex) -> Option<ResourceKey> {
        self.id_at(index)
            .map(|id| ResourceKey::new(ResourceType::at_index(index), id))
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.resource_ids
            .iter()
            .enumerate()
            .map(|(i, id)| ResourceKey::new(ResourceType::at_index(i), id.clone()))
    }

    /// First position of a resource in the path.
    pub fn position_of(&self, key: &ResourceKey) -> Option<ResourceIndex> {
        self.keys().position(|k| &k == key)
    }

    /// Checks the path against resource metadata: every position must name a
    /// known resource of the right type, and every link type must connect the
    /// collections on both sides of it.
    pub fn validate(&self, resources: &[AttributesResource]) -> Result<(), ModelError> {
        if !self.is_empty() && self.len() % 2 == 0 {
            return Err(ModelError::InvalidPath(format!(
                "path of length {} ends with a link type",
                self.len()
            )));
        }

        for (index, key) in self.keys().enumerate() {
            let resource = find_resource(resources, &key)
                .ok_or_else(|| ModelError::UnknownResource(key.id.clone()))?;

            if key.resource_type != ResourceType::LinkType {
                continue;
            }

            let ends = resource.collection_ids.as_ref().ok_or_else(|| {
                ModelError::InvalidPath(format!("link type {} has no collections", key.id))
            })?;
            let before = self.id_at(index - 1).unwrap_or_default();
            let after = self.id_at(index + 1).unwrap_or_default();
            let connects = (ends[0] == before && ends[1] == after)
                || (ends[0] == after && ends[1] == before);
            if !connects {
                return Err(ModelError::InvalidPath(format!(
                    "link type {} does not connect {} and {}",
                    key.id, before, after
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Vec<AttributesResource> {
        vec![
            AttributesResource::collection("tasks", vec![]),
            AttributesResource::collection("projects", vec![]),
            AttributesResource::link_type("assigned", "tasks", "projects", vec![]),
        ]
    }

    #[test]
    fn test_types_alternate_by_position() {
        let path = ResourcePath::new(["tasks", "assigned", "projects"]);
        assert_eq!(path.key_at(0), Some(ResourceKey::collection("tasks")));
        assert_eq!(path.key_at(1), Some(ResourceKey::link_type("assigned")));
        assert_eq!(path.key_at(2), Some(ResourceKey::collection("projects")));
        assert_eq!(path.key_at(3), None);
    }

    #[test]
    fn test_validate_accepts_reversed_link() {
        let path = ResourcePath::new(["projects", "assigned", "tasks"]);
        assert!(path.validate(&metadata()).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_link() {
        let mut resources = metadata();
        resources.push(AttributesResource::collection("people", vec![]));
        let path = ResourcePath::new(["tasks", "assigned", "people"]);
        assert!(matches!(
            path.validate(&resources),
            Err(ModelError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_and_trailing_link() {
        let resources = metadata();
        assert!(matches!(
            ResourcePath::new(["missing"]).validate(&resources),
            Err(ModelError::UnknownResource(_))
        ));
        assert!(matches!(
            ResourcePath::new(["tasks", "assigned"]).validate(&resources),
            Err(ModelError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_constraint_of_missing_attribute_is_unknown() {
        let resource = AttributesResource::collection("tasks", vec![]);
        assert_eq!(resource.constraint_of("nope"), Constraint::Unknown);
    }
}
