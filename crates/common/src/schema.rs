//! Dereferenced schema nodes
//!
//! Every schema fragment of a document lives in a [`SchemaArena`] and is
//! addressed by its [`SchemaId`]. Identity is positional: `$ref`s to the same
//! definition share an id, while two structurally identical inline fragments
//! get distinct ids.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maximum nesting depth accepted while lowering or resolving schemas
pub const MAX_SCHEMA_DEPTH: usize = 128;

/// Surrogate key of a schema node, stable for the lifetime of its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(pub usize);

/// A single schema fragment with all references replaced by ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Type: string, number, integer, boolean, array, object, file
    #[serde(default)]
    pub schema_type: Option<String>,

    /// Format (e.g., int32, uuid, date-time)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, SchemaId>,

    /// Required property names
    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<SchemaId>,

    /// True when arbitrary additional properties are accepted
    #[serde(default)]
    pub additional_properties: bool,
}

impl SchemaNode {
    pub fn primitive(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    pub fn object<I>(properties: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (String, SchemaId)>,
    {
        Self {
            schema_type: Some("object".to_string()),
            properties: properties.into_iter().collect(),
            required: required.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn array(items: SchemaId) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(items),
            ..Default::default()
        }
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array")
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|name| name == property)
    }
}

/// Owner of every schema node of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id
    pub fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        self.nodes.push(node);
        SchemaId(self.nodes.len() - 1)
    }

    /// Reserve an id whose node is filled in later with [`SchemaArena::set`]
    pub fn reserve(&mut self) -> SchemaId {
        self.alloc(SchemaNode::default())
    }

    pub fn set(&mut self, id: SchemaId, node: SchemaNode) {
        self.nodes[id.0] = node;
    }

    /// # Panics
    /// Panics when `id` was not produced by this arena.
    pub fn get(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structurally_equal_nodes_have_distinct_ids() {
        let mut arena = SchemaArena::new();
        let a = arena.alloc(SchemaNode::primitive("string"));
        let b = arena.alloc(SchemaNode::primitive("string"));
        assert_ne!(a, b);
        assert_eq!(arena.get(a), arena.get(b));
    }

    #[test]
    fn test_reserved_node_can_reference_itself() {
        let mut arena = SchemaArena::new();
        let id = arena.reserve();
        let children = arena.alloc(SchemaNode::array(id));
        arena.set(
            id,
            SchemaNode::object([("children".to_string(), children)], &[]),
        );

        let node = arena.get(id);
        assert_eq!(node.properties["children"], children);
        assert_eq!(arena.get(children).items, Some(id));
    }
}
