//! Schema Graph: an arena of parsed JSON Schema nodes.
//!
//! A node is one location inside one sub-schema document. `$ref` edges point
//! at the arena slot of the referenced location, so the same definition
//! reached through two properties is the same `NodeId`. Identity is the slot,
//! never the structural value.
pub mod load;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::GenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

// ------------------------------- Type sets -------------------------------- //

/// The `type` keyword, single or list form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TypeSet(u8);

impl TypeSet {
    pub const NULL: Self = Self(1);
    pub const BOOLEAN: Self = Self(1 << 1);
    pub const INTEGER: Self = Self(1 << 2);
    pub const NUMBER: Self = Self(1 << 3);
    pub const STRING: Self = Self(1 << 4);
    pub const ARRAY: Self = Self(1 << 5);
    pub const OBJECT: Self = Self(1 << 6);

    pub fn empty() -> Self { Self(0) }

    /// Unknown names (`file`, `any`, ...) contribute nothing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "null" => Self::NULL,
            "boolean" => Self::BOOLEAN,
            "integer" => Self::INTEGER,
            "number" => Self::NUMBER,
            "string" => Self::STRING,
            "array" => Self::ARRAY,
            "object" => Self::OBJECT,
            _ => Self::empty(),
        }
    }

    pub fn union(self, other: Self) -> Self { Self(self.0 | other.0) }
    pub fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 && other.0 != 0 }
    pub fn is_empty(self) -> bool { self.0 == 0 }
    pub fn without_null(self) -> Self { Self(self.0 & !Self::NULL.0) }
}

impl std::fmt::Display for TypeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(TypeSet, &str); 7] = [
            (TypeSet::NULL, "null"),
            (TypeSet::BOOLEAN, "boolean"),
            (TypeSet::INTEGER, "integer"),
            (TypeSet::NUMBER, "number"),
            (TypeSet::STRING, "string"),
            (TypeSet::ARRAY, "array"),
            (TypeSet::OBJECT, "object"),
        ];
        let names: Vec<_> = NAMES.iter()
            .filter(|(t, _)| self.contains(*t))
            .map(|(_, n)| *n)
            .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

// --------------------------------- Nodes ---------------------------------- //

#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    /// `document#/json/pointer`, for diagnostics.
    pub location: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub types: TypeSet,
    pub properties: IndexMap<String, NodeId>,
    /// `None` when the keyword is absent.
    pub required: Option<Vec<String>>,
    pub items: Option<NodeId>,
    /// List-form `items` / `prefixItems`.
    pub tuple_items: Vec<NodeId>,
    pub one_of: Vec<NodeId>,
    pub any_of: Vec<NodeId>,
    pub all_of: Vec<NodeId>,
    pub reference: Option<NodeId>,
    /// `enum` values, or the single `const` value.
    pub enumeration: Vec<Value>,
    /// Set when the node sits directly under the root's `definitions`/`$defs`.
    pub definition_key: Option<String>,
    /// Set when the node is the value of an object property.
    pub property_name: Option<String>,
}

impl SchemaNode {
    pub(crate) fn at(location: String) -> Self {
        Self { location, ..Self::default() }
    }

    /// `{"type": "string", "enum": ["low"]}` and friends: one string literal, no structure.
    pub fn single_string_constant(&self) -> Option<&str> {
        match self.enumeration.as_slice() {
            [Value::String(s)] if self.properties.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Exactly `{"type": "null"}`.
    pub fn is_null_type(&self) -> bool {
        self.types == TypeSet::NULL && !self.has_combinators()
    }

    pub fn has_combinators(&self) -> bool {
        !self.one_of.is_empty()
            || !self.any_of.is_empty()
            || !self.all_of.is_empty()
            || self.reference.is_some()
    }
}

// --------------------------------- Graph ---------------------------------- //

#[derive(Debug, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
}

impl SchemaGraph {
    pub fn new() -> Self { Self::default() }

    /// Load one sub-schema document and return its root node.
    /// `document` labels the source in diagnostics (`query`, `responses.balance`).
    pub fn load(&mut self, document: &str, root: &Value) -> Result<NodeId, GenError> {
        load::Loader::new(self, document, root).load_root()
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub(crate) fn alloc(&mut self, location: String) -> NodeId {
        self.nodes.push(SchemaNode::at(location));
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn fill(&mut self, id: NodeId, node: SchemaNode) {
        self.nodes[id.0] = node;
    }
}
