//! JSON value → arena nodes, with local `$ref` resolution.
use std::collections::HashMap;
use serde_json::{Map, Value};

use super::{NodeId, SchemaGraph, SchemaNode, TypeSet};
use crate::error::GenError;

pub(crate) struct Loader<'a> {
    graph: &'a mut SchemaGraph,
    document: &'a str,
    root: &'a Value,
    /// JSON pointer → slot. Filled before a node's children load, so cycles terminate.
    by_pointer: HashMap<String, NodeId>,
}

impl<'a> Loader<'a> {
    pub(crate) fn new(graph: &'a mut SchemaGraph, document: &'a str, root: &'a Value) -> Self {
        Self { graph, document, root, by_pointer: HashMap::new() }
    }

    pub(crate) fn load_root(mut self) -> Result<NodeId, GenError> {
        let root = self.root;
        // definitions first so they take the earliest slots of this document
        for keyword in ["definitions", "$defs"] {
            if let Some(Value::Object(defs)) = root.get(keyword) {
                for key in defs.keys() {
                    self.node_at(&format!("/{keyword}/{}", escape(key)))?;
                }
            }
        }
        self.node_at("")
    }

    fn node_at(&mut self, pointer: &str) -> Result<NodeId, GenError> {
        if let Some(&id) = self.by_pointer.get(pointer) {
            return Ok(id);
        }
        let root = self.root;
        let location = format!("{}#{}", self.document, pointer);
        let Some(value) = root.pointer(pointer) else {
            return Err(GenError::UnresolvedReference { location, reference: format!("#{pointer}") });
        };
        let id = self.graph.alloc(location.clone());
        self.by_pointer.insert(pointer.to_string(), id);
        let node = self.parse(value, pointer, location)?;
        self.graph.fill(id, node);
        Ok(id)
    }

    fn parse(&mut self, value: &Value, pointer: &str, location: String) -> Result<SchemaNode, GenError> {
        let mut node = SchemaNode::at(location);
        let (definition_key, property_name) = classify(pointer);
        node.definition_key = definition_key;
        node.property_name = property_name;

        // boolean schemas carry no structure
        let Value::Object(map) = value else {
            return Ok(node);
        };

        node.title = string_field(map, "title");
        node.description = string_field(map, "description");
        node.types = match map.get("type") {
            Some(Value::String(name)) => TypeSet::from_name(name),
            Some(Value::Array(names)) => names.iter()
                .filter_map(Value::as_str)
                .fold(TypeSet::empty(), |acc, n| acc.union(TypeSet::from_name(n))),
            _ => TypeSet::empty(),
        };

        if let Some(Value::Object(props)) = map.get("properties") {
            for key in props.keys() {
                let child = self.node_at(&format!("{pointer}/properties/{}", escape(key)))?;
                node.properties.insert(key.clone(), child);
            }
        }
        if let Some(Value::Array(required)) = map.get("required") {
            node.required = Some(required.iter().filter_map(Value::as_str).map(str::to_owned).collect());
        }

        match map.get("items") {
            Some(Value::Object(_)) => node.items = Some(self.node_at(&format!("{pointer}/items"))?),
            Some(Value::Array(_)) => node.tuple_items = self.children(map, pointer, "items")?,
            _ => {}
        }
        if map.get("prefixItems").is_some() {
            node.tuple_items = self.children(map, pointer, "prefixItems")?;
        }

        node.one_of = self.children(map, pointer, "oneOf")?;
        node.any_of = self.children(map, pointer, "anyOf")?;
        node.all_of = self.children(map, pointer, "allOf")?;

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            node.reference = Some(self.follow(reference, &node.location)?);
        }

        if let Some(Value::Array(values)) = map.get("enum") {
            node.enumeration = values.clone();
        } else if let Some(value) = map.get("const") {
            node.enumeration = vec![value.clone()];
        }

        Ok(node)
    }

    fn children(&mut self, map: &Map<String, Value>, pointer: &str, keyword: &str) -> Result<Vec<NodeId>, GenError> {
        let Some(Value::Array(xs)) = map.get(keyword) else {
            return Ok(Vec::new());
        };
        (0..xs.len())
            .map(|i| self.node_at(&format!("{pointer}/{keyword}/{i}")))
            .collect()
    }

    fn follow(&mut self, reference: &str, location: &str) -> Result<NodeId, GenError> {
        let unresolved = || GenError::UnresolvedReference {
            location: location.to_string(),
            reference: reference.to_string(),
        };
        let pointer = reference.strip_prefix('#').ok_or_else(unresolved)?;
        if self.root.pointer(pointer).is_none() {
            return Err(unresolved());
        }
        self.node_at(pointer)
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// (definitions key, property name) implied by where the node sits.
fn classify(pointer: &str) -> (Option<String>, Option<String>) {
    let segments: Vec<&str> = pointer.split('/').skip(1).collect();
    let definition_key = match segments.as_slice() {
        ["definitions" | "$defs", key] => Some(unescape(key)),
        _ => None,
    };
    let property_name = match segments.as_slice() {
        [.., "properties", key] => Some(unescape(key)),
        _ => None,
    };
    (definition_key, property_name)
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
