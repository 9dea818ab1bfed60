// Enum Synthesizer: closed sets of string literals → one named enumeration.
use std::collections::HashSet;
use serde_json::Value;

use super::Resolver;
use crate::error::GenError;
use crate::graph::{NodeId, SchemaGraph, SchemaNode};
use crate::ir::{CandidateType, DeclKind, EnumMember};
use crate::naming;
use crate::registry::Position;

/// `oneOf` whose every branch is a single string constant, or a bare
/// `enum` listing two or more strings.
pub fn is_enumeration(graph: &SchemaGraph, node: &SchemaNode) -> bool {
    if !node.one_of.is_empty() {
        return node.one_of.iter().all(|&b| graph.node(b).single_string_constant().is_some());
    }
    node.enumeration.len() > 1
        && node.enumeration.iter().all(Value::is_string)
        && node.properties.is_empty()
        && !node.has_combinators()
}

/// (literal, description) pairs in declaration order.
fn literals<'g>(graph: &'g SchemaGraph, node: &'g SchemaNode) -> Vec<(&'g str, Option<&'g str>)> {
    if node.one_of.is_empty() {
        return node.enumeration.iter()
            .filter_map(Value::as_str)
            .map(|s| (s, None))
            .collect();
    }
    node.one_of.iter()
        .map(|&b| graph.node(b))
        .filter_map(|b| Some((b.single_string_constant()?, b.description.as_deref())))
        .collect()
}

/// Sanitized member names: UpperCamel of the literal, `Value{i}` when nothing
/// survives, index suffix on collision.
pub fn member_names<'a>(literals: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    literals.into_iter()
        .enumerate()
        .map(|(i, literal)| {
            let mut name = naming::to_type_name(literal);
            if name.is_empty() {
                name = format!("Value{i}");
            }
            if seen.contains(&name) {
                let base = name;
                let mut suffix = i;
                name = format!("{base}{suffix}");
                while seen.contains(&name) {
                    suffix += 1;
                    name = format!("{base}{suffix}");
                }
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

impl Resolver<'_> {
    pub(super) fn enumeration(&mut self, id: NodeId, position: Position) -> Result<CandidateType, GenError> {
        self.declare(id, position, |this| {
            let graph = this.graph;
            let pairs = literals(graph, graph.node(id));
            let names = member_names(pairs.iter().map(|(literal, _)| *literal));
            let members = pairs.into_iter()
                .zip(names)
                .map(|((value, description), name)| EnumMember {
                    name,
                    value: value.to_string(),
                    description: description.map(str::to_owned),
                })
                .collect();
            Ok(DeclKind::Enumeration { members })
        })
    }
}
