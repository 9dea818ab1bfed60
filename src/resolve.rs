//! Type Resolver: schema node → candidate type(s).
//!
//! Two strategies share one decision tree:
//! - *merging* (`merge`) yields exactly one type; a heterogeneous `oneOf`
//!   becomes a merged-variant record. Used for responses and object members.
//! - *splitting* (`split`) yields one candidate per exclusive `oneOf` branch.
//!   Used for query parameters, which become call overloads.
//!
//! Decision order, first match wins:
//! 1. `oneOf` of single string constants → enumeration
//! 2. other `oneOf` → merged variant (merging) / per-branch candidates (splitting)
//! 3. `anyOf` of exactly one type and `null` → that type, nullable
//! 4. `$ref` without `allOf` → the referenced node
//! 5. single `allOf` wrapping a `$ref` → the wrapped reference
//! 6. the declared `type`
//!
//! Declarations are looked up by node identity before being synthesized.
//! A cycle must pass through a declaration; one that loops through arrays,
//! references or nullable wrappers alone is rejected.
pub mod enums;
pub mod variant;

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::GenError;
use crate::graph::{NodeId, SchemaGraph, SchemaNode, TypeSet};
use crate::ir::{CandidateType, DeclKind, ObjectField, Primitive, TypeRef};
use crate::naming;
use crate::registry::{Position, Registry};

/// What a combinator-free node declares itself to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Element node; `None` when `items` is absent.
    Array(Option<NodeId>),
    OpaqueObject,
    Object,
    Primitive { primitive: Primitive, nullable: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Pass {
    Merge,
    Split,
}

pub struct Resolver<'g> {
    graph: &'g SchemaGraph,
    registry: Registry,
    /// Fallback names tried after title / definitions key / property name.
    hints: HashMap<NodeId, String>,
    /// Nodes on the current resolution path, with the registry size on entry.
    active: HashMap<(NodeId, Pass), usize>,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Self { graph, registry: Registry::new(), hints: HashMap::new(), active: HashMap::new() }
    }

    pub fn graph(&self) -> &'g SchemaGraph { self.graph }
    pub fn registry(&self) -> &Registry { &self.registry }
    pub fn registry_mut(&mut self) -> &mut Registry { &mut self.registry }
    pub fn into_registry(self) -> Registry { self.registry }

    /// Suggest a name for `node` should it become a declaration. First hint wins.
    pub fn hint_name(&mut self, node: NodeId, name: impl Into<String>) {
        self.hints.entry(node).or_insert_with(|| name.into());
    }

    // -------------------------------- Merging -------------------------------- //

    pub fn merge(&mut self, id: NodeId, position: Position) -> Result<CandidateType, GenError> {
        self.guarded(id, Pass::Merge, |this| this.merge_node(id, position))
    }

    fn merge_node(&mut self, id: NodeId, position: Position) -> Result<CandidateType, GenError> {
        let graph = self.graph;
        let node = graph.node(id);
        trace!(location = %node.location, "merge");

        if enums::is_enumeration(graph, node) {
            return self.enumeration(id, position);
        }
        if !node.one_of.is_empty() {
            return self.merged_variant(id, position);
        }
        if let Some(inner) = self.nullable_inner(node) {
            return Ok(self.merge(inner, position)?.into_nullable());
        }
        if let Some(target) = self.redirect(node)? {
            return self.merge(target, position);
        }

        match self.shape(node)? {
            Shape::Array(items) => {
                let element = match items {
                    Some(items) => self.merge(items, position)?,
                    None => CandidateType::new(TypeRef::Opaque),
                };
                Ok(CandidateType::array(element))
            }
            Shape::OpaqueObject => Ok(CandidateType::new(TypeRef::Opaque)),
            Shape::Object => self.object(id, position),
            Shape::Primitive { primitive, nullable } => {
                let ty = CandidateType::primitive(primitive);
                Ok(if nullable { ty.into_nullable() } else { ty })
            }
        }
    }

    // ------------------------------- Splitting ------------------------------- //

    /// Non-empty list of mutually exclusive candidates, in branch order.
    pub fn split(&mut self, id: NodeId) -> Result<Vec<CandidateType>, GenError> {
        self.guarded(id, Pass::Split, |this| this.split_node(id))
    }

    fn split_node(&mut self, id: NodeId) -> Result<Vec<CandidateType>, GenError> {
        let position = Position::Request;
        let graph = self.graph;
        let node = graph.node(id);
        trace!(location = %node.location, "split");

        let candidates = if enums::is_enumeration(graph, node) {
            vec![self.enumeration(id, position)?]
        } else if !node.one_of.is_empty() {
            let mut out = Vec::new();
            for &branch in &node.one_of {
                out.extend(self.split(branch)?);
            }
            out
        } else if let Some(inner) = self.nullable_inner(node) {
            self.split(inner)?.into_iter().map(CandidateType::into_nullable).collect()
        } else if let Some(target) = self.redirect(node)? {
            self.split(target)?
        } else {
            match self.shape(node)? {
                Shape::Array(Some(items)) => self.split(items)?
                    .into_iter()
                    .map(CandidateType::array)
                    .collect(),
                _ => vec![self.merge(id, position)?],
            }
        };

        if candidates.is_empty() {
            return Err(GenError::unsupported(&node.location, "no candidate types"));
        }
        Ok(candidates)
    }

    // -------------------------------- Shared --------------------------------- //

    /// Run `resolve` with `id` on the path. Re-entering `id` is only allowed
    /// once a declaration has been reserved since the last entry; otherwise
    /// the recursion would never reach a named type.
    fn guarded<T>(
        &mut self,
        id: NodeId,
        pass: Pass,
        resolve: impl FnOnce(&mut Self) -> Result<T, GenError>,
    ) -> Result<T, GenError> {
        let mark = self.registry.len();
        let previous = self.active.insert((id, pass), mark);
        if previous == Some(mark) {
            return Err(GenError::unsupported(
                &self.graph.node(id).location,
                "reference cycle through an unnamed type",
            ));
        }
        let result = resolve(self);
        match previous {
            Some(previous) => self.active.insert((id, pass), previous),
            None => self.active.remove(&(id, pass)),
        };
        result
    }

    /// `anyOf: [T, {"type": "null"}]` → T.
    fn nullable_inner(&self, node: &SchemaNode) -> Option<NodeId> {
        if node.any_of.len() != 2 {
            return None;
        }
        let mut non_null = node.any_of.iter()
            .copied()
            .filter(|&b| !self.graph.node(b).is_null_type());
        match (non_null.next(), non_null.next()) {
            (Some(inner), None) => Some(inner),
            _ => None,
        }
    }

    /// Follow `$ref`, or a single `allOf` that wraps one.
    fn redirect(&self, node: &SchemaNode) -> Result<Option<NodeId>, GenError> {
        match (node.reference, node.all_of.as_slice()) {
            (Some(target), []) => Ok(Some(target)),
            (None, [inner]) if self.graph.node(*inner).reference.is_some() => Ok(Some(*inner)),
            (None, [_]) => Err(GenError::unsupported(&node.location, "allOf must wrap a $ref")),
            _ => Ok(None),
        }
    }

    fn shape(&self, node: &SchemaNode) -> Result<Shape, GenError> {
        if node.has_combinators() {
            return Err(GenError::unsupported(
                &node.location,
                format!(
                    "combinators (oneOf: {}, anyOf: {}, allOf: {}, $ref: {})",
                    node.one_of.len(),
                    node.any_of.len(),
                    node.all_of.len(),
                    node.reference.is_some(),
                ),
            ));
        }
        let nullable = node.types.contains(TypeSet::NULL);
        let primitive = |primitive| Ok(Shape::Primitive { primitive, nullable });
        match node.types.without_null() {
            TypeSet::ARRAY if !nullable => {
                if !node.tuple_items.is_empty() {
                    return Err(GenError::unsupported(&node.location, "tuple arrays"));
                }
                Ok(Shape::Array(node.items))
            }
            TypeSet::OBJECT if !nullable => {
                if node.properties.is_empty() {
                    Ok(Shape::OpaqueObject)
                } else {
                    Ok(Shape::Object)
                }
            }
            TypeSet::BOOLEAN => primitive(Primitive::Bool),
            TypeSet::INTEGER => primitive(Primitive::Integer),
            TypeSet::NUMBER => primitive(Primitive::Number),
            TypeSet::STRING => primitive(Primitive::String),
            _ => Err(GenError::unsupported(&node.location, format!("type `{}`", node.types))),
        }
    }

    fn object(&mut self, id: NodeId, position: Position) -> Result<CandidateType, GenError> {
        self.declare(id, position, |this| {
            let graph = this.graph;
            let node = graph.node(id);
            let mut fields = Vec::with_capacity(node.properties.len());
            for (key, &child) in &node.properties {
                let ty = this.merge(child, position)?;
                let listed = node.required.as_ref().is_none_or(|r| r.contains(key));
                fields.push(ObjectField {
                    key: key.clone(),
                    required: !ty.nullable && listed,
                    description: graph.node(child).description.clone(),
                    ty,
                });
            }
            Ok(DeclKind::Object { fields })
        })
    }

    /// Get-or-create a declaration for `id`. The slot is reserved before
    /// `build` runs, so recursive references see it (as a boxed back-edge).
    fn declare<F>(&mut self, id: NodeId, position: Position, build: F) -> Result<CandidateType, GenError>
    where
        F: FnOnce(&mut Self) -> Result<DeclKind, GenError>,
    {
        if let Some(decl) = self.registry.get(id) {
            let boxed = matches!(decl.kind, DeclKind::Pending);
            return Ok(CandidateType::named(decl.name.clone(), boxed));
        }
        let graph = self.graph;
        let node = graph.node(id);
        let name = self.declaration_name(id, position);
        self.registry.reserve(id, name.clone(), node.description.clone());
        let kind = build(self)?;
        debug!(name = %name, location = %node.location, "declared type");
        self.registry.complete(id, kind);
        Ok(CandidateType::named(name, false))
    }

    /// title → definitions key → property name → hint → `Request{N}`/`Response{N}`.
    fn declaration_name(&mut self, id: NodeId, position: Position) -> String {
        let graph = self.graph;
        let node = graph.node(id);
        let preferred = [
            node.title.as_deref(),
            node.definition_key.as_deref(),
            node.property_name.as_deref(),
            self.hints.get(&id).map(String::as_str),
        ];
        let preferred = preferred.into_iter()
            .flatten()
            .map(naming::to_type_name)
            .find(|name| !name.is_empty());
        match preferred {
            Some(name) if !self.registry.is_taken(&name, id) => name,
            _ => self.registry.next_synthetic_name(position),
        }
    }
}
