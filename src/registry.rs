//! Declarations keyed by schema-node identity, scoped to one compilation.
//!
//! The registry never renames: the resolver picks a free name (falling back to
//! `Request{N}`/`Response{N}`) before it reserves a slot.
use std::collections::HashMap;

use crate::graph::NodeId;
use crate::ir::{DeclKind, GeneratedTypeDecl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Caller-supplied values (query parameters).
    Request,
    /// Received values (query responses).
    Response,
}

#[derive(Debug, Default)]
pub struct Registry {
    decls: Vec<GeneratedTypeDecl>,
    by_node: HashMap<NodeId, usize>,
    /// `None` owner: claimed by a non-schema declaration (the container type).
    by_name: HashMap<String, Option<NodeId>>,
    request_counter: usize,
    response_counter: usize,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, node: NodeId) -> Option<&GeneratedTypeDecl> {
        self.by_node.get(&node).map(|&i| &self.decls[i])
    }

    /// True while the node's members are still being resolved.
    #[cfg(test)]
    fn is_pending(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|d| matches!(d.kind, DeclKind::Pending))
    }

    /// Is `name` held by a node other than `node`?
    pub fn is_taken(&self, name: &str, node: NodeId) -> bool {
        match self.by_name.get(name) {
            Some(Some(owner)) => *owner != node,
            Some(None) => true,
            None => false,
        }
    }

    /// Keep `name` away from schema declarations.
    pub fn claim_external_name(&mut self, name: impl Into<String>) {
        self.by_name.entry(name.into()).or_insert(None);
    }

    /// Next free `Request{N}` / `Response{N}`; counters only move forward.
    pub fn next_synthetic_name(&mut self, position: Position) -> String {
        loop {
            let (prefix, counter) = match position {
                Position::Request => ("Request", &mut self.request_counter),
                Position::Response => ("Response", &mut self.response_counter),
            };
            let name = format!("{prefix}{counter}");
            *counter += 1;
            if !self.by_name.contains_key(&name) {
                return name;
            }
        }
    }

    /// Register `node` under `name` in first-encountered order, members pending.
    pub fn reserve(&mut self, node: NodeId, name: String, description: Option<String>) {
        debug_assert!(!self.by_node.contains_key(&node), "node reserved twice");
        self.by_name.insert(name.clone(), Some(node));
        self.by_node.insert(node, self.decls.len());
        self.decls.push(GeneratedTypeDecl { name, node, description, kind: DeclKind::Pending });
    }

    pub fn complete(&mut self, node: NodeId, kind: DeclKind) {
        if let Some(&i) = self.by_node.get(&node) {
            self.decls[i].kind = kind;
        }
    }

    pub fn len(&self) -> usize { self.decls.len() }
    pub fn is_empty(&self) -> bool { self.decls.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedTypeDecl> {
        self.decls.iter()
    }

    pub fn into_declarations(self) -> Vec<GeneratedTypeDecl> {
        self.decls
    }
}
