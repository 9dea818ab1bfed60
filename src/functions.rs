//! Function Synthesizer: one overload set per query operation.
//!
//! Every top-level `oneOf` branch of the query message names one operation
//! through its single property key. Its parameters are resolved with the
//! splitting strategy; a parameter with k candidate types multiplies the
//! overload set by k (explicit Cartesian product, earlier parameters vary
//! slowest).
use indexmap::IndexMap;
use tracing::debug;

use crate::error::GenError;
use crate::graph::{NodeId, SchemaGraph, TypeSet};
use crate::ir::{CandidateType, FunctionSpec, Parameter, Statement};
use crate::naming;
use crate::registry::Position;
use crate::resolve::Resolver;

/// One parameter of one overload, before the body is assembled.
#[derive(Debug, Clone)]
struct Choice {
    key: String,
    ty: CandidateType,
    alternatives: usize,
}

pub struct FunctionSynthesizer<'r, 'g> {
    resolver: &'r mut Resolver<'g>,
    responses: &'r IndexMap<String, NodeId>,
}

impl<'r, 'g> FunctionSynthesizer<'r, 'g> {
    /// `responses` maps operation name → root node of its response schema.
    pub fn new(resolver: &'r mut Resolver<'g>, responses: &'r IndexMap<String, NodeId>) -> Self {
        Self { resolver, responses }
    }

    /// All overloads for every operation, in branch order.
    pub fn synthesize(&mut self, query: NodeId) -> Result<Vec<FunctionSpec>, GenError> {
        let graph = self.resolver.graph();
        let mut out = Vec::new();
        for &branch in &graph.node(query).one_of {
            out.extend(self.operation(branch)?);
        }
        Ok(out)
    }

    fn operation(&mut self, branch: NodeId) -> Result<Vec<FunctionSpec>, GenError> {
        let graph = self.resolver.graph();
        let node = graph.node(branch);
        let (operation, &arguments) = match node.properties.len() {
            1 => node.properties.first(),
            _ => None,
        }
        .ok_or_else(|| GenError::MalformedOperationSchema {
            location: node.location.clone(),
            found: node.properties.len(),
        })?;

        let &response = self.responses.get(operation).ok_or_else(|| GenError::MissingResponseSchema {
            operation: operation.clone(),
        })?;
        self.resolver.hint_name(response, format!("{}Response", naming::to_type_name(operation)));
        let return_type = self.resolver.merge(response, Position::Response)?;

        let mut overloads: Vec<Vec<Choice>> = vec![Vec::new()];
        for (key, id) in parameter_order(graph, arguments)? {
            let candidates = self.resolver.split(id)?;
            let alternatives = candidates.len();
            let (key, candidates) = (&key, &candidates);
            overloads = overloads.into_iter()
                .flat_map(|prefix| {
                    candidates.iter().map(move |ty| {
                        let mut params = prefix.clone();
                        params.push(Choice { key: key.clone(), ty: ty.clone(), alternatives });
                        params
                    })
                })
                .collect();
        }

        let name = naming::to_function_name(operation);
        debug!(operation = %operation, function = %name, overloads = overloads.len(), "synthesized query");
        Ok(overloads.into_iter()
            .map(|params| finish(&name, operation, params, &return_type, node.description.clone()))
            .collect())
    }
}

/// The argument object's properties, required ones first, each group in schema order.
fn parameter_order(graph: &SchemaGraph, arguments: NodeId) -> Result<Vec<(String, NodeId)>, GenError> {
    let object = args_object(graph, arguments)?;
    let node = graph.node(object);
    let is_required = |key: &str| node.required.as_ref().is_some_and(|r| r.iter().any(|k| k == key));
    let (required, optional): (Vec<_>, Vec<_>) = node.properties.iter()
        .map(|(k, &v)| (k.clone(), v))
        .partition(|(k, _)| is_required(k));
    Ok(required.into_iter().chain(optional).collect())
}

/// Follow `$ref` / single-`allOf` to the object that carries the parameters.
fn args_object(graph: &SchemaGraph, mut id: NodeId) -> Result<NodeId, GenError> {
    // a chain longer than the arena is a reference cycle
    for _ in 0..=graph.len() {
        let node = graph.node(id);
        match (node.reference, node.all_of.as_slice()) {
            (Some(target), []) => id = target,
            (None, [inner]) => id = *inner,
            _ if node.properties.is_empty() && node.one_of.is_empty() && node.any_of.is_empty()
                && node.types.without_null() == TypeSet::OBJECT => return Ok(id),
            _ if !node.properties.is_empty() && !node.has_combinators() => return Ok(id),
            _ => return Err(GenError::unsupported(&node.location, "query arguments must be an object")),
        }
    }
    Err(GenError::unsupported(&graph.node(id).location, "reference cycle in query arguments"))
}

fn finish(
    name: &str,
    operation: &str,
    params: Vec<Choice>,
    return_type: &CandidateType,
    description: Option<String>,
) -> FunctionSpec {
    let mut body = vec![Statement::BeginRequest];
    body.extend(params.iter().map(|p| Statement::InsertArgument {
        key: p.key.clone(),
        parameter: p.key.clone(),
    }));
    body.extend([
        Statement::SerializeRequest { operation: operation.to_string() },
        Statement::InvokeQuery,
        Statement::DeserializeResponse { ty: return_type.clone() },
        Statement::Return,
    ]);
    FunctionSpec {
        name: name.to_string(),
        operation: operation.to_string(),
        parameters: params.into_iter()
            .map(|p| Parameter {
                name: p.key,
                has_default: p.ty.nullable,
                ty: p.ty,
                alternatives: p.alternatives,
            })
            .collect(),
        return_type: return_type.clone(),
        description,
        body,
    }
}
