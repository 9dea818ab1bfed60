//! Typed query clients from CosmWasm contract JSON schemas.
//!
//! ```text
//! ContractSchema ─► SchemaGraph ─► Resolver + Registry ─► FunctionSynthesizer ─► ContractIr ─► Emitter
//! ```
//!
//! Each call to [`compile`] owns its graph and registry, so independent
//! contracts can be compiled on separate threads.
pub mod codegen;
pub mod config;
pub mod contract;
pub mod error;
pub mod functions;
pub mod graph;
pub mod ir;
pub mod logging;
pub mod naming;
pub mod path_de;
pub mod registry;
pub mod resolve;
pub mod runtime;

use indexmap::IndexMap;
use tracing::info;

pub use codegen::{Emitter, RustEmitter};
pub use config::GenerateOptions;
pub use contract::ContractSchema;
pub use error::GenError;
pub use ir::ContractIr;
pub use naming::implementation_name;

use functions::FunctionSynthesizer;
use graph::SchemaGraph;
use resolve::Resolver;

/// Rust source for `schema` with default [`GenerateOptions`].
pub fn generate(interface: &str, namespace: &str, schema: &ContractSchema) -> Result<String, GenError> {
    generate_with(interface, namespace, schema, &GenerateOptions::default())
}

pub fn generate_with(
    interface: &str,
    namespace: &str,
    schema: &ContractSchema,
    options: &GenerateOptions,
) -> Result<String, GenError> {
    let ir = compile(interface, namespace, schema)?;
    let mut emitter = RustEmitter::new(namespace, options)?;
    codegen::emit(&ir, &mut emitter)?;
    emitter.finish()
}

/// Declarations and functions for `schema`, before rendering.
pub fn compile(interface: &str, namespace: &str, schema: &ContractSchema) -> Result<ContractIr, GenError> {
    validate_interface(interface)?;

    let mut graph = SchemaGraph::new();
    let query = graph.load("query", &schema.query)?;
    let mut responses = IndexMap::new();
    for (operation, document) in schema.responses() {
        let root = graph.load(&format!("responses.{operation}"), document)?;
        responses.insert(operation.clone(), root);
    }

    let implementation = implementation_name(interface);
    let mut resolver = Resolver::new(&graph);
    resolver.registry_mut().claim_external_name(interface);
    resolver.registry_mut().claim_external_name(implementation.clone());
    resolver.registry_mut().claim_external_name(codegen::rust::QUERIER_PARAM);

    let functions = FunctionSynthesizer::new(&mut resolver, &responses).synthesize(query)?;
    let declarations = resolver.into_registry().into_declarations();

    info!(
        contract = %schema.contract_name,
        nodes = graph.len(),
        declarations = declarations.len(),
        functions = functions.len(),
        "compiled contract schema"
    );

    Ok(ContractIr {
        contract_name: schema.contract_name.clone(),
        contract_version: schema.contract_version.clone(),
        namespace: namespace.to_string(),
        interface: interface.to_string(),
        implementation,
        declarations,
        functions,
    })
}

fn validate_interface(interface: &str) -> Result<(), GenError> {
    let valid = interface.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && interface.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && interface != "_"
        && interface != codegen::rust::QUERIER_PARAM;
    if !valid {
        return Err(GenError::InvalidConfig(format!("interface name `{interface}` is not an identifier")));
    }
    Ok(())
}
