use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{Value, json};
use wasm_schema_gen::ir::{DeclKind, FunctionSpec, Statement};
use wasm_schema_gen::{ContractIr, ContractSchema, GenError, GenerateOptions, compile, generate, generate_with};

fn contract(query: Value, responses: Value) -> ContractSchema {
    ContractSchema::from_value(json!({
        "contract_name": "fixture",
        "contract_version": "0.1.0",
        "idl_version": "1.0.0",
        "instantiate": null,
        "execute": null,
        "query": query,
        "migrate": null,
        "sudo": null,
        "responses": responses,
    }))
    .unwrap()
}

fn single_query(operation: &str, arguments: Value) -> Value {
    json!({"oneOf": [{
        "type": "object",
        "required": [operation],
        "properties": {operation: arguments}
    }]})
}

fn cw20() -> ContractSchema {
    ContractSchema::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/cw20_base.json")).unwrap()
}

fn declaration_names(ir: &ContractIr) -> Vec<&str> {
    ir.declarations.iter().map(|d| d.name.as_str()).collect()
}

fn object_fields(ir: &ContractIr, name: &str) -> Vec<(String, String, bool)> {
    match &ir.declaration(name).unwrap().kind {
        DeclKind::Object { fields } => fields.iter().map(|f| (f.key.clone(), f.ty.to_string(), f.required)).collect(),
        other => panic!("{name} is not an object: {other:?}"),
    }
}

// ------------------------------- End to end -------------------------------- //

#[test]
fn balance_query_end_to_end() {
    let schema = contract(
        json!({"oneOf": [{"properties": {"balance": {
            "type": "object",
            "properties": {"address": {"type": "string"}},
            "required": ["address"]
        }}}]}),
        json!({"balance": {"type": "object", "properties": {"amount": {"type": "string"}}}}),
    );
    let ir = compile("ICw20", "", &schema).unwrap();
    assert_eq!(ir.implementation, "Cw20");
    assert_eq!(ir.functions.len(), 1);
    assert_eq!(ir.functions[0].signature(), "BalanceAsync(address: string) -> BalanceResponse");
    assert_eq!(object_fields(&ir, "BalanceResponse"), [("amount".to_string(), "string".to_string(), true)]);

    let src = generate("ICw20", "", &schema).unwrap();
    syn::parse_file(&src).unwrap();
    assert!(src.contains("pub struct BalanceResponse"));
    assert!(src.contains("pub amount: ::std::string::String"));
    assert!(src.contains("async fn balance_async("));
}

#[test]
fn cw20_fixture_compiles_and_renders() {
    let schema = cw20();
    let ir = compile("ICw20", "cw20", &schema).unwrap();
    assert_eq!(declaration_names(&ir), [
        "BalanceResponse",
        "TokenInfoResponse",
        "MinterResponse",
        "AllAccountsResponse",
        "MarketingInfoResponse",
        "LogoInfo",
        "SimulationResponse",
        "Request0",
        "Token",
        "Request1",
        "NativeToken",
    ]);

    let names: Vec<_> = ir.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, [
        "BalanceAsync",
        "TokenInfoAsync",
        "MinterAsync",
        "AllAccountsAsync",
        "MarketingInfoAsync",
        "SimulationAsync",
        "SimulationAsync",
    ]);
    assert_eq!(ir.functions[2].return_type.to_string(), "MinterResponse?");
    assert!(ir.functions[1].parameters.is_empty());

    match &ir.declaration("LogoInfo").unwrap().kind {
        DeclKind::MergedVariant { variants } => {
            let rendered: Vec<_> = variants.iter().map(|v| format!("{}: {}", v.key, v.ty)).collect();
            assert_eq!(rendered, ["Value: StringWrapper?", "url: StringWrapper?"]);
        }
        other => panic!("LogoInfo is not a merged variant: {other:?}"),
    }

    let src = generate("ICw20", "cw20", &schema).unwrap();
    syn::parse_file(&src).unwrap();
    assert!(src.contains("pub mod cw20"));
    assert!(src.contains("async fn simulation_async_request0("));
    assert!(src.contains("async fn simulation_async_request1("));
    assert!(src.contains("/// Returns the current balance of the given address, 0 if unset."));
}

#[test]
fn generation_is_idempotent() {
    let schema = cw20();
    let first = generate("ICw20", "cw20::client", &schema).unwrap();
    let second = generate("ICw20", "cw20::client", &schema).unwrap();
    assert_eq!(first, second);
}

#[test]
fn independent_compilations_run_concurrently() {
    let schema = cw20();
    let sequential = generate("ICw20", "", &schema).unwrap();
    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| generate("ICw20", "", &schema).unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(outputs.iter().all(|o| *o == sequential));
}

#[test]
fn options_change_rendering_only() {
    let schema = cw20();
    let options = GenerateOptions { emit_header: false, wrap_namespace: false, ..GenerateOptions::default() };
    let src = generate_with("ICw20", "cw20", &schema, &options).unwrap();
    syn::parse_file(&src).unwrap();
    assert!(!src.contains("pub mod cw20"));
    assert!(!src.contains("@generated"));
}

// ------------------------------ Identity dedup ------------------------------ //

#[test]
fn shared_definition_is_declared_once() {
    let schema = contract(
        single_query("pair", json!({"type": "object"})),
        json!({"pair": {
            "title": "PairResponse",
            "type": "object",
            "properties": {
                "left": {"$ref": "#/definitions/Asset"},
                "right": {"allOf": [{"$ref": "#/definitions/Asset"}], "description": "the other side"}
            },
            "definitions": {"Asset": {"type": "object", "properties": {"denom": {"type": "string"}}}}
        }}),
    );
    let ir = compile("IPair", "", &schema).unwrap();
    assert_eq!(declaration_names(&ir), ["PairResponse", "Asset"]);
}

#[test]
fn structurally_equal_nodes_stay_distinct() {
    let schema = contract(
        single_query("pair", json!({"type": "object"})),
        json!({"pair": {
            "title": "PairResponse",
            "type": "object",
            "properties": {
                "left": {"type": "object", "properties": {"denom": {"type": "string"}}},
                "right": {"type": "object", "properties": {"denom": {"type": "string"}}}
            }
        }}),
    );
    let ir = compile("IPair", "", &schema).unwrap();
    assert_eq!(declaration_names(&ir), ["PairResponse", "Left", "Right"]);
}

#[test]
fn interface_and_container_names_are_reserved() {
    let schema = contract(
        single_query("config", json!({"type": "object"})),
        json!({"config": {"title": "Cw20", "type": "object", "properties": {"owner": {"type": "string"}}}}),
    );
    let ir = compile("ICw20", "", &schema).unwrap();
    assert_eq!(declaration_names(&ir), ["Response0"]);
    syn::parse_file(&generate("ICw20", "", &schema).unwrap()).unwrap();
}

#[test]
fn querier_parameter_name_is_reserved() {
    let schema = contract(
        single_query("config", json!({"type": "object"})),
        json!({"config": {"title": "Q", "type": "object", "properties": {"owner": {"type": "string"}}}}),
    );
    let ir = compile("ICw20", "", &schema).unwrap();
    assert_eq!(declaration_names(&ir), ["Response0"]);
    let src = generate("ICw20", "", &schema).unwrap();
    syn::parse_file(&src).unwrap();
    assert!(src.contains("pub struct Response0"));
    assert!(!src.contains("pub struct Q "));
}

// ------------------------------- Enumerations ------------------------------- //

#[test]
fn string_constant_disjunction_becomes_one_enum() {
    let schema = contract(
        single_query("level", json!({"type": "object"})),
        json!({"level": {
            "title": "Level",
            "oneOf": [
                {"type": "string", "enum": ["low"]},
                {"type": "string", "enum": ["medium"]},
                {"type": "string", "enum": ["high"]}
            ]
        }}),
    );
    let ir = compile("ILevels", "", &schema).unwrap();
    match &ir.declaration("Level").unwrap().kind {
        DeclKind::Enumeration { members } => {
            let values: Vec<_> = members.iter().map(|m| (m.name.as_str(), m.value.as_str())).collect();
            assert_eq!(values, [("Low", "low"), ("Medium", "medium"), ("High", "high")]);
        }
        other => panic!("Level is not an enumeration: {other:?}"),
    }
    let src = generate("ILevels", "", &schema).unwrap();
    assert!(src.contains("#[serde(rename = \"medium\")]"));
}

// -------------------------------- Nullability ------------------------------- //

#[test]
fn nullable_members_are_optional() {
    let schema = contract(
        single_query("holder", json!({"type": "object"})),
        json!({"holder": {
            "title": "Holder",
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "id": {"type": "integer"}
            }
        }}),
    );
    let ir = compile("IHolder", "", &schema).unwrap();
    assert_eq!(object_fields(&ir, "Holder"), [
        ("name".to_string(), "string?".to_string(), false),
        ("id".to_string(), "int".to_string(), false),
    ]);
    let src = generate("IHolder", "", &schema).unwrap();
    assert!(src.contains("pub name: ::core::option::Option<::std::string::String>"));
    assert!(src.contains("pub id: ::core::option::Option<i64>"));
}

// -------------------------------- Overloads --------------------------------- //

#[test]
fn split_parameters_expand_to_all_combinations() {
    let schema = contract(
        single_query("price", json!({
            "type": "object",
            "required": ["offer", "ask"],
            "properties": {
                "offer": {"oneOf": [{"type": "string"}, {"type": "integer"}]},
                "ask": {"oneOf": [{"type": "string"}, {"type": "boolean"}, {"type": "number"}]}
            }
        })),
        json!({"price": {"type": "object", "properties": {"rate": {"type": "string"}}}}),
    );
    let ir = compile("IOracle", "", &schema).unwrap();
    let combos: HashSet<_> = ir.functions.iter()
        .map(|f| f.parameters.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>())
        .collect();
    assert_eq!(ir.functions.len(), 6);
    assert_eq!(combos.len(), 6);

    let src = generate("IOracle", "", &schema).unwrap();
    syn::parse_file(&src).unwrap();
    for name in [
        "price_async_string_string",
        "price_async_string_bool",
        "price_async_string_double",
        "price_async_int_string",
        "price_async_int_bool",
        "price_async_int_double",
    ] {
        assert!(src.contains(&format!("async fn {name}(")), "missing {name}");
    }
}

#[test]
fn every_overload_sends_the_same_request_shape() {
    let ir = compile("ICw20", "", &cw20()).unwrap();
    for f in ir.functions_named("SimulationAsync") {
        let keys: Vec<_> = f.body.iter()
            .filter_map(|s| match s {
                Statement::InsertArgument { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, ["ask_denom", "offer_asset"]);
        assert_eq!(f.body.last(), Some(&Statement::Return));
    }
}

const PRIMITIVES: [&str; 4] = ["string", "integer", "number", "boolean"];

fn overloaded(branch_counts: &[usize]) -> ContractSchema {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for (i, &k) in branch_counts.iter().enumerate() {
        let branches: Vec<Value> = PRIMITIVES[..k].iter().map(|t| json!({"type": t})).collect();
        properties.insert(format!("p{i}"), json!({"oneOf": branches}));
        required.push(format!("p{i}"));
    }
    contract(
        single_query("quote", json!({"type": "object", "required": required, "properties": properties})),
        json!({"quote": {"type": "object", "properties": {"value": {"type": "string"}}}}),
    )
}

fn parameter_types(f: &FunctionSpec) -> Vec<String> {
    f.parameters.iter().map(|p| p.ty.to_string()).collect()
}

proptest! {
    #[test]
    fn overloads_cover_the_full_cartesian_product(branch_counts in prop::collection::vec(1usize..=4, 1..=4)) {
        let ir = compile("IQuote", "", &overloaded(&branch_counts)).unwrap();
        let expected: usize = branch_counts.iter().product();
        prop_assert_eq!(ir.functions.len(), expected);

        let combos: HashSet<Vec<String>> = ir.functions.iter().map(parameter_types).collect();
        prop_assert_eq!(combos.len(), expected);

        for (i, &k) in branch_counts.iter().enumerate() {
            let seen: HashSet<&str> = ir.functions.iter().map(|f| {
                let ty = &f.parameters[i].ty;
                match ty.to_string().as_str() {
                    "string" => "string",
                    "int" => "integer",
                    "double" => "number",
                    _ => "boolean",
                }
            }).collect();
            prop_assert_eq!(seen.len(), k);
            prop_assert!(ir.functions.iter().all(|f| f.parameters[i].alternatives == k));
        }
    }
}

// ---------------------------------- Errors ---------------------------------- //

#[test]
fn missing_response_schema_is_reported() {
    let schema = contract(single_query("minter", json!({"type": "object"})), json!({}));
    let err = generate("ICw20", "", &schema).unwrap_err();
    assert!(matches!(err, GenError::MissingResponseSchema { operation } if operation == "minter"));
}

#[test]
fn branch_naming_two_operations_is_malformed() {
    let schema = contract(
        json!({"oneOf": [{"type": "object", "properties": {"a": {"type": "object"}, "b": {"type": "object"}}}]}),
        json!({}),
    );
    assert!(matches!(compile("IX", "", &schema), Err(GenError::MalformedOperationSchema { found: 2, .. })));
}

#[test]
fn unsupported_response_shape_fails_the_whole_compilation() {
    let schema = contract(
        single_query("raw", json!({"type": "object"})),
        json!({"raw": {"type": "object", "properties": {"f": {"type": "file"}}}}),
    );
    let err = generate("IRaw", "", &schema).unwrap_err();
    assert!(matches!(err, GenError::UnsupportedSchemaConstruct { location, .. } if location == "responses.raw#/properties/f"));
}

#[test]
fn dangling_reference_is_reported() {
    let schema = contract(
        single_query("x", json!({"$ref": "#/definitions/Nope"})),
        json!({"x": {"type": "string"}}),
    );
    assert!(matches!(compile("IX", "", &schema), Err(GenError::UnresolvedReference { .. })));
}

#[test]
fn interface_must_be_an_identifier() {
    let schema = cw20();
    assert!(matches!(compile("my iface", "", &schema), Err(GenError::InvalidConfig(_))));
    assert!(matches!(compile("", "", &schema), Err(GenError::InvalidConfig(_))));
    assert!(matches!(compile("Q", "", &schema), Err(GenError::InvalidConfig(_))));
}

// --------------------------------- Recursion -------------------------------- //

#[test]
fn recursive_response_is_boxed() {
    let schema = contract(
        single_query("tree", json!({"type": "object"})),
        json!({"tree": {
            "$ref": "#/definitions/Node",
            "definitions": {"Node": {
                "type": "object",
                "required": ["children"],
                "properties": {
                    "children": {"type": "array", "items": {"$ref": "#/definitions/Node"}},
                    "parent": {"anyOf": [{"$ref": "#/definitions/Node"}, {"type": "null"}]}
                }
            }}
        }}),
    );
    let src = generate("ITree", "", &schema).unwrap();
    syn::parse_file(&src).unwrap();
    assert!(src.contains("pub children: ::std::vec::Vec<::std::boxed::Box<Node>>"));
    assert!(src.contains("::core::option::Option<::std::boxed::Box<Node>>"));
}

#[test]
fn response_cycle_without_a_declaration_is_an_error() {
    let schema = contract(
        single_query("nested", json!({"type": "object"})),
        json!({"nested": {
            "$ref": "#/definitions/Nested",
            "definitions": {"Nested": {"type": "array", "items": {"$ref": "#/definitions/Nested"}}}
        }}),
    );
    let err = generate("INested", "", &schema).unwrap_err();
    assert!(matches!(err, GenError::UnsupportedSchemaConstruct { .. }), "{err}");
}
