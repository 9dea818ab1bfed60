// Strongly-typed IR between resolution and emission. No serde_json::Value here.
use std::fmt;
use serde::Serialize;

use crate::graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Bool,
    Integer,
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Primitive { primitive: Primitive },
    /// A generated declaration. `boxed` marks a back-edge into a declaration
    /// still under construction (recursive schema).
    Named { name: String, boxed: bool },
    Array { element: Box<CandidateType> },
    /// Object without declared properties.
    Opaque,
    /// A primitive boxed for use as a merged-variant member.
    Wrapper { primitive: Primitive },
}

/// The result of resolving one schema alternative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateType {
    pub reference: TypeRef,
    pub nullable: bool,
}

impl CandidateType {
    pub fn new(reference: TypeRef) -> Self {
        Self { reference, nullable: false }
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(TypeRef::Primitive { primitive })
    }

    pub fn named(name: impl Into<String>, boxed: bool) -> Self {
        Self::new(TypeRef::Named { name: name.into(), boxed })
    }

    pub fn array(element: CandidateType) -> Self {
        Self::new(TypeRef::Array { element: Box::new(element) })
    }

    pub fn into_nullable(self) -> Self {
        Self { nullable: true, ..self }
    }

    /// Snake-ish tag used to tell overloads apart (`asset_info`, `string_list`).
    pub fn label(&self) -> String {
        match &self.reference {
            TypeRef::Primitive { primitive } => primitive.label().to_string(),
            TypeRef::Named { name, .. } => crate::naming::to_field_name(name),
            TypeRef::Array { element } => format!("{}_list", element.label()),
            TypeRef::Opaque => "object".to_string(),
            TypeRef::Wrapper { primitive } => format!("{}_wrapper", primitive.label()),
        }
    }
}

impl Primitive {
    pub fn label(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Integer => "int",
            Primitive::Number => "double",
            Primitive::String => "string",
        }
    }
}

/// Language-neutral notation: `string?`, `Addr[]`, `object`.
impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            TypeRef::Primitive { primitive } => f.write_str(primitive.label())?,
            TypeRef::Named { name, .. } => f.write_str(name)?,
            TypeRef::Array { element } => write!(f, "{element}[]")?,
            TypeRef::Opaque => f.write_str("object")?,
            TypeRef::Wrapper { primitive } => write!(f, "{}Wrapper", crate::naming::to_type_name(primitive.label()))?,
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

// ----------------------------- Declarations ------------------------------- //

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTypeDecl {
    /// Unique within the output namespace.
    pub name: String,
    pub node: NodeId,
    pub description: Option<String>,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    /// Reserved slot whose members are still being resolved.
    Pending,
    Object { fields: Vec<ObjectField> },
    Enumeration { members: Vec<EnumMember> },
    MergedVariant { variants: Vec<VariantMember> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectField {
    /// Key as it appears on the wire.
    pub key: String,
    pub ty: CandidateType,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumMember {
    /// Sanitized identifier.
    pub name: String,
    /// The literal it (de)serializes as.
    pub value: String,
    pub description: Option<String>,
}

/// "Exactly one of these is populated."
#[derive(Debug, Clone, Serialize)]
pub struct VariantMember {
    /// Wire key: the branch's single property, or `Value`.
    pub key: String,
    /// Always nullable.
    pub ty: CandidateType,
    pub description: Option<String>,
}

// ------------------------------- Functions -------------------------------- //

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    /// `FooBarAsync`
    pub name: String,
    /// `foo_bar`, the key under which the request is sent.
    pub operation: String,
    pub parameters: Vec<Parameter>,
    pub return_type: CandidateType,
    pub description: Option<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    /// Schema key.
    pub name: String,
    pub ty: CandidateType,
    pub has_default: bool,
    /// How many candidate types this parameter had; > 1 means it was split.
    pub alternatives: usize,
}

/// Primitive body steps, rendered by the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Statement {
    /// Start an empty argument accumulator.
    BeginRequest,
    /// `arguments[key] = serialize(parameter)`
    InsertArgument { key: String, parameter: String },
    /// Wrap the accumulator as `{operation: arguments}` and encode to bytes.
    SerializeRequest { operation: String },
    /// Call the injected query capability with the contract address and request bytes.
    InvokeQuery,
    DeserializeResponse { ty: CandidateType },
    Return,
}

impl FunctionSpec {
    /// Parameters that were produced by splitting.
    pub fn split_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.alternatives > 1)
    }

    pub fn signature(&self) -> String {
        let params = self.parameters.iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params}) -> {}", self.name, self.return_type)
    }
}

// ------------------------------- Contract --------------------------------- //

/// Everything one compilation produces, before rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ContractIr {
    pub contract_name: String,
    pub contract_version: String,
    pub namespace: String,
    pub interface: String,
    pub implementation: String,
    /// First-encountered traversal order.
    pub declarations: Vec<GeneratedTypeDecl>,
    /// Query branch order; overloads of one operation are adjacent.
    pub functions: Vec<FunctionSpec>,
}

impl ContractIr {
    pub fn declaration(&self, name: &str) -> Option<&GeneratedTypeDecl> {
        self.declarations.iter().find(|d| d.name == name)
    }

    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FunctionSpec> + 'a {
        self.functions.iter().filter(move |f| f.name == name)
    }
}
