//! Rust source emitter.
//!
//! Builds token streams with `quote`, then parses the whole file with `syn`
//! and pretty-prints it. Generated code only names items through absolute
//! paths (`::core::option::Option`, `::serde_json::Map`, the runtime path),
//! so a schema declaring `Result` or `String` cannot shadow what the
//! generated bodies rely on.
use std::collections::{HashMap, HashSet};

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use tracing::debug;

use super::Emitter;
use crate::config::GenerateOptions;
use crate::error::GenError;
use crate::ir::{
    CandidateType, EnumMember, FunctionSpec, ObjectField, Primitive, Statement, TypeRef, VariantMember,
};
use crate::naming;

pub const HEADER: &str = "// @generated by wasm-schema-gen. Do not edit by hand.";

/// Generic parameter of the container; schema declarations must not use it.
pub const QUERIER_PARAM: &str = "Q";

pub struct RustEmitter {
    options: GenerateOptions,
    /// Module segments the output is wrapped in.
    modules: Vec<String>,
    runtime: syn::Path,
    items: Vec<TokenStream>,
}

impl RustEmitter {
    /// `namespace` may use `::` or `.` separators; empty means no wrapping.
    pub fn new(namespace: &str, options: &GenerateOptions) -> Result<Self, GenError> {
        let runtime = syn::parse_str::<syn::Path>(&options.runtime_path).map_err(|e| {
            GenError::InvalidConfig(format!("runtime-path `{}`: {e}", options.runtime_path))
        })?;
        let modules = namespace
            .split("::")
            .flat_map(|s| s.split('.'))
            .filter(|s| !s.trim().is_empty())
            .map(naming::to_field_name)
            .collect();
        Ok(Self { options: options.clone(), modules, runtime, items: Vec::new() })
    }

    fn type_tokens(&self, ty: &CandidateType) -> Result<TokenStream, GenError> {
        let inner = match &ty.reference {
            TypeRef::Primitive { primitive } => primitive_tokens(*primitive),
            TypeRef::Named { name, boxed } => {
                let ident = ident(name)?;
                if *boxed {
                    quote! { ::std::boxed::Box<#ident> }
                } else {
                    quote! { #ident }
                }
            }
            TypeRef::Array { element } => {
                let element = self.type_tokens(element)?;
                quote! { ::std::vec::Vec<#element> }
            }
            TypeRef::Opaque => quote! { ::serde_json::Value },
            TypeRef::Wrapper { primitive: Primitive::String } => {
                let runtime = &self.runtime;
                quote! { #runtime::StringWrapper }
            }
            TypeRef::Wrapper { primitive } => {
                return Err(GenError::EmitFailed(format!("no wrapper type for `{}`", primitive.label())));
            }
        };
        Ok(if ty.nullable { optional(inner) } else { inner })
    }

    /// (trait declaration, impl definition) for one function.
    fn method(&self, function: &FunctionSpec, method: &Ident) -> Result<(TokenStream, TokenStream), GenError> {
        let runtime = &self.runtime;
        let docs = doc_attrs(function.description.as_deref());
        let return_type = self.type_tokens(&function.return_type)?;

        let mut idents = UniqueIdents::reserving(&["self"]);
        let parameters = function.parameters.iter()
            .map(|p| idents.next(&naming::to_field_name(&p.name)))
            .collect::<Result<Vec<_>, GenError>>()?;
        let args = function.parameters.iter()
            .zip(&parameters)
            .map(|(p, ident)| {
                let ty = self.type_tokens(&p.ty)?;
                Ok(quote! { #ident: #ty })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        let by_key: HashMap<&str, &Ident> = function.parameters.iter()
            .map(|p| p.name.as_str())
            .zip(&parameters)
            .collect();
        let has_arguments = function.body.iter().any(|s| matches!(s, Statement::InsertArgument { .. }));
        let mut body = Vec::with_capacity(function.body.len());
        for statement in &function.body {
            body.push(match statement {
                Statement::BeginRequest if has_arguments => quote! {
                    let mut __arguments = ::serde_json::Map::new();
                },
                Statement::BeginRequest => quote! {
                    let __arguments = ::serde_json::Map::new();
                },
                Statement::InsertArgument { key, parameter } => {
                    let ident = by_key.get(parameter.as_str()).ok_or_else(|| {
                        GenError::EmitFailed(format!("`{}` has no parameter `{parameter}`", function.name))
                    })?;
                    quote! {
                        __arguments.insert(#key.to_string(), ::serde_json::to_value(&#ident)?);
                    }
                }
                Statement::SerializeRequest { operation } => quote! {
                    let mut __body = ::serde_json::Map::new();
                    __body.insert(#operation.to_string(), ::serde_json::Value::Object(__arguments));
                    let __request = ::serde_json::to_vec(&__body)?;
                },
                Statement::InvokeQuery => quote! {
                    let __response = #runtime::WasmQuery::query_smart(&self.querier, &self.contract_address, __request).await?;
                },
                Statement::DeserializeResponse { ty } => {
                    let ty = self.type_tokens(ty)?;
                    quote! {
                        let __decoded: #ty = ::serde_json::from_slice(&__response)?;
                    }
                }
                Statement::Return => quote! {
                    ::core::result::Result::Ok(__decoded)
                },
            });
        }

        let signature = quote! {
            async fn #method(&self, #(#args),*) -> ::core::result::Result<#return_type, #runtime::QueryError>
        };
        let declaration = quote! {
            #(#docs)*
            #signature;
        };
        let definition = quote! {
            #signature {
                #(#body)*
            }
        };
        Ok((declaration, definition))
    }
}

impl Emitter for RustEmitter {
    fn declare_object(&mut self, name: &str, description: Option<&str>, fields: &[ObjectField]) -> Result<(), GenError> {
        let ident = ident(name)?;
        let docs = doc_attrs(description);
        let mut idents = UniqueIdents::default();
        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let member = idents.next(&naming::to_field_name(&field.key))?;
            let key = &field.key;
            let field_docs = doc_attrs(field.description.as_deref());
            let ty = self.type_tokens(&field.ty)?;
            members.push(if field.ty.nullable {
                quote! {
                    #(#field_docs)*
                    #[serde(rename = #key, default, skip_serializing_if = "::core::option::Option::is_none")]
                    pub #member: #ty,
                }
            } else if !field.required {
                let ty = optional(ty);
                quote! {
                    #(#field_docs)*
                    #[serde(rename = #key, default, skip_serializing_if = "::core::option::Option::is_none")]
                    pub #member: #ty,
                }
            } else {
                quote! {
                    #(#field_docs)*
                    #[serde(rename = #key)]
                    pub #member: #ty,
                }
            });
        }
        self.items.push(quote! {
            #(#docs)*
            #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            pub struct #ident {
                #(#members)*
            }
        });
        Ok(())
    }

    fn declare_enumeration(&mut self, name: &str, description: Option<&str>, members: &[EnumMember]) -> Result<(), GenError> {
        let ident = ident(name)?;
        let docs = doc_attrs(description);
        let mut idents = UniqueIdents::default();
        let mut variants = Vec::with_capacity(members.len());
        for member in members {
            let variant = idents.next(&member.name)?;
            let value = &member.value;
            let member_docs = doc_attrs(member.description.as_deref());
            variants.push(quote! {
                #(#member_docs)*
                #[serde(rename = #value)]
                #variant,
            });
        }
        self.items.push(quote! {
            #(#docs)*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
            pub enum #ident {
                #(#variants)*
            }
        });
        Ok(())
    }

    fn declare_merged_variant(&mut self, name: &str, description: Option<&str>, variants: &[VariantMember]) -> Result<(), GenError> {
        let ident = ident(name)?;
        let docs = doc_attrs(description);
        let mut idents = UniqueIdents::default();
        let mut members = Vec::with_capacity(variants.len());
        for variant in variants {
            let member = idents.next(&naming::to_field_name(&variant.key))?;
            let key = &variant.key;
            let member_docs = doc_attrs(variant.description.as_deref());
            let ty = self.type_tokens(&variant.ty)?;
            let ty = if variant.ty.nullable { ty } else { optional(ty) };
            members.push(quote! {
                #(#member_docs)*
                #[serde(rename = #key, default, skip_serializing_if = "::core::option::Option::is_none")]
                pub #member: #ty,
            });
        }
        self.items.push(quote! {
            #(#docs)*
            /// Exactly one member is populated.
            #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            pub struct #ident {
                #(#members)*
            }
        });
        Ok(())
    }

    fn declare_contract(&mut self, interface: &str, implementation: &str, functions: &[FunctionSpec]) -> Result<(), GenError> {
        let runtime = &self.runtime;
        let interface = ident(interface)?;
        let implementation = ident(implementation)?;
        let q = ident(QUERIER_PARAM)?;

        let names = method_names(functions)?;
        let mut declarations = Vec::with_capacity(functions.len());
        let mut definitions = Vec::with_capacity(functions.len());
        for (function, method) in functions.iter().zip(&names) {
            let (declaration, definition) = self.method(function, method)?;
            declarations.push(declaration);
            definitions.push(definition);
        }
        debug!(interface = %interface, methods = names.len(), "rendered contract");

        self.items.push(quote! {
            #[allow(async_fn_in_trait)]
            pub trait #interface {
                #(#declarations)*
            }

            pub struct #implementation<#q> {
                querier: #q,
                contract_address: ::std::string::String,
            }

            impl<#q> #implementation<#q> {
                pub fn new(querier: #q, contract_address: impl ::core::convert::Into<::std::string::String>) -> Self {
                    Self { querier, contract_address: contract_address.into() }
                }

                pub fn contract_address(&self) -> &str {
                    &self.contract_address
                }

                pub fn querier(&self) -> &#q {
                    &self.querier
                }
            }

            impl<#q: #runtime::WasmQuery> #interface for #implementation<#q> {
                #(#definitions)*
            }
        });
        Ok(())
    }

    fn finish(self) -> Result<String, GenError> {
        let items = &self.items;
        let mut tokens = quote! { #(#items)* };
        if self.options.wrap_namespace {
            for module in self.modules.iter().rev() {
                let module = ident(module)?;
                tokens = quote! {
                    pub mod #module {
                        #tokens
                    }
                };
            }
        }
        let source = format_generated_code(&tokens)?;
        Ok(if self.options.emit_header {
            format!("{HEADER}\n\n{source}")
        } else {
            source
        })
    }
}

// ---------------------------------- Helpers ---------------------------------- //

/// Parses `tokens` as a file and pretty-prints it.
pub fn format_generated_code(tokens: &TokenStream) -> Result<String, GenError> {
    let file = syn::parse2::<syn::File>(tokens.clone()).map_err(|e| GenError::EmitFailed(e.to_string()))?;
    Ok(prettyplease::unparse(&file))
}

/// A valid identifier for `name`: raw form for keywords, `_` suffix for the
/// keywords that have no raw form.
pub fn ident(name: &str) -> Result<Ident, GenError> {
    if naming::is_keyword(name) {
        return Ok(if naming::is_raw_capable(name) {
            Ident::new_raw(name, Span::call_site())
        } else {
            format_ident!("{name}_")
        });
    }
    syn::parse_str::<Ident>(name).map_err(|_| GenError::EmitFailed(format!("`{name}` is not a valid identifier")))
}

fn primitive_tokens(primitive: Primitive) -> TokenStream {
    match primitive {
        Primitive::Bool => quote! { bool },
        Primitive::Integer => quote! { i64 },
        Primitive::Number => quote! { f64 },
        Primitive::String => quote! { ::std::string::String },
    }
}

fn optional(ty: TokenStream) -> TokenStream {
    quote! { ::core::option::Option<#ty> }
}

fn doc_attrs(text: Option<&str>) -> Vec<TokenStream> {
    text.into_iter()
        .flat_map(str::lines)
        .map(|line| {
            let line = format!(" {}", line.trim_end());
            quote! { #[doc = #line] }
        })
        .collect()
}

/// snake_case method per function; members of an overload set are suffixed
/// with the labels of their split parameters, then deduplicated with an index.
fn method_names(functions: &[FunctionSpec]) -> Result<Vec<Ident>, GenError> {
    let mut set_sizes: HashMap<&str, usize> = HashMap::new();
    for f in functions {
        *set_sizes.entry(f.name.as_str()).or_default() += 1;
    }
    let mut idents = UniqueIdents::reserving(&["new", "contract_address", "querier"]);
    functions.iter()
        .map(|f| {
            let mut name = naming::to_field_name(&f.name);
            if set_sizes[f.name.as_str()] > 1 {
                for p in f.split_parameters() {
                    name.push('_');
                    name.push_str(&p.ty.label());
                }
            }
            idents.next(&name)
        })
        .collect()
}

/// Hands out identifiers, appending `_1`, `_2`, ... on collision.
#[derive(Default)]
struct UniqueIdents {
    taken: HashSet<String>,
}

impl UniqueIdents {
    fn reserving(names: &[&str]) -> Self {
        Self { taken: names.iter().map(|n| n.to_string()).collect() }
    }

    fn next(&mut self, base: &str) -> Result<Ident, GenError> {
        let mut candidate = base.to_string();
        let mut i = 1;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}_{i}");
            i += 1;
        }
        ident(&candidate)
    }
}
