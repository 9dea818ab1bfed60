//! Code emission: the abstract declarations of a [`ContractIr`] handed to a
//! target-language [`Emitter`].
//!
//! The driver walks declarations in registry order, then hands over the
//! container with every synthesized function. Emitters own all textual
//! decisions (identifier casing, overload naming, formatting).
pub mod rust;

use crate::error::GenError;
use crate::ir::{ContractIr, DeclKind, EnumMember, FunctionSpec, ObjectField, VariantMember};

pub use rust::RustEmitter;

pub trait Emitter {
    fn declare_object(&mut self, name: &str, description: Option<&str>, fields: &[ObjectField]) -> Result<(), GenError>;

    fn declare_enumeration(&mut self, name: &str, description: Option<&str>, members: &[EnumMember]) -> Result<(), GenError>;

    fn declare_merged_variant(&mut self, name: &str, description: Option<&str>, variants: &[VariantMember]) -> Result<(), GenError>;

    /// The interface, the container implementing it, and every function in
    /// branch order (overloads of one operation adjacent).
    fn declare_contract(&mut self, interface: &str, implementation: &str, functions: &[FunctionSpec]) -> Result<(), GenError>;

    /// Rendered source text.
    fn finish(self) -> Result<String, GenError>;
}

/// Feed every declaration and the contract surface of `ir` to `emitter`.
pub fn emit<E: Emitter>(ir: &ContractIr, emitter: &mut E) -> Result<(), GenError> {
    for decl in &ir.declarations {
        let description = decl.description.as_deref();
        match &decl.kind {
            DeclKind::Object { fields } => emitter.declare_object(&decl.name, description, fields)?,
            DeclKind::Enumeration { members } => emitter.declare_enumeration(&decl.name, description, members)?,
            DeclKind::MergedVariant { variants } => {
                emitter.declare_merged_variant(&decl.name, description, variants)?
            }
            DeclKind::Pending => {
                return Err(GenError::EmitFailed(format!("declaration `{}` was never completed", decl.name)));
            }
        }
    }
    emitter.declare_contract(&ir.interface, &ir.implementation, &ir.functions)
}
