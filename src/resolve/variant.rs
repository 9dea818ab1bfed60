// Merged variants: a heterogeneous `oneOf` received as one record with one
// nullable member per branch.
use super::Resolver;
use crate::error::GenError;
use crate::graph::NodeId;
use crate::ir::{CandidateType, DeclKind, Primitive, TypeRef, VariantMember};
use crate::registry::Position;

const UNKEYED: &str = "Value";

impl Resolver<'_> {
    pub(super) fn merged_variant(&mut self, id: NodeId, position: Position) -> Result<CandidateType, GenError> {
        self.declare(id, position, |this| {
            let graph = this.graph;
            let node = graph.node(id);
            let mut variants: Vec<VariantMember> = Vec::with_capacity(node.one_of.len());
            for &branch in &node.one_of {
                let schema = graph.node(branch);
                let (key, ty) = match schema.properties.len() {
                    0 => (UNKEYED.to_string(), this.merge(branch, position)?),
                    1 => {
                        let (key, &child) = schema.properties.first()
                            .ok_or_else(|| GenError::unsupported(&schema.location, "empty branch"))?;
                        (key.clone(), this.merge(child, position)?)
                    }
                    n => {
                        return Err(GenError::unsupported(
                            &schema.location,
                            format!("merged variant branch declares {n} properties"),
                        ));
                    }
                };
                let ty = box_primitive(ty, &schema.location)?;
                let key = unique_key(&variants, key);
                variants.push(VariantMember {
                    key,
                    ty: ty.into_nullable(),
                    description: schema.description.clone(),
                });
            }
            Ok(DeclKind::MergedVariant { variants })
        })
    }
}

/// Bare strings get wrapped; other bare primitives cannot stand alone as a
/// member yet. Nullable primitives pass through.
fn box_primitive(ty: CandidateType, location: &str) -> Result<CandidateType, GenError> {
    if ty.nullable {
        return Ok(ty);
    }
    match ty.reference {
        TypeRef::Primitive { primitive: Primitive::String } => {
            Ok(CandidateType::new(TypeRef::Wrapper { primitive: Primitive::String }))
        }
        TypeRef::Primitive { primitive: primitive @ (Primitive::Integer | Primitive::Number | Primitive::Bool) } => {
            Err(GenError::unsupported(
                location,
                format!("`{}` member of a merged variant", primitive.label()),
            ))
        }
        _ => Ok(ty),
    }
}

fn unique_key(existing: &[VariantMember], key: String) -> String {
    let taken = |k: &str| existing.iter().any(|v| v.key == k);
    if !taken(&key) {
        return key;
    }
    let mut i = 1;
    loop {
        let candidate = format!("{key}{i}");
        if !taken(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
