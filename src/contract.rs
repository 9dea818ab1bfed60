//! The contract schema document consumed by the generator.
//!
//! Only `query` and `responses` feed code generation; the other message
//! schemas ride along so the document round-trips as contract metadata.
use std::path::Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSchema {
    pub contract_name: String,
    pub contract_version: String,
    #[serde(default)]
    pub idl_version: String,
    #[serde(default)]
    pub instantiate: Option<Value>,
    #[serde(default)]
    pub execute: Option<Value>,
    pub query: Value,
    #[serde(default)]
    pub migrate: Option<Value>,
    #[serde(default)]
    pub sudo: Option<Value>,
    /// Query operation name → response schema, in document order.
    #[serde(default)]
    pub responses: Option<IndexMap<String, Value>>,
}

impl ContractSchema {
    pub fn from_json(src: &str) -> Result<Self, GenError> {
        crate::path_de::from_str_with_path(src)
    }

    pub fn from_value(value: Value) -> Result<Self, GenError> {
        crate::path_de::from_value_with_path(value)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&src)
    }

    /// Response schemas keyed by operation; empty when the document has none.
    pub fn responses(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.responses.iter().flat_map(|map| map.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_message_schemas_and_missing_responses_are_accepted() {
        let doc = json!({
            "contract_name": "cw20-base",
            "contract_version": "1.1.0",
            "idl_version": "1.0.0",
            "instantiate": {"type": "object"},
            "execute": {"oneOf": []},
            "query": {"oneOf": []},
            "migrate": null,
            "sudo": null,
        });
        let schema = ContractSchema::from_value(doc).unwrap();
        assert_eq!(schema.contract_name, "cw20-base");
        assert!(schema.migrate.is_none());
        assert_eq!(schema.responses().count(), 0);
    }

    #[test]
    fn responses_keep_document_order() {
        let doc = json!({
            "contract_name": "c",
            "contract_version": "0.1.0",
            "idl_version": "1.0.0",
            "query": {},
            "responses": {"zeta": {}, "alpha": {}, "mid": {}},
        });
        let schema = ContractSchema::from_value(doc).unwrap();
        let names: Vec<_> = schema.responses().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }
}
