//! Support types that generated clients link against.
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("contract query failed: {0}")]
    Transport(String),

    #[error("failed to encode or decode query payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Smart-query capability injected into generated contract clients:
/// send `request` to the contract at `contract_address`, return the raw response.
#[allow(async_fn_in_trait)]
pub trait WasmQuery {
    async fn query_smart(&self, contract_address: &str, request: Vec<u8>) -> Result<Vec<u8>, QueryError>;
}

impl<T: WasmQuery + ?Sized> WasmQuery for &T {
    async fn query_smart(&self, contract_address: &str, request: Vec<u8>) -> Result<Vec<u8>, QueryError> {
        (**self).query_smart(contract_address, request).await
    }
}

/// A string boxed so it can sit in a merged-variant member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringWrapper(pub String);

impl StringWrapper {
    pub fn into_inner(self) -> String { self.0 }
}

impl Deref for StringWrapper {
    type Target = str;
    fn deref(&self) -> &str { &self.0 }
}

impl From<String> for StringWrapper {
    fn from(value: String) -> Self { Self(value) }
}

impl From<&str> for StringWrapper {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

impl fmt::Display for StringWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
