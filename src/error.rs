//! Error kinds for a single contract compilation.
//!
//! Every variant is fatal: `generate` never returns partially emitted source.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// The node's shape matches none of the recognised resolver cases.
    #[error("unsupported schema construct at {location}: {reason}")]
    UnsupportedSchemaConstruct {
        location: String,
        reason: String,
    },

    /// A query operation has no entry in the `responses` map.
    #[error("query operation `{operation}` has no response schema")]
    MissingResponseSchema {
        operation: String,
    },

    /// A query (or merged-variant) branch must declare exactly one property.
    #[error("malformed operation schema at {location}: expected exactly one property, found {found}")]
    MalformedOperationSchema {
        location: String,
        found: usize,
    },

    /// `$ref` pointing outside the document or at nothing.
    #[error("unresolved schema reference `{reference}` at {location}")]
    UnresolvedReference {
        location: String,
        reference: String,
    },

    #[error("invalid contract schema document at {path}: {message}")]
    InvalidDocument {
        path: String,
        message: String,
    },

    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// The emitter produced tokens that do not form a valid source file.
    #[error("failed to render generated source: {0}")]
    EmitFailed(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub(crate) fn unsupported(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedSchemaConstruct {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
