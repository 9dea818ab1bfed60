// Rendering options, loadable from a TOML file.
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::GenError;

pub const DEFAULT_RUNTIME_PATH: &str = "::wasm_schema_gen::runtime";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GenerateOptions {
    /// Path generated code uses to reach `WasmQuery`, `QueryError` and `StringWrapper`.
    pub runtime_path: String,
    /// Prefix the output with a `// @generated` line.
    pub emit_header: bool,
    /// Wrap declarations in `pub mod` blocks named after the namespace.
    pub wrap_namespace: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            emit_header: true,
            wrap_namespace: true,
        }
    }
}

impl GenerateOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, GenError> {
        let options: Self = toml::from_str(text).map_err(|e| GenError::InvalidConfig(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GenError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), GenError> {
        if syn::parse_str::<syn::Path>(&self.runtime_path).is_err() {
            return Err(GenError::InvalidConfig(format!(
                "runtime-path `{}` is not a Rust path",
                self.runtime_path
            )));
        }
        Ok(())
    }
}
