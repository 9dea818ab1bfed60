use serde::de::DeserializeOwned;
use crate::error::GenError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, GenError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_document_error)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, GenError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_document_error)
}

fn into_document_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> GenError {
    let path = err.path().to_string();
    GenError::InvalidDocument { path, message: err.into_inner().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractSchema;

    #[test]
    fn reports_the_failing_field_path() {
        let src = r#"{"contract_name": 7, "contract_version": "1", "idl_version": "1", "query": {}}"#;
        let err = from_str_with_path::<ContractSchema>(src).unwrap_err();
        match err {
            GenError::InvalidDocument { path, .. } => assert_eq!(path, "contract_name"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
