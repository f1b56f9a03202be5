//! Mapper errors.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapperError {
    /// A codec was used before `contextualize` bound it to a field type.
    #[error("{0} not initialized: decode called before binding to a field type")]
    NotInitialized(&'static str),
    #[error("field `{field}` of `{object}` declares no generic argument to bind")]
    UnboundGeneric { object: &'static str, field: String },
    #[error("missing field `{field}` in `{object}`")]
    MissingField { object: &'static str, field: String },
    #[error("unknown field `{field}` in `{object}`")]
    UnknownField { object: &'static str, field: String },
    #[error("expected a JSON object for `{object}`, found {found}")]
    ExpectedObject {
        object: &'static str,
        found: &'static str,
    },
    #[error("type mismatch: expected `{expected}`")]
    TypeMismatch { expected: &'static str },
    /// Encoding or decoding of an inner value failed. Passed through as is.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// JSON kind name used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_kind_names() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([1])), "array");
        assert_eq!(json_kind(&json!({})), "object");
        assert_eq!(json_kind(&json!("s")), "string");
    }

    #[test]
    fn json_error_is_transparent() {
        let inner = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let message = inner.to_string();
        let err = MapperError::from(inner);
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn not_initialized_message() {
        let err = MapperError::NotInitialized("TriStateDecoder");
        assert!(err.to_string().starts_with("TriStateDecoder not initialized"));
    }
}
