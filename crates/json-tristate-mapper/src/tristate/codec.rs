use std::fmt;
use std::sync::Arc;

use json_tristate::{Presence, TriState};
use serde_json::Value;
use tracing::trace;

use crate::codec::{FieldContext, ValueDecoder, ValueEncoder};
use crate::error::MapperError;
use crate::mapped::FieldValue;
use crate::type_token::{Erased, TypeToken};

/// Writes `TriState` fields: nothing for `Absent`, `null` for `Null`, the
/// payload for `Value`.
///
/// The payload goes through the encoder resolved for the payload type, so a
/// `TriState` of an object type writes the object through its own schema.
#[derive(Default, Clone)]
pub struct TriStateEncoder {
    payload: Option<Arc<dyn ValueEncoder>>,
}

impl fmt::Debug for TriStateEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriStateEncoder")
            .field("bound", &self.payload.is_some())
            .finish()
    }
}

impl TriStateEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound(&self) -> bool {
        self.payload.is_some()
    }
}

impl ValueEncoder for TriStateEncoder {
    fn contextualize(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueEncoder>, MapperError> {
        let payload = field.binding(0)?;
        Ok(Arc::new(TriStateEncoder {
            payload: Some(field.resolver.encoder(&payload)?),
        }))
    }

    fn encode(&self, value: &dyn FieldValue) -> Result<Option<Value>, MapperError> {
        match value.presence() {
            Presence::Absent => Ok(None),
            Presence::Null => Ok(Some(Value::Null)),
            Presence::Value => {
                let encoder = self
                    .payload
                    .as_ref()
                    .ok_or(MapperError::NotInitialized("TriStateEncoder"))?;
                let payload = value.payload().ok_or(MapperError::TypeMismatch {
                    expected: "json_tristate::TriState",
                })?;
                encoder.encode(payload)
            }
        }
    }

    fn is_empty(&self, value: &dyn FieldValue) -> bool {
        value.presence() != Presence::Value
    }
}

/// Reads `TriState` fields.
///
/// The registered instance is an unbound prototype.
/// [`contextualize`](ValueDecoder::contextualize) returns a new decoder bound
/// to the field's payload type and that type's decoder; the prototype itself
/// never changes.
#[derive(Default, Clone)]
pub struct TriStateDecoder {
    bound: Option<TypeToken>,
    payload: Option<Arc<dyn ValueDecoder>>,
}

impl fmt::Debug for TriStateDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriStateDecoder")
            .field("bound", &self.bound)
            .finish()
    }
}

impl TriStateDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload type this decoder is bound to, if any.
    pub fn bound_type(&self) -> Option<&TypeToken> {
        self.bound.as_ref()
    }

    fn payload(&self) -> Result<&Arc<dyn ValueDecoder>, MapperError> {
        self.payload
            .as_ref()
            .ok_or(MapperError::NotInitialized("TriStateDecoder"))
    }
}

impl ValueDecoder for TriStateDecoder {
    fn contextualize(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueDecoder>, MapperError> {
        let payload = field.binding(0)?;
        trace!(
            object = field.object,
            field = field.field,
            payload = payload.declared.name(),
            "bound tri-state decoder"
        );
        Ok(Arc::new(TriStateDecoder {
            bound: Some(payload.declared.clone()),
            payload: Some(field.resolver.decoder(&payload)?),
        }))
    }

    fn decode(&self, value: &Value) -> Result<Erased, MapperError> {
        let payload = self.payload()?.decode(value)?;
        Ok(Box::new(TriState::Value(payload)))
    }

    fn absent_value(&self) -> Option<Erased> {
        Some(Box::new(TriState::<Erased>::Absent))
    }

    fn null_value(&self) -> Result<Erased, MapperError> {
        Ok(Box::new(TriState::<Erased>::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecResolver;
    use crate::config::MapperConfig;
    use crate::mapped::Mapped;
    use serde_json::json;

    fn field<'a>(token: &'a TypeToken, resolver: &'a CodecResolver<'a>) -> FieldContext<'a> {
        FieldContext {
            object: "Test",
            field: "f",
            declared: token,
            resolver,
        }
    }

    fn decoder<T: Mapped>() -> Arc<dyn ValueDecoder> {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = <TriState<T> as Mapped>::type_token();
        TriStateDecoder::new()
            .contextualize(&field(&token, &resolver))
            .unwrap()
    }

    fn encoder<T: Mapped>() -> Arc<dyn ValueEncoder> {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = <TriState<T> as Mapped>::type_token();
        TriStateEncoder::new()
            .contextualize(&field(&token, &resolver))
            .unwrap()
    }

    #[test]
    fn encodes_each_variant() {
        let encoder = encoder::<String>();
        assert_eq!(encoder.encode(&TriState::<String>::Absent).unwrap(), None);
        assert_eq!(encoder.encode(&TriState::<String>::Null).unwrap(), Some(Value::Null));
        assert_eq!(
            encoder.encode(&TriState::Value("test".to_string())).unwrap(),
            Some(json!("test"))
        );
    }

    #[test]
    fn unbound_encoder_still_writes_absent_and_null() {
        let encoder = TriStateEncoder::new();
        assert!(!encoder.is_bound());
        assert_eq!(encoder.encode(&TriState::<u8>::Absent).unwrap(), None);
        assert_eq!(encoder.encode(&TriState::<u8>::Null).unwrap(), Some(Value::Null));
        let err = encoder.encode(&TriState::Value(1u8)).unwrap_err();
        assert!(matches!(err, MapperError::NotInitialized("TriStateEncoder")));
    }

    #[test]
    fn absent_and_null_are_empty() {
        let encoder = TriStateEncoder::new();
        assert!(encoder.is_empty(&TriState::<u8>::Absent));
        assert!(encoder.is_empty(&TriState::<u8>::Null));
        assert!(!encoder.is_empty(&TriState::Value(0u8)));
    }

    #[test]
    fn unbound_decoder_fails_fast() {
        let decoder = TriStateDecoder::new();
        assert!(decoder.bound_type().is_none());
        let err = decoder.decode(&json!("test")).unwrap_err();
        assert!(matches!(err, MapperError::NotInitialized("TriStateDecoder")));
    }

    #[test]
    fn contextualize_leaves_prototype_unbound() {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let prototype = TriStateDecoder::new();
        let token = <TriState<String> as Mapped>::type_token();
        prototype.contextualize(&field(&token, &resolver)).unwrap();
        assert!(prototype.bound_type().is_none());
    }

    #[test]
    fn contextualize_requires_a_binding() {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = TypeToken::of::<u8>();
        let err = TriStateDecoder::new()
            .contextualize(&field(&token, &resolver))
            .err()
            .unwrap();
        assert!(matches!(err, MapperError::UnboundGeneric { ref field, .. } if field == "f"));
        let err = TriStateEncoder::new()
            .contextualize(&field(&token, &resolver))
            .err()
            .unwrap();
        assert!(matches!(err, MapperError::UnboundGeneric { .. }));
    }

    #[test]
    fn decodes_into_each_variant() {
        let decoder = decoder::<String>();
        let value = decoder.decode(&json!("test")).unwrap();
        assert_eq!(
            <TriState<String> as Mapped>::from_erased(value).unwrap(),
            TriState::Value("test".to_string())
        );

        let null = decoder.null_value().unwrap();
        assert_eq!(<TriState<String> as Mapped>::from_erased(null).unwrap(), TriState::Null);

        let empty = decoder.empty_value().unwrap();
        assert_eq!(<TriState<String> as Mapped>::from_erased(empty).unwrap(), TriState::Null);

        let absent = decoder.absent_value().unwrap();
        assert_eq!(<TriState<String> as Mapped>::from_erased(absent).unwrap(), TriState::Absent);
    }

    #[test]
    fn nested_tri_state_keeps_inner_null() {
        let decoder = decoder::<TriState<u8>>();
        let value = decoder.decode(&json!(7)).unwrap();
        assert_eq!(
            <TriState<TriState<u8>> as Mapped>::from_erased(value).unwrap(),
            TriState::Value(TriState::Value(7))
        );
    }

    #[test]
    fn payload_errors_propagate_unchanged() {
        let err = decoder::<u32>().decode(&json!("not a number")).unwrap_err();
        assert!(matches!(err, MapperError::Json(_)));
    }
}
