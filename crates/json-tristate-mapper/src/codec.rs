//! Value encoders and decoders, the registry that holds them and the resolver
//! that binds them to fields.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::config::MapperConfig;
use crate::error::MapperError;
use crate::mapped::FieldValue;
use crate::schema::{
    NestedDecoder, NestedEncoder, ObjectSchema, ObjectType, SchemaBuilder, SchemaModifier,
};
use crate::type_token::{Erased, RawType, TypeToken};

/// The field a codec is being bound to.
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
    pub object: &'static str,
    pub field: &'a str,
    pub declared: &'a TypeToken,
    pub resolver: &'a CodecResolver<'a>,
}

impl<'a> FieldContext<'a> {
    /// The same field, declared as its generic argument at `index`.
    pub fn binding(&self, index: usize) -> Result<FieldContext<'a>, MapperError> {
        let declared = self
            .declared
            .binding(index)
            .ok_or_else(|| MapperError::UnboundGeneric {
                object: self.object,
                field: self.field.to_owned(),
            })?;
        Ok(FieldContext { declared, ..*self })
    }
}

impl fmt::Debug for FieldContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldContext")
            .field("object", &self.object)
            .field("field", &self.field)
            .field("declared", &self.declared.name())
            .finish()
    }
}

/// Turns a field value into JSON.
pub trait ValueEncoder: Send + Sync {
    /// Returns an encoder bound to the declared type of `field`. Called once
    /// per field when its schema is built.
    fn contextualize(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueEncoder>, MapperError>;

    /// `Ok(None)` means the encoder produces no output at all.
    fn encode(&self, value: &dyn FieldValue) -> Result<Option<Value>, MapperError>;

    /// Whether `value` counts as empty for [`Inclusion::NonEmpty`](crate::Inclusion).
    fn is_empty(&self, _value: &dyn FieldValue) -> bool {
        false
    }
}

/// Turns JSON into a field value.
///
/// The mapper decides which entry point runs: [`absent_value`] for a missing
/// key, [`null_value`] for `null`, [`empty_value`] for empty input and
/// [`decode`] for anything else.
///
/// [`absent_value`]: ValueDecoder::absent_value
/// [`null_value`]: ValueDecoder::null_value
/// [`empty_value`]: ValueDecoder::empty_value
/// [`decode`]: ValueDecoder::decode
pub trait ValueDecoder: Send + Sync {
    /// Returns a decoder bound to the declared type of `field`. Called once
    /// per field when its schema is built.
    fn contextualize(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueDecoder>, MapperError>;

    fn decode(&self, value: &Value) -> Result<Erased, MapperError>;

    /// Value for a missing key; `None` leaves the field untouched.
    fn absent_value(&self) -> Option<Erased> {
        None
    }

    fn null_value(&self) -> Result<Erased, MapperError> {
        self.decode(&Value::Null)
    }

    fn empty_value(&self) -> Result<Erased, MapperError> {
        self.null_value()
    }
}

/// Encodes with the value's own plain form, serde for plain types.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeEncoder;

impl ValueEncoder for SerdeEncoder {
    fn contextualize(&self, _field: &FieldContext<'_>) -> Result<Arc<dyn ValueEncoder>, MapperError> {
        Ok(Arc::new(SerdeEncoder))
    }

    fn encode(&self, value: &dyn FieldValue) -> Result<Option<Value>, MapperError> {
        value.to_json().map(Some)
    }
}

/// Decodes with the bound type's plain form.
#[derive(Debug, Default, Clone)]
pub struct SerdeDecoder {
    bound: Option<TypeToken>,
}

impl SerdeDecoder {
    pub fn bound_type(&self) -> Option<&TypeToken> {
        self.bound.as_ref()
    }
}

impl ValueDecoder for SerdeDecoder {
    fn contextualize(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueDecoder>, MapperError> {
        Ok(Arc::new(SerdeDecoder {
            bound: Some(field.declared.clone()),
        }))
    }

    fn decode(&self, value: &Value) -> Result<Erased, MapperError> {
        let token = self
            .bound
            .as_ref()
            .ok_or(MapperError::NotInitialized("SerdeDecoder"))?;
        token.decode(value)
    }
}

/// Encoder and decoder prototypes keyed by raw type.
#[derive(Default)]
pub struct CodecRegistry {
    encoders: HashMap<RawType, Arc<dyn ValueEncoder>>,
    decoders: HashMap<RawType, Arc<dyn ValueDecoder>>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("encoders", &self.encoders.keys().collect::<Vec<_>>())
            .field("decoders", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the unbound prototype `encoder` for every type whose raw type
    /// is `raw`, replacing any earlier one.
    pub fn add_encoder(&mut self, raw: RawType, encoder: Arc<dyn ValueEncoder>) {
        self.encoders.insert(raw, encoder);
    }

    /// Registers the unbound prototype `decoder` for `raw`.
    pub fn add_decoder(&mut self, raw: RawType, decoder: Arc<dyn ValueDecoder>) {
        self.decoders.insert(raw, decoder);
    }

    pub fn has_encoder(&self, raw: RawType) -> bool {
        self.encoders.contains_key(&raw)
    }

    pub fn has_decoder(&self, raw: RawType) -> bool {
        self.decoders.contains_key(&raw)
    }

    pub fn encoder(&self, raw: RawType) -> Option<&Arc<dyn ValueEncoder>> {
        self.encoders.get(&raw)
    }

    pub fn decoder(&self, raw: RawType) -> Option<&Arc<dyn ValueDecoder>> {
        self.decoders.get(&raw)
    }
}

/// Binds codecs to fields while schemas are built.
///
/// A registered codec wins; object types get a codec over their own schema,
/// built with the same codecs and modifiers; everything else falls back to
/// the plain serde codec. Nested schemas are built once per resolver.
pub struct CodecResolver<'a> {
    codecs: Option<&'a CodecRegistry>,
    modifiers: &'a [Arc<dyn SchemaModifier>],
    config: &'a MapperConfig,
    nested: RefCell<HashMap<TypeId, Arc<ObjectSchema>>>,
}

impl fmt::Debug for CodecResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecResolver")
            .field("codecs", &self.codecs)
            .field("modifiers", &self.modifiers.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> CodecResolver<'a> {
    pub fn new(
        codecs: &'a CodecRegistry,
        modifiers: &'a [Arc<dyn SchemaModifier>],
        config: &'a MapperConfig,
    ) -> Self {
        Self {
            codecs: Some(codecs),
            modifiers,
            config,
            nested: RefCell::new(HashMap::new()),
        }
    }

    /// A resolver with no registered codecs and no modifiers.
    pub fn plain(config: &'a MapperConfig) -> Self {
        Self {
            codecs: None,
            modifiers: &[],
            config,
            nested: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        self.config
    }

    pub fn encoder(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueEncoder>, MapperError> {
        let token = field.declared;
        if let Some(encoder) = self.codecs.and_then(|c| c.encoder(token.raw())) {
            return encoder.contextualize(field);
        }
        if token.is_object() {
            return Ok(Arc::new(NestedEncoder::new(self.nested_schema(token)?)));
        }
        SerdeEncoder.contextualize(field)
    }

    pub fn decoder(&self, field: &FieldContext<'_>) -> Result<Arc<dyn ValueDecoder>, MapperError> {
        let token = field.declared;
        if let Some(decoder) = self.codecs.and_then(|c| c.decoder(token.raw())) {
            return decoder.contextualize(field);
        }
        if let Some(hooks) = token.object_hooks() {
            let schema = self.nested_schema(token)?;
            return Ok(Arc::new(NestedDecoder::new(schema, hooks.create, self.config.clone())));
        }
        SerdeDecoder::default().contextualize(field)
    }

    /// Builds the schema of `O` and runs every modifier over it.
    pub fn schema<O: ObjectType>(&self) -> Result<ObjectSchema, MapperError> {
        let mut builder = SchemaBuilder::<O>::new(self);
        O::describe(&mut builder);
        let mut schema = builder.finish()?;
        for modifier in self.modifiers {
            schema.apply(modifier.as_ref());
        }
        Ok(schema)
    }

    fn nested_schema(&self, token: &TypeToken) -> Result<Arc<ObjectSchema>, MapperError> {
        if let Some(schema) = self.nested.borrow().get(&token.id()) {
            return Ok(Arc::clone(schema));
        }
        let hooks = token.object_hooks().ok_or(MapperError::TypeMismatch {
            expected: "object type",
        })?;
        let schema = Arc::new((hooks.schema)(self)?);
        trace!(object = token.name(), "built nested schema");
        self.nested
            .borrow_mut()
            .insert(token.id(), Arc::clone(&schema));
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapped::Mapped;
    use serde_json::json;

    struct Silent;

    impl ValueEncoder for Silent {
        fn contextualize(&self, _: &FieldContext<'_>) -> Result<Arc<dyn ValueEncoder>, MapperError> {
            Ok(Arc::new(Silent))
        }

        fn encode(&self, _: &dyn FieldValue) -> Result<Option<Value>, MapperError> {
            Ok(None)
        }
    }

    fn context<'a>(token: &'a TypeToken, resolver: &'a CodecResolver<'a>) -> FieldContext<'a> {
        FieldContext {
            object: "Test",
            field: "f",
            declared: token,
            resolver,
        }
    }

    #[test]
    fn serde_encoder_writes_value() {
        assert_eq!(SerdeEncoder.encode(&7u8).unwrap(), Some(json!(7)));
        assert!(!SerdeEncoder.is_empty(&None::<u8>));
    }

    #[test]
    fn unbound_serde_decoder_fails_fast() {
        let err = SerdeDecoder::default().decode(&json!(1)).unwrap_err();
        assert!(matches!(err, MapperError::NotInitialized("SerdeDecoder")));
    }

    #[test]
    fn bound_serde_decoder_decodes_declared_type() {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = TypeToken::of::<u32>();
        let decoder = resolver.decoder(&context(&token, &resolver)).unwrap();
        let v = decoder.decode(&json!(42)).unwrap();
        assert_eq!(<u32 as Mapped>::from_erased(v).unwrap(), 42);
    }

    #[test]
    fn serde_decoder_null_goes_through_serde() {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = <Option<u32> as Mapped>::type_token();
        let decoder = resolver.decoder(&context(&token, &resolver)).unwrap();
        let v = decoder.null_value().unwrap();
        assert_eq!(<Option<u32> as Mapped>::from_erased(v).unwrap(), None);
        assert!(decoder.absent_value().is_none());
    }

    #[test]
    fn inner_decode_error_is_json_error() {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let token = TypeToken::of::<u32>();
        let decoder = resolver.decoder(&context(&token, &resolver)).unwrap();
        let err = decoder.decode(&json!("x")).unwrap_err();
        assert!(matches!(err, MapperError::Json(_)));
    }

    #[test]
    fn registered_encoder_wins_over_serde() {
        let mut registry = CodecRegistry::new();
        let config = MapperConfig::new();
        let token = TypeToken::of::<u8>();
        assert!(!registry.has_encoder(token.raw()));
        {
            let resolver = CodecResolver::new(&registry, &[], &config);
            let encoder = resolver.encoder(&context(&token, &resolver)).unwrap();
            assert_eq!(encoder.encode(&1u8).unwrap(), Some(json!(1)));
        }

        registry.add_encoder(token.raw(), Arc::new(Silent));
        assert!(registry.has_encoder(token.raw()));
        let resolver = CodecResolver::new(&registry, &[], &config);
        let encoder = resolver.encoder(&context(&token, &resolver)).unwrap();
        assert_eq!(encoder.encode(&1u8).unwrap(), None);
    }

    #[test]
    fn binding_context_reports_missing_argument() {
        let config = MapperConfig::new();
        let resolver = CodecResolver::plain(&config);
        let vec = <Vec<u8> as Mapped>::type_token();
        let field = context(&vec, &resolver);
        assert_eq!(field.binding(0).unwrap().declared, &TypeToken::of::<u8>());
        let err = field.binding(1).unwrap_err();
        assert!(matches!(err, MapperError::UnboundGeneric { ref field, .. } if field == "f"));
    }
}
