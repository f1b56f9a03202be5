//! Codecs for fields whose type is itself an object type.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::codec::{FieldContext, ValueDecoder, ValueEncoder};
use crate::config::MapperConfig;
use crate::error::{json_kind, MapperError};
use crate::mapped::FieldValue;
use crate::type_token::{CreateFn, Erased};

use super::ObjectSchema;

/// Writes a nested object through its own schema, so its writers and any
/// modifier rewrites apply inside it too.
#[derive(Clone)]
pub struct NestedEncoder {
    schema: Arc<ObjectSchema>,
}

impl NestedEncoder {
    pub fn new(schema: Arc<ObjectSchema>) -> Self {
        Self { schema }
    }
}

impl fmt::Debug for NestedEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedEncoder").field(&self.schema).finish()
    }
}

impl ValueEncoder for NestedEncoder {
    fn contextualize(&self, _field: &FieldContext<'_>) -> Result<Arc<dyn ValueEncoder>, MapperError> {
        Ok(Arc::new(self.clone()))
    }

    fn encode(&self, value: &dyn FieldValue) -> Result<Option<Value>, MapperError> {
        self.schema
            .encode(value.as_any())
            .map(|out| Some(Value::Object(out)))
    }
}

/// Reads a nested object into a fresh default instance through its schema.
#[derive(Clone)]
pub struct NestedDecoder {
    schema: Arc<ObjectSchema>,
    create: CreateFn,
    config: MapperConfig,
}

impl NestedDecoder {
    pub(crate) fn new(schema: Arc<ObjectSchema>, create: CreateFn, config: MapperConfig) -> Self {
        Self {
            schema,
            create,
            config,
        }
    }
}

impl fmt::Debug for NestedDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedDecoder")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish()
    }
}

impl ValueDecoder for NestedDecoder {
    fn contextualize(&self, _field: &FieldContext<'_>) -> Result<Arc<dyn ValueDecoder>, MapperError> {
        Ok(Arc::new(self.clone()))
    }

    fn decode(&self, value: &Value) -> Result<Erased, MapperError> {
        let Value::Object(input) = value else {
            return Err(MapperError::ExpectedObject {
                object: self.schema.description().type_name,
                found: json_kind(value),
            });
        };
        let mut object = (self.create)();
        self.schema.decode_into(&mut *object, input, &self.config)?;
        Ok(object)
    }
}
