//! Field writers.

use std::any::{type_name, Any};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::codec::ValueEncoder;
use crate::config::Inclusion;
use crate::error::MapperError;
use crate::mapped::{FieldValue, Mapped};
use crate::type_token::TypeToken;

/// Writes one field of an object into its JSON output.
///
/// Writers take the object as `&dyn Any` so that schema modifiers can rewrite
/// writer lists of any object type.
pub trait PropertyWriter: Send + Sync {
    fn name(&self) -> &str;

    fn declared_type(&self) -> &TypeToken;

    /// Reads the field's current value.
    fn get<'a>(&self, object: &'a dyn Any) -> Result<&'a dyn FieldValue, MapperError>;

    fn write_field(&self, object: &dyn Any, out: &mut Map<String, Value>) -> Result<(), MapperError>;

    /// True for writers that already skip absent values.
    fn is_absent_aware(&self) -> bool {
        false
    }
}

/// The writer built for every declared field.
pub struct FieldWriter<O, F> {
    name: String,
    declared: TypeToken,
    get: fn(&O) -> &F,
    encoder: Arc<dyn ValueEncoder>,
    inclusion: Inclusion,
}

impl<O, F> FieldWriter<O, F> {
    pub fn new(
        name: impl Into<String>,
        declared: TypeToken,
        get: fn(&O) -> &F,
        encoder: Arc<dyn ValueEncoder>,
        inclusion: Inclusion,
    ) -> Self {
        Self {
            name: name.into(),
            declared,
            get,
            encoder,
            inclusion,
        }
    }
}

impl<O: 'static, F: Mapped> PropertyWriter for FieldWriter<O, F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> &TypeToken {
        &self.declared
    }

    fn get<'a>(&self, object: &'a dyn Any) -> Result<&'a dyn FieldValue, MapperError> {
        let object = object
            .downcast_ref::<O>()
            .ok_or(MapperError::TypeMismatch {
                expected: type_name::<O>(),
            })?;
        Ok((self.get)(object) as &dyn FieldValue)
    }

    fn write_field(&self, object: &dyn Any, out: &mut Map<String, Value>) -> Result<(), MapperError> {
        let value = self.get(object)?;
        if self.inclusion == Inclusion::NonEmpty && self.encoder.is_empty(value) {
            return Ok(());
        }
        // The key is committed whatever the encoder produces; an encoder with
        // no output leaves it holding `null`.
        let encoded = self.encoder.encode(value)?;
        out.insert(self.name.clone(), encoded.unwrap_or(Value::Null));
        Ok(())
    }
}
