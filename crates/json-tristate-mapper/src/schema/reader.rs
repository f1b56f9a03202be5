//! Field readers.

use std::any::{type_name, Any};
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::codec::ValueDecoder;
use crate::config::MapperConfig;
use crate::error::MapperError;
use crate::mapped::Mapped;
use crate::type_token::TypeToken;

/// What the input holds for one declared field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldInput<'a> {
    /// The key is not there.
    Missing,
    /// The key holds `null`.
    Null,
    /// The key is there but holds no token, e.g. `""` with
    /// [`MapperConfig::accept_empty_string_as_null`].
    Empty,
    Content(&'a Value),
}

impl<'a> FieldInput<'a> {
    pub fn classify(slot: Option<&'a Value>, config: &MapperConfig) -> Self {
        match slot {
            None => FieldInput::Missing,
            Some(Value::Null) => FieldInput::Null,
            Some(Value::String(s)) if s.is_empty() && config.accept_empty_string_as_null => {
                FieldInput::Empty
            }
            Some(value) => FieldInput::Content(value),
        }
    }
}

/// Reads one field of an object from its JSON input.
pub trait PropertyReader: Send + Sync {
    fn name(&self) -> &str;

    fn declared_type(&self) -> &TypeToken;

    fn read_field(
        &self,
        object: &mut dyn Any,
        input: FieldInput<'_>,
        config: &MapperConfig,
    ) -> Result<(), MapperError>;
}

/// The reader built for every declared field. Holds a decoder already bound to
/// the field's type.
pub struct FieldReader<O, F> {
    name: String,
    declared: TypeToken,
    set: fn(&mut O, F),
    decoder: Arc<dyn ValueDecoder>,
}

impl<O, F> FieldReader<O, F> {
    pub fn new(
        name: impl Into<String>,
        declared: TypeToken,
        set: fn(&mut O, F),
        decoder: Arc<dyn ValueDecoder>,
    ) -> Self {
        Self {
            name: name.into(),
            declared,
            set,
            decoder,
        }
    }
}

impl<O: 'static, F: Mapped> PropertyReader for FieldReader<O, F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> &TypeToken {
        &self.declared
    }

    fn read_field(
        &self,
        object: &mut dyn Any,
        input: FieldInput<'_>,
        config: &MapperConfig,
    ) -> Result<(), MapperError> {
        let object = object
            .downcast_mut::<O>()
            .ok_or(MapperError::TypeMismatch {
                expected: type_name::<O>(),
            })?;
        trace!(field = %self.name, ?input, "reading field");
        let decoded = match input {
            FieldInput::Missing => match self.decoder.absent_value() {
                Some(value) => value,
                None if config.fail_on_missing_fields => {
                    return Err(MapperError::MissingField {
                        object: type_name::<O>(),
                        field: self.name.clone(),
                    });
                }
                None => return Ok(()),
            },
            FieldInput::Null => self.decoder.null_value()?,
            FieldInput::Empty => self.decoder.empty_value()?,
            FieldInput::Content(value) => self.decoder.decode(value)?,
        };
        (self.set)(object, F::from_erased(decoded)?);
        Ok(())
    }
}
