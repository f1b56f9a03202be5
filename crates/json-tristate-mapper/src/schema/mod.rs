//! Object schemas: the ordered field writers and readers of one object type.

mod nested;
mod reader;
mod writer;

pub use nested::{NestedDecoder, NestedEncoder};
pub use reader::{FieldInput, FieldReader, PropertyReader};
pub use writer::{FieldWriter, PropertyWriter};

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::codec::{CodecResolver, FieldContext};
use crate::config::{Inclusion, MapperConfig};
use crate::error::MapperError;
use crate::mapped::Mapped;

/// A struct the mapper can encode and decode field by field.
///
/// Decoding starts from `Default::default()` and assigns each field through
/// its setter. An object type can itself be a field of another object type;
/// it is then written and read through its own schema.
pub trait ObjectType: Default + 'static {
    /// Declares the fields in output order.
    fn describe(schema: &mut SchemaBuilder<'_, Self>);
}

/// Identity of the object type a schema belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectDescription {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ObjectDescription {
    pub fn of<O: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<O>(),
            type_name: type_name::<O>(),
        }
    }
}

/// Rewrites the field writers of an object type while its schema is built.
///
/// Runs once per object type. Implementations must tolerate being handed
/// writers they produced themselves.
pub trait SchemaModifier: Send + Sync {
    fn change_properties(
        &self,
        object: &ObjectDescription,
        writers: Vec<Arc<dyn PropertyWriter>>,
    ) -> Vec<Arc<dyn PropertyWriter>>;
}

pub struct ObjectSchema {
    description: ObjectDescription,
    writers: Vec<Arc<dyn PropertyWriter>>,
    readers: Vec<Arc<dyn PropertyReader>>,
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("object", &self.description.type_name)
            .field(
                "fields",
                &self.readers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ObjectSchema {
    pub fn description(&self) -> &ObjectDescription {
        &self.description
    }

    pub fn writers(&self) -> &[Arc<dyn PropertyWriter>] {
        &self.writers
    }

    pub fn readers(&self) -> &[Arc<dyn PropertyReader>] {
        &self.readers
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.readers.iter().any(|r| r.name() == name)
    }

    /// Hands the writer list to `modifier` and keeps what it returns.
    pub fn apply(&mut self, modifier: &dyn SchemaModifier) {
        let writers = std::mem::take(&mut self.writers);
        self.writers = modifier.change_properties(&self.description, writers);
    }

    pub fn encode(&self, object: &dyn Any) -> Result<Map<String, Value>, MapperError> {
        let mut out = Map::new();
        for writer in &self.writers {
            writer.write_field(object, &mut out)?;
        }
        Ok(out)
    }

    pub fn decode_into(
        &self,
        object: &mut dyn Any,
        input: &Map<String, Value>,
        config: &MapperConfig,
    ) -> Result<(), MapperError> {
        if config.fail_on_unknown_keys {
            if let Some(key) = input.keys().find(|k| !self.has_field(k)) {
                return Err(MapperError::UnknownField {
                    object: self.description.type_name,
                    field: key.clone(),
                });
            }
        }
        for reader in &self.readers {
            let slot = FieldInput::classify(input.get(reader.name()), config);
            reader.read_field(object, slot, config)?;
        }
        Ok(())
    }
}

/// Collects the fields of `O`, resolving codecs as it goes.
///
/// Each field's encoder and decoder are bound to the field's declared type
/// right here, so neither rediscovers types later. The first failure is kept
/// and reported by [`SchemaBuilder::finish`].
pub struct SchemaBuilder<'a, O> {
    description: ObjectDescription,
    resolver: &'a CodecResolver<'a>,
    inclusion: Inclusion,
    writers: Vec<Arc<dyn PropertyWriter>>,
    readers: Vec<Arc<dyn PropertyReader>>,
    error: Option<MapperError>,
    _object: PhantomData<fn() -> O>,
}

impl<'a, O: ObjectType> SchemaBuilder<'a, O> {
    pub fn new(resolver: &'a CodecResolver<'a>) -> Self {
        Self {
            description: ObjectDescription::of::<O>(),
            resolver,
            inclusion: resolver.config().inclusion,
            writers: Vec::new(),
            readers: Vec::new(),
            error: None,
            _object: PhantomData,
        }
    }

    /// Declares a field with its getter and setter.
    pub fn field<F: Mapped>(&mut self, name: &str, get: fn(&O) -> &F, set: fn(&mut O, F)) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let token = F::type_token();
        let context = FieldContext {
            object: self.description.type_name,
            field: name,
            declared: &token,
            resolver: self.resolver,
        };
        let codecs = self
            .resolver
            .encoder(&context)
            .and_then(|encoder| Ok((encoder, self.resolver.decoder(&context)?)));
        let (encoder, decoder) = match codecs {
            Ok(codecs) => codecs,
            Err(err) => {
                self.error = Some(err);
                return self;
            }
        };
        self.writers.push(Arc::new(FieldWriter::new(
            name,
            token.clone(),
            get,
            encoder,
            self.inclusion,
        )));
        self.readers
            .push(Arc::new(FieldReader::new(name, token, set, decoder)));
        self
    }

    pub fn finish(self) -> Result<ObjectSchema, MapperError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(ObjectSchema {
            description: self.description,
            writers: self.writers,
            readers: self.readers,
        })
    }
}
