//! json-tristate-mapper - an object mapper over `serde_json` with pluggable
//! codecs, schema modifiers and modules.
//!
//! Object types describe their fields once; the mapper builds an
//! [`ObjectSchema`] per type, lets registered [`SchemaModifier`]s rewrite its
//! field writers, caches it, and then encodes and decodes through it. Field
//! values are encoded with the codec registered for their raw type. Without
//! one, a field of another object type goes through that type's own schema
//! and any other value goes through serde.
//!
//! [`TriStateModule`] plugs [`json_tristate::TriState`] into this pipeline so
//! that absent fields are left out of the output entirely:
//!
//! ```
//! use json_tristate::TriState;
//! use json_tristate_mapper::{ObjectMapper, ObjectType, SchemaBuilder};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Patch {
//!     name: TriState<String>,
//! }
//!
//! impl ObjectType for Patch {
//!     fn describe(schema: &mut SchemaBuilder<'_, Self>) {
//!         schema.field("name", |p| &p.name, |p, v| p.name = v);
//!     }
//! }
//!
//! let mut mapper = ObjectMapper::new();
//! mapper.find_and_register_modules();
//!
//! assert_eq!(mapper.to_string(&Patch::default()).unwrap(), "{}");
//! let patch: Patch = mapper.from_str(r#"{"name":null}"#).unwrap();
//! assert!(patch.name.is_null());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod mapped;
pub mod mapper;
pub mod module;
pub mod schema;
pub mod tristate;
pub mod type_token;

pub use codec::{
    CodecRegistry, CodecResolver, FieldContext, SerdeDecoder, SerdeEncoder, ValueDecoder,
    ValueEncoder,
};
pub use config::{Inclusion, MapperConfig};
pub use error::MapperError;
pub use mapped::{serde_from_json, serde_to_json, FieldValue, Mapped};
pub use mapper::ObjectMapper;
pub use module::{Module, SetupContext};
pub use schema::{
    FieldInput, FieldReader, FieldWriter, NestedDecoder, NestedEncoder, ObjectDescription,
    ObjectSchema, ObjectType, PropertyReader, PropertyWriter, SchemaBuilder, SchemaModifier,
};
pub use tristate::{
    AbsentAwareWriter, AbsentPropertyFilter, TriStateDecoder, TriStateEncoder, TriStateModule,
};
pub use type_token::{Erased, RawType, TypeToken};
