//! The object mapper.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::codec::{CodecRegistry, CodecResolver, FieldContext};
use crate::config::MapperConfig;
use crate::error::{json_kind, MapperError};
use crate::mapped::Mapped;
use crate::module::{Module, SetupContext};
use crate::schema::{ObjectSchema, ObjectType, SchemaModifier};
use crate::tristate::TriStateModule;

/// Field name reported for values read or written outside any object.
const ROOT_FIELD: &str = "$";

/// Encodes and decodes [`ObjectType`]s through cached per-type schemas.
///
/// Registration takes `&mut self` and drops every cached schema; encoding
/// and decoding take `&self` and may run concurrently. A schema is built at
/// most once per type, under the cache's write lock.
pub struct ObjectMapper {
    config: MapperConfig,
    codecs: CodecRegistry,
    modifiers: Vec<Arc<dyn SchemaModifier>>,
    modules: Vec<(&'static str, &'static str)>,
    schemas: RwLock<HashMap<TypeId, Arc<ObjectSchema>>>,
}

impl Default for ObjectMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMapper")
            .field("config", &self.config)
            .field("codecs", &self.codecs)
            .field("modules", &self.modules)
            .finish()
    }
}

impl ObjectMapper {
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            config,
            codecs: CodecRegistry::new(),
            modifiers: Vec::new(),
            modules: Vec::new(),
            schemas: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Runs `module`'s setup unless a module with the same id is already
    /// registered.
    pub fn register_module<M: Module>(&mut self, module: M) -> &mut Self {
        let id = module.module_id();
        if self.modules.iter().any(|(registered, _)| *registered == id) {
            debug!(module = id, "module already registered");
            return self;
        }
        module.setup(&mut SetupContext::new(&mut self.codecs, &mut self.modifiers));
        self.modules.push((id, module.version()));
        self.schemas
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!(module = id, version = module.version(), "registered module");
        self
    }

    /// Registers every module this crate ships.
    pub fn find_and_register_modules(&mut self) -> &mut Self {
        self.register_module(TriStateModule)
    }

    pub fn registered_module_ids(&self) -> Vec<&'static str> {
        self.modules.iter().map(|(id, _)| *id).collect()
    }

    /// The schema of `O`, built and cached on first use.
    pub fn schema_for<O: ObjectType>(&self) -> Result<Arc<ObjectSchema>, MapperError> {
        let id = TypeId::of::<O>();
        if let Some(schema) = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Ok(Arc::clone(schema));
        }

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have built it while we waited for the lock.
        if let Some(schema) = schemas.get(&id) {
            return Ok(Arc::clone(schema));
        }
        let schema = Arc::new(self.build_schema::<O>()?);
        schemas.insert(id, Arc::clone(&schema));
        Ok(schema)
    }

    fn resolver(&self) -> CodecResolver<'_> {
        CodecResolver::new(&self.codecs, &self.modifiers, &self.config)
    }

    fn build_schema<O: ObjectType>(&self) -> Result<ObjectSchema, MapperError> {
        let schema = self.resolver().schema::<O>()?;
        debug!(
            object = type_name::<O>(),
            fields = schema.readers().len(),
            "built object schema"
        );
        Ok(schema)
    }

    pub fn to_value<O: ObjectType>(&self, object: &O) -> Result<Value, MapperError> {
        let schema = self.schema_for::<O>()?;
        schema.encode(object).map(Value::Object)
    }

    pub fn to_string<O: ObjectType>(&self, object: &O) -> Result<String, MapperError> {
        let value = self.to_value(object)?;
        serde_json::to_string(&value).map_err(Into::into)
    }

    pub fn to_string_pretty<O: ObjectType>(&self, object: &O) -> Result<String, MapperError> {
        let value = self.to_value(object)?;
        serde_json::to_string_pretty(&value).map_err(Into::into)
    }

    pub fn from_value<O: ObjectType>(&self, value: &Value) -> Result<O, MapperError> {
        let Value::Object(input) = value else {
            return Err(MapperError::ExpectedObject {
                object: type_name::<O>(),
                found: json_kind(value),
            });
        };
        let schema = self.schema_for::<O>()?;
        let mut object = O::default();
        schema.decode_into(&mut object, input, &self.config)?;
        Ok(object)
    }

    pub fn from_str<O: ObjectType>(&self, text: &str) -> Result<O, MapperError> {
        let value: Value = serde_json::from_str(text)?;
        self.from_value(&value)
    }

    /// Encodes a single value with its registered encoder. A value the
    /// encoder produces no output for yields an empty string.
    pub fn write_value<F: Mapped>(&self, value: &F) -> Result<String, MapperError> {
        let token = F::type_token();
        let resolver = self.resolver();
        let encoder = resolver.encoder(&FieldContext {
            object: type_name::<F>(),
            field: ROOT_FIELD,
            declared: &token,
            resolver: &resolver,
        })?;
        match encoder.encode(value)? {
            Some(encoded) => serde_json::to_string(&encoded).map_err(Into::into),
            None => Ok(String::new()),
        }
    }

    /// Decodes a single value with its registered decoder. Blank text is
    /// empty input and goes to the decoder's empty value.
    pub fn read_value<F: Mapped>(&self, text: &str) -> Result<F, MapperError> {
        let token = F::type_token();
        let resolver = self.resolver();
        let decoder = resolver.decoder(&FieldContext {
            object: type_name::<F>(),
            field: ROOT_FIELD,
            declared: &token,
            resolver: &resolver,
        })?;
        let decoded = if text.trim().is_empty() {
            decoder.empty_value()?
        } else {
            match serde_json::from_str::<Value>(text)? {
                Value::Null => decoder.null_value()?,
                value => decoder.decode(&value)?,
            }
        };
        F::from_erased(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use json_tristate::TriState;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Named {
        name: TriState<String>,
    }

    impl ObjectType for Named {
        fn describe(schema: &mut SchemaBuilder<'_, Self>) {
            schema.field("name", |n| &n.name, |n, v| n.name = v);
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Wrapper {
        inner: TriState<Named>,
    }

    impl ObjectType for Wrapper {
        fn describe(schema: &mut SchemaBuilder<'_, Self>) {
            schema.field("inner", |w| &w.inner, |w, v| w.inner = v);
        }
    }

    #[test]
    fn schema_is_cached() {
        let mapper = ObjectMapper::new();
        let a = mapper.schema_for::<Named>().unwrap();
        let b = mapper.schema_for::<Named>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn registration_drops_cached_schemas() {
        let mut mapper = ObjectMapper::new();
        let before = mapper.schema_for::<Named>().unwrap();
        mapper.find_and_register_modules();
        let after = mapper.schema_for::<Named>().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.writers()[0].is_absent_aware());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut mapper = ObjectMapper::new();
        mapper.find_and_register_modules().find_and_register_modules();
        assert_eq!(mapper.registered_module_ids(), vec!["json-tristate"]);
    }

    #[test]
    fn from_value_requires_object() {
        let mapper = ObjectMapper::new();
        let err = mapper.from_value::<Named>(&json!([1])).unwrap_err();
        assert!(matches!(
            err,
            MapperError::ExpectedObject { found: "array", .. }
        ));
    }

    #[test]
    fn write_and_read_plain_value() {
        let mapper = ObjectMapper::new();
        assert_eq!(mapper.write_value(&vec![1u8, 2]).unwrap(), "[1,2]");
        assert_eq!(mapper.read_value::<Vec<u8>>("[1,2]").unwrap(), vec![1, 2]);
        assert_eq!(mapper.read_value::<Option<u8>>("null").unwrap(), None);
    }

    #[test]
    fn single_object_value_goes_through_its_schema() {
        let mut mapper = ObjectMapper::new();
        mapper.find_and_register_modules();
        assert_eq!(mapper.write_value(&Named::default()).unwrap(), "{}");
        let named: Named = mapper.read_value("{}").unwrap();
        assert!(named.name.is_absent());
    }

    #[test]
    fn nested_schema_sees_registered_modules() {
        let mut mapper = ObjectMapper::new();
        mapper.find_and_register_modules();
        let wrapper = Wrapper {
            inner: TriState::Value(Named::default()),
        };
        assert_eq!(mapper.to_value(&wrapper).unwrap(), json!({"inner": {}}));
    }
}
