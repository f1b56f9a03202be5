//! Runtime type descriptions.
//!
//! Rust carries no generic type arguments at runtime, so every field records a
//! [`TypeToken`] when its schema is built: the concrete type, its raw
//! (generic-erased) identity and the tokens of its generic arguments. Codecs
//! are registered per [`RawType`] and bind to the concrete token once.
//!
//! Tokens of [`ObjectType`]s also carry the hooks that build the object's
//! schema and its default instance, so object types nest as field values.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use serde_json::Value;

use crate::codec::CodecResolver;
use crate::error::MapperError;
use crate::mapped::Mapped;
use crate::schema::{ObjectSchema, ObjectType};

/// A decoded value whose concrete type is known only to the field that asked
/// for it.
pub type Erased = Box<dyn Any + Send>;

type DecodeFn = fn(&Value) -> Result<Erased, MapperError>;
type SchemaFn = fn(&CodecResolver<'_>) -> Result<ObjectSchema, MapperError>;
pub(crate) type CreateFn = fn() -> Erased;

/// Generic-erased identity of a type, used as the codec registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawType(&'static str);

impl RawType {
    pub const fn named(name: &'static str) -> Self {
        Self(name)
    }

    /// Raw type named after the full type name of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(type_name::<T>())
    }

    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ObjectHooks {
    pub(crate) schema: SchemaFn,
    pub(crate) create: CreateFn,
}

/// A concrete type with its generic bindings and its plain decode entry point.
#[derive(Clone)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
    raw: RawType,
    bindings: Vec<TypeToken>,
    decode: DecodeFn,
    object: Option<ObjectHooks>,
}

impl TypeToken {
    /// Token for `T` without generic bindings.
    pub fn of<T: Mapped>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            raw: T::raw_type(),
            bindings: Vec::new(),
            decode: decode_erased::<T>,
            object: None,
        }
    }

    /// Token for an object type, encoded and decoded through its schema.
    pub fn object<O: ObjectType + Send + Sync>() -> Self {
        Self {
            object: Some(ObjectHooks {
                schema: build_schema::<O>,
                create: create_default::<O>,
            }),
            ..Self::of::<O>()
        }
    }

    /// Appends the token of the next generic argument.
    pub fn with_binding(mut self, binding: TypeToken) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn raw(&self) -> RawType {
        self.raw
    }

    pub fn bindings(&self) -> &[TypeToken] {
        &self.bindings
    }

    /// Token of the generic argument at `index`.
    pub fn binding(&self, index: usize) -> Option<&TypeToken> {
        self.bindings.get(index)
    }

    /// True for tokens built by [`TypeToken::object`].
    pub fn is_object(&self) -> bool {
        self.object.is_some()
    }

    /// Decodes `value` as this type without any registered codec.
    pub fn decode(&self, value: &Value) -> Result<Erased, MapperError> {
        (self.decode)(value)
    }

    pub(crate) fn object_hooks(&self) -> Option<ObjectHooks> {
        self.object
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeToken")
            .field("name", &self.name)
            .field("raw", &self.raw)
            .field("bindings", &self.bindings)
            .field("object", &self.is_object())
            .finish()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn decode_erased<T: Mapped>(value: &Value) -> Result<Erased, MapperError> {
    T::from_plain_json(value).map(|v| Box::new(v) as Erased)
}

fn build_schema<O: ObjectType>(resolver: &CodecResolver<'_>) -> Result<ObjectSchema, MapperError> {
    resolver.schema::<O>()
}

fn create_default<O: ObjectType + Send>() -> Erased {
    Box::new(O::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use serde_json::json;

    #[derive(Default)]
    struct Marker {
        flag: bool,
    }

    impl ObjectType for Marker {
        fn describe(schema: &mut SchemaBuilder<'_, Self>) {
            schema.field("flag", |m| &m.flag, |m, v| m.flag = v);
        }
    }

    #[test]
    fn plain_token_has_no_bindings() {
        let t = TypeToken::of::<String>();
        assert_eq!(t.id(), TypeId::of::<String>());
        assert_eq!(t.raw(), RawType::of::<String>());
        assert!(t.bindings().is_empty());
        assert!(t.binding(0).is_none());
        assert!(!t.is_object());
    }

    #[test]
    fn option_token_binds_inner() {
        let t = <Option<u32> as Mapped>::type_token();
        assert_eq!(t.binding(0), Some(&TypeToken::of::<u32>()));
    }

    #[test]
    fn token_decodes_plain_json() {
        let t = TypeToken::of::<u16>();
        let v = t.decode(&json!(7)).unwrap();
        assert_eq!(*v.downcast::<u16>().unwrap(), 7);
        assert!(matches!(t.decode(&json!("x")), Err(MapperError::Json(_))));
    }

    #[test]
    fn object_token_carries_hooks() {
        let t = <Marker as Mapped>::type_token();
        assert!(t.is_object());
        let hooks = t.object_hooks().unwrap();
        let created = (hooks.create)();
        assert!(!created.downcast::<Marker>().unwrap().flag);
    }

    #[test]
    fn debug_omits_function_pointers() {
        let debug = format!("{:?}", TypeToken::of::<bool>());
        assert!(debug.contains("name: \"bool\""));
        assert!(!debug.contains("decode"));
    }

    #[test]
    fn raw_type_display() {
        assert_eq!(RawType::named("x::Y").to_string(), "x::Y");
    }
}
