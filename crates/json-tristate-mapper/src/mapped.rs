//! Types that can appear as field values.

use std::any::{type_name, Any};
use std::collections::BTreeMap;

use json_tristate::Presence;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::CodecResolver;
use crate::config::MapperConfig;
use crate::error::{json_kind, MapperError};
use crate::schema::ObjectType;
use crate::type_token::{Erased, RawType, TypeToken};

/// A field value type known to the mapper.
///
/// Plain serde types implement [`Mapped::to_plain_json`] and
/// [`Mapped::from_plain_json`] with [`serde_to_json`] and [`serde_from_json`];
/// every [`ObjectType`] is `Mapped` through its schema. Generic containers
/// override [`Mapped::type_token`] to record their arguments.
pub trait Mapped: Send + Sync + Sized + 'static {
    fn raw_type() -> RawType {
        RawType::of::<Self>()
    }

    fn type_token() -> TypeToken {
        TypeToken::of::<Self>()
    }

    fn presence(&self) -> Presence {
        Presence::Value
    }

    /// The wrapped value of a wrapper type, when there is one.
    fn payload(&self) -> Option<&dyn FieldValue> {
        None
    }

    /// Encoding used when no codec is registered for the type.
    fn to_plain_json(&self) -> Result<Value, MapperError>;

    /// Decoding used when no codec is registered for the type.
    fn from_plain_json(value: &Value) -> Result<Self, MapperError>;

    /// Recovers `Self` from what a decoder produced.
    fn from_erased(value: Erased) -> Result<Self, MapperError> {
        value
            .downcast::<Self>()
            .map(|v| *v)
            .map_err(|_| MapperError::TypeMismatch {
                expected: type_name::<Self>(),
            })
    }
}

/// Object-safe view of a field value handed to encoders.
pub trait FieldValue: Send + Sync {
    fn presence(&self) -> Presence;
    fn payload(&self) -> Option<&dyn FieldValue>;
    fn to_json(&self) -> Result<Value, MapperError>;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Mapped> FieldValue for T {
    fn presence(&self) -> Presence {
        Mapped::presence(self)
    }

    fn payload(&self) -> Option<&dyn FieldValue> {
        Mapped::payload(self)
    }

    fn to_json(&self) -> Result<Value, MapperError> {
        self.to_plain_json()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn serde_to_json<T: Serialize>(value: &T) -> Result<Value, MapperError> {
    serde_json::to_value(value).map_err(Into::into)
}

pub fn serde_from_json<T: DeserializeOwned>(value: &Value) -> Result<T, MapperError> {
    T::deserialize(value).map_err(Into::into)
}

macro_rules! impl_mapped {
    ($($t:ty),* $(,)?) => {
        $(impl Mapped for $t {
            fn to_plain_json(&self) -> Result<Value, MapperError> {
                serde_to_json(self)
            }

            fn from_plain_json(value: &Value) -> Result<Self, MapperError> {
                serde_from_json(value)
            }
        })*
    };
}

impl_mapped!(
    bool, char, String, Value, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
);

impl<T> Mapped for Option<T>
where
    T: Mapped + Serialize + DeserializeOwned,
{
    fn raw_type() -> RawType {
        RawType::named("core::option::Option")
    }

    fn type_token() -> TypeToken {
        TypeToken::of::<Self>().with_binding(T::type_token())
    }

    fn presence(&self) -> Presence {
        match self {
            Some(_) => Presence::Value,
            None => Presence::Null,
        }
    }

    fn to_plain_json(&self) -> Result<Value, MapperError> {
        serde_to_json(self)
    }

    fn from_plain_json(value: &Value) -> Result<Self, MapperError> {
        serde_from_json(value)
    }
}

impl<T> Mapped for Vec<T>
where
    T: Mapped + Serialize + DeserializeOwned,
{
    fn raw_type() -> RawType {
        RawType::named("alloc::vec::Vec")
    }

    fn type_token() -> TypeToken {
        TypeToken::of::<Self>().with_binding(T::type_token())
    }

    fn to_plain_json(&self) -> Result<Value, MapperError> {
        serde_to_json(self)
    }

    fn from_plain_json(value: &Value) -> Result<Self, MapperError> {
        serde_from_json(value)
    }
}

impl<T> Mapped for BTreeMap<String, T>
where
    T: Mapped + Serialize + DeserializeOwned,
{
    fn raw_type() -> RawType {
        RawType::named("alloc::collections::BTreeMap")
    }

    fn type_token() -> TypeToken {
        TypeToken::of::<Self>()
            .with_binding(String::type_token())
            .with_binding(T::type_token())
    }

    fn to_plain_json(&self) -> Result<Value, MapperError> {
        serde_to_json(self)
    }

    fn from_plain_json(value: &Value) -> Result<Self, MapperError> {
        serde_from_json(value)
    }
}

/// Object types nest as field values. The mapper encodes them through their
/// own schema, with every registered codec and modifier in effect; the plain
/// forms below see no codecs and no modifiers.
impl<O: ObjectType + Send + Sync> Mapped for O {
    fn type_token() -> TypeToken {
        TypeToken::object::<O>()
    }

    fn to_plain_json(&self) -> Result<Value, MapperError> {
        let config = MapperConfig::default();
        let resolver = CodecResolver::plain(&config);
        let schema = resolver.schema::<O>()?;
        schema.encode(self).map(Value::Object)
    }

    fn from_plain_json(value: &Value) -> Result<Self, MapperError> {
        let Value::Object(input) = value else {
            return Err(MapperError::ExpectedObject {
                object: type_name::<O>(),
                found: json_kind(value),
            });
        };
        let config = MapperConfig::default();
        let resolver = CodecResolver::plain(&config);
        let schema = resolver.schema::<O>()?;
        let mut object = O::default();
        schema.decode_into(&mut object, input, &config)?;
        Ok(object)
    }
}
