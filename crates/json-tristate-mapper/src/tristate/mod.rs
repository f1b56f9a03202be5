//! Mapper support for [`TriState`].
//!
//! [`TriStateModule`] registers a codec pair for every `TriState<T>` field and
//! an [`AbsentPropertyFilter`] that drops absent fields from the output.

mod codec;
mod filter;
mod module;

pub use codec::{TriStateDecoder, TriStateEncoder};
pub use filter::{AbsentAwareWriter, AbsentPropertyFilter};
pub use module::TriStateModule;

use std::any::type_name;

use json_tristate::{Presence, TriState};
use serde_json::Value;

use crate::error::MapperError;
use crate::mapped::{FieldValue, Mapped};
use crate::type_token::{Erased, RawType, TypeToken};

/// Raw type shared by every `TriState<T>`.
pub const TRI_STATE: RawType = RawType::named("json_tristate::TriState");

impl<T: Mapped> Mapped for TriState<T> {
    fn raw_type() -> RawType {
        TRI_STATE
    }

    fn type_token() -> TypeToken {
        TypeToken::of::<Self>().with_binding(T::type_token())
    }

    fn presence(&self) -> Presence {
        TriState::presence(self)
    }

    fn payload(&self) -> Option<&dyn FieldValue> {
        match self {
            TriState::Value(v) => Some(v as &dyn FieldValue),
            TriState::Absent | TriState::Null => None,
        }
    }

    fn to_plain_json(&self) -> Result<Value, MapperError> {
        match self {
            TriState::Value(v) => v.to_plain_json(),
            TriState::Absent | TriState::Null => Ok(Value::Null),
        }
    }

    fn from_plain_json(value: &Value) -> Result<Self, MapperError> {
        match value {
            Value::Null => Ok(TriState::Null),
            value => T::from_plain_json(value).map(TriState::Value),
        }
    }

    /// Accepts either a fully typed `TriState<T>` from the serde fallback or
    /// the `TriState<Erased>` a [`TriStateDecoder`] produces.
    fn from_erased(value: Erased) -> Result<Self, MapperError> {
        let value = match value.downcast::<Self>() {
            Ok(typed) => return Ok(*typed),
            Err(value) => value,
        };
        let state = value
            .downcast::<TriState<Erased>>()
            .map_err(|_| MapperError::TypeMismatch {
                expected: type_name::<Self>(),
            })?;
        state.try_map_value(T::from_erased)
    }
}
