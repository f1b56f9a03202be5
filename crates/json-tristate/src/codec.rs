//! serde support.
//!
//! `Absent` and `Null` both serialize as `none`. Suppressing the key of an
//! absent field is up to the containing object: `skip_serializing_if =
//! "TriState::is_absent"` with serde derive, or the absent filter of an object
//! mapper.
//!
//! Decoding goes through `deserialize_option`, so `null` and unit input both
//! become `Null`. A missing key never reaches this impl; `#[serde(default)]`
//! supplies `Absent` for it.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::tri_state::TriState;

impl<T> Serialize for TriState<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TriState::Absent | TriState::Null => serializer.serialize_none(),
            TriState::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for TriState<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(TriStateVisitor(PhantomData))
    }
}

struct TriStateVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for TriStateVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = TriState<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("null or a value")
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(TriState::Null)
    }

    // Empty input is treated exactly like an explicit null.
    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(TriState::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(TriState::Value)
    }
}
