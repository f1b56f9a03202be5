//! The tri-state value and its algebra.

use crate::error::TriStateError;

/// A field value that is either absent, explicitly null, or set.
///
/// The three variants are mutually exclusive:
///
/// - [`TriState::Absent`]: the field was not mentioned at all.
/// - [`TriState::Null`]: the field was mentioned and explicitly cleared.
/// - [`TriState::Value`]: the field was mentioned with a concrete value.
///
/// [`TriState::is_present`] is true for both `Null` and `Value`.
///
/// # Missing keys with serde
///
/// serde decodes a missing key only through `#[serde(default)]`, which yields
/// `Absent`. Without that attribute serde's derive treats a missing key like
/// an optional one and feeds `none` to the deserializer, so the field reads as
/// `Null`. Always pair a `TriState` field with `#[serde(default)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TriState<T> {
    /// Not mentioned in the payload.
    Absent,
    /// Explicitly `null`.
    Null,
    /// Present with a concrete value.
    Value(T),
}

/// The variant of a [`TriState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Not mentioned in the payload.
    Absent,
    /// Explicitly `null`.
    Null,
    /// Present with a concrete value.
    Value,
}

impl Presence {
    pub const fn is_absent(self) -> bool {
        matches!(self, Presence::Absent)
    }
}

impl<T> Default for TriState<T> {
    fn default() -> Self {
        TriState::Absent
    }
}

impl<T> TriState<T> {
    /// Builds a present value from an `Option`: `None` becomes `Null`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => TriState::Value(v),
            None => TriState::Null,
        }
    }

    pub const fn is_absent(&self) -> bool {
        matches!(self, TriState::Absent)
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, TriState::Null)
    }

    /// True for `Null` and `Value`.
    pub const fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub const fn is_value(&self) -> bool {
        matches!(self, TriState::Value(_))
    }

    pub const fn presence(&self) -> Presence {
        match self {
            TriState::Absent => Presence::Absent,
            TriState::Null => Presence::Null,
            TriState::Value(_) => Presence::Value,
        }
    }

    /// Returns the payload: `None` for `Null`, `Some` for `Value`.
    ///
    /// # Errors
    ///
    /// Fails with [`TriStateError::Absent`] when the value is absent.
    pub fn value(&self) -> Result<Option<&T>, TriStateError> {
        match self {
            TriState::Absent => Err(TriStateError::Absent),
            TriState::Null => Ok(None),
            TriState::Value(v) => Ok(Some(v)),
        }
    }

    /// Owning variant of [`TriState::value`].
    pub fn into_value(self) -> Result<Option<T>, TriStateError> {
        match self {
            TriState::Absent => Err(TriStateError::Absent),
            TriState::Null => Ok(None),
            TriState::Value(v) => Ok(Some(v)),
        }
    }

    /// Collapses to two levels of `Option`.
    ///
    /// The outer `None` marks absence and is distinguishable from the
    /// `Some(None)` produced by `Null`.
    pub fn as_optional_or_undefined(&self) -> Option<Option<&T>> {
        match self {
            TriState::Absent => None,
            TriState::Null => Some(None),
            TriState::Value(v) => Some(Some(v)),
        }
    }

    pub fn into_optional_or_undefined(self) -> Option<Option<T>> {
        self.into()
    }

    pub fn as_ref(&self) -> TriState<&T> {
        match self {
            TriState::Absent => TriState::Absent,
            TriState::Null => TriState::Null,
            TriState::Value(v) => TriState::Value(v),
        }
    }

    pub fn as_mut(&mut self) -> TriState<&mut T> {
        match self {
            TriState::Absent => TriState::Absent,
            TriState::Null => TriState::Null,
            TriState::Value(v) => TriState::Value(v),
        }
    }

    /// Chains a transform that itself yields a tri-state.
    ///
    /// Both `Absent` and `Null` fold to `Absent`: given `{"address": null}`,
    /// every property beneath `address` is absent rather than null, since the
    /// null parent keeps them from being present at all. `f` only runs for
    /// `Value`.
    pub fn fold<R, F>(self, f: F) -> TriState<R>
    where
        F: FnOnce(T) -> TriState<R>,
    {
        match self {
            TriState::Absent | TriState::Null => TriState::Absent,
            TriState::Value(v) => f(v),
        }
    }

    /// Applies `f` to the payload of a present value and re-wraps the result.
    ///
    /// `Absent` stays `Absent` and `f` is not called. For `Null`, `f` receives
    /// `None`. A `None` result becomes `Null`, a `Some` result becomes
    /// `Value`.
    pub fn map<R, F>(self, f: F) -> TriState<R>
    where
        F: FnOnce(Option<T>) -> Option<R>,
    {
        match self {
            TriState::Absent => TriState::Absent,
            TriState::Null => TriState::from_option(f(None)),
            TriState::Value(v) => TriState::from_option(f(Some(v))),
        }
    }

    /// Transforms only the `Value` payload; `Absent` and `Null` are kept.
    pub fn map_value<R, F>(self, f: F) -> TriState<R>
    where
        F: FnOnce(T) -> R,
    {
        match self {
            TriState::Absent => TriState::Absent,
            TriState::Null => TriState::Null,
            TriState::Value(v) => TriState::Value(f(v)),
        }
    }

    /// Fallible form of [`TriState::map_value`].
    pub fn try_map_value<R, E, F>(self, f: F) -> Result<TriState<R>, E>
    where
        F: FnOnce(T) -> Result<R, E>,
    {
        Ok(match self {
            TriState::Absent => TriState::Absent,
            TriState::Null => TriState::Null,
            TriState::Value(v) => TriState::Value(f(v)?),
        })
    }

    /// Calls `f` with the payload unless the value is absent. `Null` passes
    /// `None`.
    pub fn on_presence<F>(&self, f: F)
    where
        F: FnOnce(Option<&T>),
    {
        match self {
            TriState::Absent => {}
            TriState::Null => f(None),
            TriState::Value(v) => f(Some(v)),
        }
    }

    /// Calls `f` only when the value is absent.
    pub fn on_absence<F>(&self, f: F)
    where
        F: FnOnce(),
    {
        if self.is_absent() {
            f();
        }
    }

    /// Calls `f` only when a concrete value is set.
    pub fn on_value<F>(&self, f: F)
    where
        F: FnOnce(&T),
    {
        if let TriState::Value(v) = self {
            f(v);
        }
    }

    /// Runs `present` or `absent`, whichever matches.
    pub fn visit<P, A>(&self, present: P, absent: A)
    where
        P: FnOnce(Option<&T>),
        A: FnOnce(),
    {
        self.on_presence(present);
        self.on_absence(absent);
    }
}

impl<T> From<T> for TriState<T> {
    fn from(value: T) -> Self {
        TriState::Value(value)
    }
}

impl<T> From<Option<T>> for TriState<T> {
    fn from(value: Option<T>) -> Self {
        TriState::from_option(value)
    }
}

impl<T> From<Option<Option<T>>> for TriState<T> {
    fn from(value: Option<Option<T>>) -> Self {
        match value {
            None => TriState::Absent,
            Some(inner) => TriState::from_option(inner),
        }
    }
}

impl<T> From<TriState<T>> for Option<Option<T>> {
    fn from(value: TriState<T>) -> Self {
        match value {
            TriState::Absent => None,
            TriState::Null => Some(None),
            TriState::Value(v) => Some(Some(v)),
        }
    }
}
