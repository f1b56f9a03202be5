//! json-tristate - absent / null / value field type for JSON object models.
//!
//! A JSON payload can say three different things about an optional field:
//! nothing at all, an explicit `null`, or a concrete value. `Option<T>`
//! collapses the first two, which breaks partial-update (PATCH) semantics.
//! [`TriState`] keeps them apart.
//!
//! With serde, pair the type with `default` and `skip_serializing_if` so a
//! missing key decodes to [`TriState::Absent`] and an absent field is never
//! written. Leaving out `default` is not an error: serde then reads a missing
//! key as [`TriState::Null`].
//!
//! ```
//! use json_tristate::TriState;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Patch {
//!     #[serde(default, skip_serializing_if = "TriState::is_absent")]
//!     name: TriState<String>,
//! }
//! ```

mod codec;
mod error;
mod tri_state;

pub use error::TriStateError;
pub use tri_state::{Presence, TriState};
