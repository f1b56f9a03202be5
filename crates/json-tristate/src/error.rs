use thiserror::Error;

/// Errors raised when reading a [`TriState`](crate::TriState).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TriStateError {
    /// The payload was read from an absent value. Callers must check
    /// presence first.
    #[error("value is absent")]
    Absent,
}
