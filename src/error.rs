//! Validation errors surfaced to the input field

use thiserror::Error;

/// Rejection of a duration typed into a timer's input field.
///
/// The edit is not applied when this is returned; the field keeps its last
/// valid value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("duration is empty")]
    Empty,
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("expected minutes or mm:ss, got {0} segments")]
    WrongSegmentCount(usize),
}
