//! Error types for the configuration model

use crate::config::LineKind;
use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for model operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A line of one kind was handed to a collection of another kind
    #[error("Wrong line kind: expected {expected} line, found {found} line")]
    WrongLineKind { expected: LineKind, found: LineKind },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}
