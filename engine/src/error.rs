//! Engine error types

use thiserror::Error;

/// Conditions the engine surfaces to its caller.
///
/// Missing weather fields and unreadable stability records are recovered
/// internally and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown water body type: {0}")]
    UnknownWaterBody(String),

    #[error("Invalid weather snapshot: {0}")]
    InvalidSnapshot(&'static str),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Stability store error: {0}")]
    Store(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
