//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by `eco-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown vehicle type {0:?}")]
    UnknownVehicle(String),

    #[error("vehicle type {0:?} registered twice")]
    DuplicateVehicle(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `eco-core`.
pub type CoreResult<T> = Result<T, CoreError>;
