use thiserror::Error;

/// Errors produced by `eco-zones`.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("zone {id:?} has invalid geometry: {reason}")]
    InvalidGeometry { id: String, reason: String },

    #[error("zone id {0:?} appears more than once in a snapshot")]
    DuplicateZone(String),

    #[error("weather region {region:?} is invalid: {reason}")]
    InvalidWeather { region: String, reason: String },

    #[error("constraint source failed: {0}")]
    Source(String),

    #[error("constraint data is stale after {failures} failed refreshes: {last}")]
    Stale { failures: u32, last: String },

    #[error("constraint JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ZoneResult<T> = Result<T, ZoneError>;
