//! The error taxonomy callers see.

use thiserror::Error;

use eco_core::{CoreError, NodeId};
use eco_route::RouteError;
use eco_spatial::SpatialError;
use eco_zones::ZoneError;

/// Errors returned by the optimization service.
///
/// Every variant carries a stable [`kind`](Self::kind) code and, when a
/// request field is to blame, the [`field`](Self::field) name, so clients can
/// render an actionable message.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("unknown vehicle type {key:?}")]
    InvalidVehicleType { key: String },

    #[error("{endpoint} is {distance_m:.0} m from the nearest road (limit {max_snap_m:.0} m)")]
    UnreachableLocation {
        endpoint:   &'static str,
        distance_m: f64,
        max_snap_m: f64,
    },

    #[error("no route from {from} to {to}")]
    NoRouteFound { from: NodeId, to: NodeId },

    #[error("route emits {emissions_g:.0} g CO2e, above the {max_emissions_g:.0} g limit")]
    EmissionsLimitExceeded { emissions_g: f64, max_emissions_g: f64 },

    #[error("constraint data is stale after {failures} failed refreshes")]
    StaleSnapshot { failures: u32 },

    #[error("no road network loaded")]
    GraphUnavailable,

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("constraint source error: {0}")]
    Constraints(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl OptimizeError {
    /// Stable snake_case code.
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizeError::InvalidVehicleType { .. }  => "invalid_vehicle_type",
            OptimizeError::UnreachableLocation { .. } => "unreachable_location",
            OptimizeError::NoRouteFound { .. }        => "no_route_found",
            OptimizeError::EmissionsLimitExceeded { .. } => "emissions_limit_exceeded",
            OptimizeError::StaleSnapshot { .. }       => "stale_snapshot",
            OptimizeError::GraphUnavailable           => "graph_unavailable",
            OptimizeError::Cancelled                  => "cancelled",
            OptimizeError::InvalidInput { .. }        => "invalid_input",
            OptimizeError::Constraints(_)             => "constraint_source",
            OptimizeError::Config(_)                  => "config",
            OptimizeError::Internal(_)                => "internal",
        }
    }

    /// The request field at fault, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            OptimizeError::InvalidVehicleType { .. }            => Some("vehicle_type"),
            OptimizeError::UnreachableLocation { endpoint, .. } => Some(*endpoint),
            OptimizeError::InvalidInput { field, .. }           => Some(*field),
            OptimizeError::EmissionsLimitExceeded { .. }        => Some("max_emissions"),
            _ => None,
        }
    }
}

impl From<CoreError> for OptimizeError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnknownVehicle(key) => OptimizeError::InvalidVehicleType { key },
            other => OptimizeError::Config(other.to_string()),
        }
    }
}

impl From<RouteError> for OptimizeError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::NoRouteFound { from, to, .. } => OptimizeError::NoRouteFound { from, to },
            RouteError::Cancelled => OptimizeError::Cancelled,
            other => OptimizeError::Internal(other.to_string()),
        }
    }
}

impl From<ZoneError> for OptimizeError {
    fn from(e: ZoneError) -> Self {
        match e {
            ZoneError::Stale { failures, .. } => OptimizeError::StaleSnapshot { failures },
            other => OptimizeError::Constraints(other.to_string()),
        }
    }
}

impl From<SpatialError> for OptimizeError {
    fn from(e: SpatialError) -> Self {
        OptimizeError::Config(format!("road network: {e}"))
    }
}

impl From<csv::Error> for OptimizeError {
    fn from(e: csv::Error) -> Self {
        OptimizeError::Internal(format!("route log: {e}"))
    }
}

pub type ServiceResult<T> = Result<T, OptimizeError>;
