//! HTTP error rendering.
//!
//! Every failure is a JSON body `{ "error": kind, "field": field?, "message": text }`.
//!
//! | Kind                                         | Status |
//! |----------------------------------------------|--------|
//! | `invalid_vehicle_type`, `invalid_input`, `invalid_request` | 400 |
//! | `no_route_found`                             | 404    |
//! | `unreachable_location`, `unknown_location`   | 422    |
//! | `stale_snapshot`, `graph_unavailable`, `constraint_source`, `cancelled` | 503 |
//! | `config`, `internal`                         | 500    |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use eco_service::OptimizeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] OptimizeError),

    #[error("could not resolve {field} {text:?} to a location")]
    UnknownLocation { field: &'static str, text: String },

    #[error("{message}")]
    BadRequest { field: Option<&'static str>, message: String },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    message: String,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.kind(),
            ApiError::UnknownLocation { .. } => "unknown_location",
            ApiError::BadRequest { .. } => "invalid_request",
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Engine(e) => e.field(),
            ApiError::UnknownLocation { field, .. } => Some(*field),
            ApiError::BadRequest { field, .. } => *field,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) => match e {
                OptimizeError::InvalidVehicleType { .. } | OptimizeError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                OptimizeError::NoRouteFound { .. } => StatusCode::NOT_FOUND,
                OptimizeError::UnreachableLocation { .. }
                | OptimizeError::EmissionsLimitExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                OptimizeError::StaleSnapshot { .. }
                | OptimizeError::GraphUnavailable
                | OptimizeError::Constraints(_)
                | OptimizeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                OptimizeError::Config(_) | OptimizeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::UnknownLocation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "request failed");
        }
        let body = ErrorBody { error: self.kind(), field: self.field(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
