//! `eco-api` — HTTP/JSON surface of the eco-route engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                          |
//! |--------------|---------------------------------------------------|
//! | [`handlers`] | axum handlers, one per endpoint                   |
//! | [`dto`]      | request and response bodies                       |
//! | [`geocode`]  | `Gazetteer`: `"lat,lon"` or configured place names |
//! | [`error`]    | `ApiError` → `{error, field, message}` JSON       |
//! | [`state`]    | `AppState` shared by handlers                     |
//!
//! # Endpoints
//!
//! Served at the root and again under `/api`, the prefix the dashboard uses.
//!
//! | Method | Path                             |
//! |--------|----------------------------------|
//! | POST   | `/routes/optimize`               |
//! | GET    | `/vehicles/types`                |
//! | POST   | `/vehicles/estimate-emissions`   |
//! | GET    | `/metrics/environmental-impact`  |
//! | GET    | `/green-zones/:city`             |
//! | GET    | `/weather/:location`             |
//! | GET    | `/health`                        |

pub mod dto;
pub mod error;
pub mod geocode;
pub mod handlers;
pub mod state;


use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use geocode::Gazetteer;
pub use state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/routes/optimize", post(handlers::optimize_route))
        .route("/vehicles/types", get(handlers::vehicle_types))
        .route("/vehicles/estimate-emissions", post(handlers::estimate_emissions))
        .route("/metrics/environmental-impact", get(handlers::environmental_impact))
        .route("/green-zones/:city", get(handlers::green_zones))
        .route("/weather/:location", get(handlers::weather))
        .route("/health", get(handlers::health))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
