//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use tokio::task;
use tracing::debug;

use eco_core::Timestamp;
use eco_route::{CancelToken, Objective, RoutePreferences};
use eco_service::{ImpactTotals, OptimizationRequest, OptimizeError};

use crate::dto::{
    EstimateBody, EstimateResponse, GreenZonesResponse, HealthResponse, OptimizeBody, RouteResponse,
    VehicleTypes, WeatherResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Cancels the search when the handler future is dropped, e.g. on client
/// disconnect.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| ApiError::BadRequest { field: None, message: rejection.body_text() })
}

// ── Routes ────────────────────────────────────────────────────────────────────

pub async fn optimize_route(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeBody>, JsonRejection>,
) -> ApiResult<Json<RouteResponse>> {
    let req = body(payload)?;

    let resolve = |field: &'static str, text: &str| {
        state
            .gazetteer
            .resolve(text)
            .ok_or_else(|| ApiError::UnknownLocation { field, text: text.to_owned() })
    };
    let origin = resolve("origin", &req.origin)?;
    let destination = resolve("destination", &req.destination)?;

    let objective = req
        .objective
        .as_deref()
        .map(str::parse::<Objective>)
        .transpose()
        .map_err(|message| ApiError::BadRequest { field: Some("objective"), message })?;

    let request = OptimizationRequest {
        origin,
        destination,
        vehicle_type: req.vehicle_type,
        objective,
        departure: req.departure.map(Timestamp),
        preferences: RoutePreferences {
            avoid_highways: req.avoid_highways,
            max_emissions_g: req.max_emissions,
        },
    };
    debug!(?request, "optimize");

    let cancel = CancelToken::new();
    let guard = CancelOnDrop(cancel.clone());
    let service = state.service.clone();
    let result = task::spawn_blocking(move || service.optimize_with_cancel(&request, &cancel))
        .await
        .map_err(|e| OptimizeError::Internal(format!("optimizer task failed: {e}")))?;
    drop(guard);

    Ok(Json(result?.into()))
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

pub async fn vehicle_types(State(state): State<AppState>) -> Json<VehicleTypes> {
    Json(VehicleTypes(state.service.registry().list_profiles().to_vec()))
}

pub async fn estimate_emissions(
    State(state): State<AppState>,
    payload: Result<Json<EstimateBody>, JsonRejection>,
) -> ApiResult<Json<EstimateResponse>> {
    let req = body(payload)?;
    let estimate = state.service.estimate_emissions(&req.vehicle_type, req.distance, req.cargo_weight)?;
    let alternatives = state.service.emission_alternatives(&req.vehicle_type, req.distance)?;
    Ok(Json(EstimateResponse::new(estimate, alternatives)))
}

// ── Read paths ────────────────────────────────────────────────────────────────

pub async fn environmental_impact(State(state): State<AppState>) -> Json<ImpactTotals> {
    Json(state.service.impact())
}

pub async fn green_zones(State(state): State<AppState>, Path(city): Path<String>) -> Json<GreenZonesResponse> {
    let snapshot = state.service.snapshot();
    let zones = snapshot.zones_in_city(&city).into_iter().cloned().collect();
    Json(GreenZonesResponse { city, snapshot_version: snapshot.version, zones })
}

pub async fn weather(State(state): State<AppState>, Path(location): Path<String>) -> ApiResult<Json<WeatherResponse>> {
    let position = state
        .gazetteer
        .resolve(&location)
        .ok_or_else(|| ApiError::UnknownLocation { field: "location", text: location.clone() })?;
    let snapshot = state.service.snapshot();
    let condition = snapshot.weather_at(position, Timestamp::now()).cloned();
    Ok(Json(WeatherResponse::new(location, position, condition, snapshot.version)))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let graph = state.service.graph();
    Json(HealthResponse {
        status: "ok",
        graph_version: graph.version,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        snapshot_version: state.service.snapshot().version,
        stale_constraints: state.service.constraints().is_stale(),
    })
}
