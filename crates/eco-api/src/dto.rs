//! Request and response bodies.
//!
//! Units on the wire: metres, seconds, grams CO2e.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use eco_core::{GeoPoint, VehicleProfile};
use eco_route::Objective;
use eco_service::{EmissionAlternative, EmissionEstimate, OptimizationResult};
use eco_zones::{GreenZone, WeatherCondition};

// ── /routes/optimize ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptimizeBody {
    pub origin: String,
    pub destination: String,
    pub vehicle_type: String,
    #[serde(default)]
    pub objective: Option<String>,
    /// Unix seconds; defaults to now.
    #[serde(default)]
    pub departure: Option<i64>,
    #[serde(default)]
    pub avoid_highways: bool,
    /// Emission ceiling in grams CO2e.
    #[serde(default)]
    pub max_emissions: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub distance: f64,
    pub duration: f64,
    pub emissions: f64,
    pub waypoints: Vec<GeoPoint>,
    pub vehicle_type: String,
    pub objective: Objective,
    pub edges: usize,
    pub stale_constraints: bool,
    pub graph_version: u64,
    pub snapshot_version: u64,
}

impl From<OptimizationResult> for RouteResponse {
    fn from(r: OptimizationResult) -> Self {
        Self {
            distance: r.route.distance_m,
            duration: r.route.duration_s,
            emissions: r.route.emissions_g,
            edges: r.route.edges.len(),
            graph_version: r.route.graph_version,
            snapshot_version: r.route.snapshot_version,
            waypoints: r.route.waypoints,
            vehicle_type: r.vehicle_type,
            objective: r.objective,
            stale_constraints: r.stale_constraints,
        }
    }
}

// ── /vehicles/types ───────────────────────────────────────────────────────────

/// Key → summary map, serialized in registration order.
pub struct VehicleTypes(pub Vec<VehicleProfile>);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VehicleTypeSummary<'a> {
    name: &'a str,
    powertrain: &'a str,
    emission_factor: f64,
    speed_factor: f64,
    cargo_capacity_kg: f64,
}

impl Serialize for VehicleTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for p in &self.0 {
            map.serialize_entry(
                &p.key,
                &VehicleTypeSummary {
                    name: &p.name,
                    powertrain: p.powertrain.as_str(),
                    emission_factor: p.emission_factor,
                    speed_factor: p.speed_factor,
                    cargo_capacity_kg: p.cargo_capacity_kg,
                },
            )?;
        }
        map.end()
    }
}

// ── /vehicles/estimate-emissions ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EstimateBody {
    pub vehicle_type: String,
    /// Metres.
    pub distance: f64,
    /// Kilograms.
    #[serde(default)]
    pub cargo_weight: f64,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub vehicle_type: String,
    pub distance: f64,
    pub cargo_weight: f64,
    pub emissions: f64,
    pub base_emissions: f64,
    pub cargo_factor: f64,
    pub efficiency_score: f64,
    pub alternatives: Vec<EmissionAlternative>,
}

impl EstimateResponse {
    pub fn new(e: EmissionEstimate, alternatives: Vec<EmissionAlternative>) -> Self {
        Self {
            vehicle_type: e.vehicle_type,
            distance: e.distance_m,
            cargo_weight: e.cargo_kg,
            emissions: e.emissions_g,
            base_emissions: e.base_emissions_g,
            cargo_factor: e.cargo_factor,
            efficiency_score: e.efficiency_score,
            alternatives,
        }
    }
}

// ── /green-zones, /weather, /health ───────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GreenZonesResponse {
    pub city: String,
    pub snapshot_version: u64,
    pub zones: Vec<GreenZone>,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub location: String,
    pub position: GeoPoint,
    /// Covering region, absent for neutral weather.
    pub region: Option<String>,
    pub summary: String,
    pub duration_multiplier: f64,
    pub emission_multiplier: f64,
    pub temperature_c: Option<f64>,
    pub snapshot_version: u64,
}

impl WeatherResponse {
    pub fn new(location: String, position: GeoPoint, w: Option<WeatherCondition>, snapshot_version: u64) -> Self {
        match w {
            Some(w) => Self {
                location,
                position,
                region: Some(w.region),
                summary: w.summary,
                duration_multiplier: w.duration_multiplier,
                emission_multiplier: w.emission_multiplier,
                temperature_c: w.temperature_c,
                snapshot_version,
            },
            None => Self {
                location,
                position,
                region: None,
                summary: "clear".to_owned(),
                duration_multiplier: 1.0,
                emission_multiplier: 1.0,
                temperature_c: None,
                snapshot_version,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub graph_version: u64,
    pub nodes: usize,
    pub edges: usize,
    pub snapshot_version: u64,
    pub stale_constraints: bool,
}
