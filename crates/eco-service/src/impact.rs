//! Consumers of finished routes.
//!
//! | Sink           | Keeps                                              |
//! |----------------|----------------------------------------------------|
//! | `ImpactLedger` | running totals for `/metrics/environmental-impact` |
//! | `CsvRouteLog`  | one CSV row per route                              |

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use csv::Writer;
use serde::Serialize;

use eco_core::{Timestamp, VehicleProfile};
use eco_route::Route;

use crate::ServiceResult;

/// Receives every successfully optimised route.
pub trait RouteSink: Send + Sync {
    fn record(&self, route: &Route, profile: &VehicleProfile) -> ServiceResult<()>;
}

// ── ImpactLedger ──────────────────────────────────────────────────────────────

/// Aggregate figures over all recorded routes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ImpactTotals {
    pub routes: u64,
    pub distance_m: f64,
    pub duration_s: f64,
    pub emissions_g: f64,
    /// What the same routes would have emitted in the baseline vehicle.
    pub baseline_emissions_g: f64,
    /// `baseline_emissions_g - emissions_g`.
    pub savings_g: f64,
    pub routes_by_vehicle: BTreeMap<String, u64>,
}

/// Thread-safe running totals.
pub struct ImpactLedger {
    baseline_key: String,
    baseline_factor: f64,
    totals: Mutex<ImpactTotals>,
}

impl ImpactLedger {
    /// Savings are measured against `baseline` driving the same distance.
    pub fn new(baseline: &VehicleProfile) -> Self {
        Self {
            baseline_key: baseline.key.clone(),
            baseline_factor: baseline.emission_factor,
            totals: Mutex::new(ImpactTotals::default()),
        }
    }

    pub fn baseline_vehicle(&self) -> &str {
        &self.baseline_key
    }

    /// Copy of the current totals.
    pub fn totals(&self) -> ImpactTotals {
        self.totals.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RouteSink for ImpactLedger {
    fn record(&self, route: &Route, profile: &VehicleProfile) -> ServiceResult<()> {
        let baseline = route.distance_m * self.baseline_factor;
        let mut t = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        t.routes += 1;
        t.distance_m += route.distance_m;
        t.duration_s += route.duration_s;
        t.emissions_g += route.emissions_g;
        t.baseline_emissions_g += baseline;
        t.savings_g = t.baseline_emissions_g - t.emissions_g;
        *t.routes_by_vehicle.entry(profile.key.clone()).or_default() += 1;
        Ok(())
    }
}

// ── CsvRouteLog ───────────────────────────────────────────────────────────────

/// Appends one row per route to a CSV file.
pub struct CsvRouteLog {
    writer: Mutex<Writer<File>>,
}

impl CsvRouteLog {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> ServiceResult<Self> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record([
            "recorded_at",
            "vehicle_type",
            "origin_node",
            "destination_node",
            "edges",
            "distance_m",
            "duration_s",
            "emissions_g",
            "graph_version",
            "snapshot_version",
        ])?;
        writer.flush().map_err(csv::Error::from)?;
        Ok(Self { writer: Mutex::new(writer) })
    }
}

impl RouteSink for CsvRouteLog {
    fn record(&self, route: &Route, profile: &VehicleProfile) -> ServiceResult<()> {
        let mut w = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        w.write_record(&[
            Timestamp::now().0.to_string(),
            profile.key.clone(),
            route.origin.0.to_string(),
            route.destination.0.to_string(),
            route.edges.len().to_string(),
            format!("{:.1}", route.distance_m),
            format!("{:.1}", route.duration_s),
            format!("{:.3}", route.emissions_g),
            route.graph_version.to_string(),
            route.snapshot_version.to_string(),
        ])?;
        w.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
