//! Engine configuration.
//!
//! Read from a JSON file; every field has a default so `{}` is a valid
//! configuration (built-in fleet, no data paths).
//!
//! ```json
//! {
//!   "max_snap_distance_m": 500,
//!   "objective": "balanced",
//!   "cargo": { "free_capacity_kg": 100, "surcharge_rate": 0.2 },
//!   "nodes_csv": "data/nodes.csv",
//!   "edges_csv": "data/edges.csv",
//!   "constraints_json": "data/constraints.json",
//!   "places": { "india gate": { "lat": 28.6129, "lon": 77.2295 } }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use eco_core::vehicle::builtin_profiles;
use eco_core::{CoreError, CoreResult, GeoPoint, VehicleProfile, VehicleRegistry};
use eco_route::Objective;

use crate::estimate::CargoPolicy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Coordinates farther than this from every road node are rejected.
    pub max_snap_distance_m: f64,

    /// Weighting used when a request names no objective.
    pub objective: Objective,

    pub cargo: CargoPolicy,

    /// Consecutive failed constraint refreshes before data is flagged stale.
    pub max_refresh_failures: u32,

    /// Fleet table.  Defaults to the built-in profiles.
    pub vehicles: Vec<VehicleProfile>,

    /// Reference vehicle for the environmental-impact savings figure.
    pub baseline_vehicle: String,

    pub nodes_csv: Option<PathBuf>,
    pub edges_csv: Option<PathBuf>,
    pub constraints_json: Option<PathBuf>,
    pub route_log_csv: Option<PathBuf>,

    /// Seconds between re-reads of `constraints_json`; 0 disables polling.
    pub constraints_refresh_s: u64,

    /// Named places the geocoder resolves, matched case-insensitively.
    pub places: BTreeMap<String, GeoPoint>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_snap_distance_m: 500.0,
            objective: Objective::Balanced,
            cargo: CargoPolicy::default(),
            max_refresh_failures: 3,
            vehicles: builtin_profiles(),
            baseline_vehicle: "diesel".to_owned(),
            nodes_csv: None,
            edges_csv: None,
            constraints_json: None,
            route_log_csv: None,
            constraints_refresh_s: 300,
            places: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let config: EngineConfig =
            serde_json::from_reader(reader).map_err(|e| CoreError::Parse(format!("engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.max_snap_distance_m.is_finite() && self.max_snap_distance_m > 0.0) {
            return Err(CoreError::Config("max_snap_distance_m must be positive".into()));
        }
        if !(self.cargo.free_capacity_kg.is_finite() && self.cargo.free_capacity_kg >= 0.0) {
            return Err(CoreError::Config("cargo.free_capacity_kg must be non-negative".into()));
        }
        if !(self.cargo.surcharge_rate.is_finite() && self.cargo.surcharge_rate >= 0.0) {
            return Err(CoreError::Config("cargo.surcharge_rate must be non-negative".into()));
        }
        if self.nodes_csv.is_some() != self.edges_csv.is_some() {
            return Err(CoreError::Config("nodes_csv and edges_csv must be given together".into()));
        }
        if let Some((name, _)) = self.places.iter().find(|(_, p)| !p.is_valid()) {
            return Err(CoreError::Config(format!("place {name:?} has an invalid coordinate")));
        }
        let registry = self.registry()?;
        if registry.is_empty() {
            return Err(CoreError::Config("at least one vehicle profile is required".into()));
        }
        registry
            .get_profile(&self.baseline_vehicle)
            .map_err(|_| CoreError::Config(format!("baseline vehicle {:?} is not registered", self.baseline_vehicle)))?;
        Ok(())
    }

    /// Build the vehicle registry described by `vehicles`.
    pub fn registry(&self) -> CoreResult<VehicleRegistry> {
        VehicleRegistry::new(self.vehicles.clone())
    }
}
