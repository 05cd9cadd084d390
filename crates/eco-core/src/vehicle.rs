//! Vehicle profiles and the read-only registry the engine resolves them from.
//!
//! Vehicle behaviour is data, not code: every difference between an electric
//! van and a diesel truck is expressed by the numeric fields of
//! [`VehicleProfile`], so the cost model stays a single function.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── Powertrain ───────────────────────────────────────────────────────────────

/// Closed set of propulsion kinds.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Powertrain {
    Electric,
    Hybrid,
    Diesel,
    Petrol,
    Human,
}

impl Powertrain {
    pub fn as_str(self) -> &'static str {
        match self {
            Powertrain::Electric => "electric",
            Powertrain::Hybrid => "hybrid",
            Powertrain::Diesel => "diesel",
            Powertrain::Petrol => "petrol",
            Powertrain::Human => "human",
        }
    }

    /// Whether weather changes energy use by default.  Combustion engines lose
    /// efficiency in cold, rain and snow; electric and human-powered vehicles
    /// are modelled with a fixed multiplier of 1 unless configured otherwise.
    pub fn weather_sensitive_by_default(self) -> bool {
        matches!(self, Powertrain::Hybrid | Powertrain::Diesel | Powertrain::Petrol)
    }
}

impl fmt::Display for Powertrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── VehicleProfile ───────────────────────────────────────────────────────────

/// Cost coefficients for one vehicle type.  Immutable once registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// Lookup key (`"electric"`, `"box_truck"`, …).
    pub key: String,
    /// Human-readable label for the vehicle selector.
    pub name: String,
    pub powertrain: Powertrain,
    /// Grams CO2-equivalent per metre driven.
    pub emission_factor: f64,
    /// Multiplier on an edge's base traversal duration.
    pub speed_factor: f64,
    /// Rated payload in kilograms; scales the cargo surcharge.
    pub cargo_capacity_kg: f64,
    /// Overrides [`Powertrain::weather_sensitive_by_default`].
    #[serde(default)]
    pub weather_sensitive: Option<bool>,
    /// Ids of green zones whose restrictions this vehicle is exempt from.
    #[serde(default)]
    pub exempt_zones: BTreeSet<String>,
}

impl VehicleProfile {
    pub fn new(
        key: &str,
        name: &str,
        powertrain: Powertrain,
        emission_factor: f64,
        speed_factor: f64,
        cargo_capacity_kg: f64,
    ) -> Self {
        Self {
            key: key.to_owned(),
            name: name.to_owned(),
            powertrain,
            emission_factor,
            speed_factor,
            cargo_capacity_kg,
            weather_sensitive: None,
            exempt_zones: BTreeSet::new(),
        }
    }

    /// Grant exemption from the zone with id `zone_id`.
    pub fn with_exemption(mut self, zone_id: &str) -> Self {
        self.exempt_zones.insert(zone_id.to_owned());
        self
    }

    /// `true` if a restriction rule naming `tag` applies to this vehicle:
    /// either the exact profile key or the powertrain name.
    pub fn matches(&self, tag: &str) -> bool {
        tag == "*" || tag == self.key || tag == self.powertrain.as_str()
    }

    #[inline]
    pub fn is_exempt_from(&self, zone_id: &str) -> bool {
        self.exempt_zones.contains(zone_id)
    }

    #[inline]
    pub fn is_weather_sensitive(&self) -> bool {
        self.weather_sensitive
            .unwrap_or_else(|| self.powertrain.weather_sensitive_by_default())
    }

    fn validate(&self) -> CoreResult<()> {
        let bad = |what: &str| {
            CoreError::Config(format!("vehicle {:?}: {what}", self.key))
        };
        if self.key.trim().is_empty() {
            return Err(CoreError::Config("vehicle key must not be empty".into()));
        }
        if !(self.emission_factor.is_finite() && self.emission_factor >= 0.0) {
            return Err(bad("emission_factor must be a non-negative number"));
        }
        if !(self.speed_factor.is_finite() && self.speed_factor > 0.0) {
            return Err(bad("speed_factor must be positive"));
        }
        if !(self.cargo_capacity_kg.is_finite() && self.cargo_capacity_kg > 0.0) {
            return Err(bad("cargo_capacity_kg must be positive"));
        }
        Ok(())
    }
}

// ── VehicleRegistry ──────────────────────────────────────────────────────────

/// Read-only table of vehicle profiles, loaded once at start-up.
///
/// Iteration order is registration order, which is what the UI's vehicle
/// selector shows.
#[derive(Clone, Debug)]
pub struct VehicleRegistry {
    profiles: Vec<VehicleProfile>,
    by_key: FxHashMap<String, usize>,
}

impl VehicleRegistry {
    /// Build a registry, rejecting invalid coefficients and duplicate keys.
    pub fn new(profiles: Vec<VehicleProfile>) -> CoreResult<Self> {
        let mut by_key = FxHashMap::default();
        for (i, p) in profiles.iter().enumerate() {
            p.validate()?;
            if by_key.insert(p.key.clone(), i).is_some() {
                return Err(CoreError::DuplicateVehicle(p.key.clone()));
            }
        }
        Ok(Self { profiles, by_key })
    }

    /// The built-in fleet table.
    ///
    /// | Key            | Powertrain | g CO2e/m | Speed × | Capacity kg |
    /// |----------------|------------|----------|---------|-------------|
    /// | `electric`     | electric   | 0.053    | 1.00    | 400         |
    /// | `hybrid`       | hybrid     | 0.092    | 1.00    | 400         |
    /// | `diesel`       | diesel     | 0.171    | 1.00    | 500         |
    /// | `petrol`       | petrol     | 0.147    | 1.00    | 400         |
    /// | `electric_van` | electric   | 0.060    | 1.10    | 1800        |
    /// | `sprinter_van` | diesel     | 0.200    | 1.10    | 2000        |
    /// | `box_truck`    | diesel     | 0.300    | 1.25    | 5000        |
    /// | `cargo_bike`   | human      | 0.000    | 2.50    | 100         |
    pub fn builtin() -> Self {
        let profiles = builtin_profiles();
        let by_key = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key.clone(), i))
            .collect();
        Self { profiles, by_key }
    }

    /// Look up a profile by type key.
    pub fn get_profile(&self, key: &str) -> CoreResult<&VehicleProfile> {
        self.by_key
            .get(key)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| CoreError::UnknownVehicle(key.to_owned()))
    }

    /// All profiles in stable registration order.
    pub fn list_profiles(&self) -> &[VehicleProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for VehicleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Profiles backing [`VehicleRegistry::builtin`].
pub fn builtin_profiles() -> Vec<VehicleProfile> {
    use Powertrain::*;
    vec![
        VehicleProfile::new("electric",     "Electric Car", Electric, 0.053, 1.00,   400.0),
        VehicleProfile::new("hybrid",       "Hybrid Car",   Hybrid,   0.092, 1.00,   400.0),
        VehicleProfile::new("diesel",       "Diesel Car",   Diesel,   0.171, 1.00,   500.0),
        VehicleProfile::new("petrol",       "Petrol Car",   Petrol,   0.147, 1.00,   400.0),
        VehicleProfile::new("electric_van", "Electric Van", Electric, 0.060, 1.10, 1_800.0),
        VehicleProfile::new("sprinter_van", "Sprinter Van", Diesel,   0.200, 1.10, 2_000.0),
        VehicleProfile::new("box_truck",    "Box Truck",    Diesel,   0.300, 1.25, 5_000.0),
        VehicleProfile::new("cargo_bike",   "Cargo Bike",   Human,    0.000, 2.50,   100.0),
    ]
}
