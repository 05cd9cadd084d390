//! Edge cost model.
//!
//! Every edge is priced as a [`CostVector`] of distance, duration and
//! emissions, plus a feasibility flag.  The search minimises a weighted sum
//! of the vector; infeasible edges are dropped from the search entirely.
//! [`RoutePreferences`] can inflate the score of highway edges without
//! changing what a traversal actually costs.
//!
//! # Units
//!
//! | Component | Unit        |
//! |-----------|-------------|
//! | distance  | metres      |
//! | duration  | seconds     |
//! | emissions | g CO2e      |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use eco_core::{EdgeId, Timestamp, VehicleProfile};
use eco_spatial::{Edge, RoadClass, RoadNetwork};
use eco_zones::{ConstraintSnapshot, GreenZone};

// ── CostVector ────────────────────────────────────────────────────────────────

/// Per-edge cost before scalar combination.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CostVector {
    pub distance_m: f64,
    pub duration_s: f64,
    pub emissions_g: f64,
    pub feasible: bool,
}

impl CostVector {
    pub const ZERO: CostVector = CostVector { distance_m: 0.0, duration_s: 0.0, emissions_g: 0.0, feasible: true };
}

impl std::ops::Add for CostVector {
    type Output = CostVector;
    fn add(self, rhs: CostVector) -> CostVector {
        CostVector {
            distance_m:  self.distance_m + rhs.distance_m,
            duration_s:  self.duration_s + rhs.duration_s,
            emissions_g: self.emissions_g + rhs.emissions_g,
            feasible:    self.feasible && rhs.feasible,
        }
    }
}

// ── Weights and objectives ────────────────────────────────────────────────────

/// Weights of the scalar search score
/// `distance * d + duration * t + emissions * e`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Per metre.
    pub distance: f64,
    /// Per second.
    pub duration: f64,
    /// Per gram CO2e.
    pub emissions: f64,
}

impl CostWeights {
    /// Default: one second is worth ten metres and one gram five metres.
    pub const BALANCED: CostWeights = CostWeights { distance: 1.0, duration: 10.0, emissions: 5.0 };
    pub const FASTEST:  CostWeights = CostWeights { distance: 0.0, duration: 1.0, emissions: 0.0 };
    pub const SHORTEST: CostWeights = CostWeights { distance: 1.0, duration: 0.0, emissions: 0.0 };
    pub const GREENEST: CostWeights = CostWeights { distance: 0.1, duration: 1.0, emissions: 20.0 };

    #[inline]
    pub fn score(&self, c: &CostVector) -> f64 {
        self.distance * c.distance_m + self.duration * c.duration_s + self.emissions * c.emissions_g
    }

    /// All weights finite and non-negative, with a positive distance or
    /// duration weight.  Edge lengths and durations are positive, so every
    /// edge then scores strictly above zero.
    pub fn is_valid(&self) -> bool {
        let ws = [self.distance, self.duration, self.emissions];
        ws.iter().all(|w| w.is_finite() && *w >= 0.0) && (self.distance > 0.0 || self.duration > 0.0)
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self::BALANCED
    }
}

/// Named weight presets a request can choose from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Balanced,
    Fastest,
    Shortest,
    Greenest,
}

impl Objective {
    pub fn weights(self) -> CostWeights {
        match self {
            Objective::Balanced => CostWeights::BALANCED,
            Objective::Fastest  => CostWeights::FASTEST,
            Objective::Shortest => CostWeights::SHORTEST,
            Objective::Greenest => CostWeights::GREENEST,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Balanced => "balanced",
            Objective::Fastest  => "fastest",
            Objective::Shortest => "shortest",
            Objective::Greenest => "greenest",
        }
    }
}

impl FromStr for Objective {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Objective::Balanced),
            "fastest"  => Ok(Objective::Fastest),
            "shortest" => Ok(Objective::Shortest),
            "greenest" => Ok(Objective::Greenest),
            other => Err(format!("unknown objective {other:?}")),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Preferences ───────────────────────────────────────────────────────────────

/// Score multiplier applied to highway edges when a request avoids them.
pub const HIGHWAY_AVOIDANCE_FACTOR: f64 = 4.0;

/// Per-request routing preferences.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePreferences {
    /// Penalise [`RoadClass::Highway`] edges by [`HIGHWAY_AVOIDANCE_FACTOR`].
    /// Highways stay usable when nothing else connects.
    pub avoid_highways: bool,
    /// Reject a route whose total emissions exceed this many grams CO2e.
    pub max_emissions_g: Option<f64>,
}

// ── CostModel trait ───────────────────────────────────────────────────────────

/// Prices edges for the pathfinder.
///
/// Implementations must return non-negative components and strictly
/// positive scores.  The search never reopens a settled node, and equal-score
/// arrivals are only compared while every predecessor is already settled.
pub trait CostModel {
    fn cost(&self, network: &RoadNetwork, edge: EdgeId) -> CostVector;

    /// Search score of traversing `edge` at `cost`.
    fn score(&self, network: &RoadNetwork, edge: EdgeId, cost: &CostVector) -> f64;
}

// ── EmissionCostModel ─────────────────────────────────────────────────────────

/// Prices edges for one vehicle against one constraint snapshot at one
/// instant.  Cheap to construct; build one per request.
pub struct EmissionCostModel<'a> {
    pub profile:  &'a VehicleProfile,
    pub snapshot: &'a ConstraintSnapshot,
    pub at:       Timestamp,
    pub weights:  CostWeights,
    pub avoid_highways: bool,
}

impl<'a> EmissionCostModel<'a> {
    pub fn new(
        profile: &'a VehicleProfile,
        snapshot: &'a ConstraintSnapshot,
        at: Timestamp,
        weights: CostWeights,
    ) -> Self {
        Self { profile, snapshot, at, weights, avoid_highways: false }
    }

    pub fn avoiding_highways(mut self, avoid: bool) -> Self {
        self.avoid_highways = avoid;
        self
    }

    /// Price `edge`:
    ///
    /// 1. `distance  = length`
    /// 2. `duration  = base_duration × speed_factor × weather duration multiplier`
    /// 3. `emissions = length × emission_factor × weather emission multiplier`
    ///    (multiplier fixed at 1 for vehicles that are not weather-sensitive)
    /// 4. `feasible  = no zone covering the midpoint denies the vehicle now`
    pub fn edge_cost(&self, edge: &Edge) -> CostVector {
        let (duration_mult, emission_mult) = match self.snapshot.weather_at(edge.midpoint, self.at) {
            Some(w) => (
                w.duration_multiplier,
                if self.profile.is_weather_sensitive() { w.emission_multiplier } else { 1.0 },
            ),
            None => (1.0, 1.0),
        };

        CostVector {
            distance_m:  edge.length_m,
            duration_s:  edge.base_duration_s * self.profile.speed_factor * duration_mult,
            emissions_g: edge.length_m * self.profile.emission_factor * emission_mult,
            feasible:    self.blocking_zone(edge).is_none(),
        }
    }

    /// The zone that makes `edge` infeasible, if any.
    pub fn blocking_zone(&self, edge: &Edge) -> Option<&'a GreenZone> {
        self.snapshot.blocking_zone(edge.midpoint, self.profile, self.at)
    }
}

impl CostModel for EmissionCostModel<'_> {
    #[inline]
    fn cost(&self, network: &RoadNetwork, edge: EdgeId) -> CostVector {
        self.edge_cost(&network.edge(edge))
    }

    #[inline]
    fn score(&self, network: &RoadNetwork, edge: EdgeId, cost: &CostVector) -> f64 {
        let base = self.weights.score(cost);
        if self.avoid_highways && network.edge_class[edge.index()] == RoadClass::Highway {
            base * HIGHWAY_AVOIDANCE_FACTOR
        } else {
            base
        }
    }
}
