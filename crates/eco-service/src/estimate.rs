//! Path-free emission estimates.
//!
//! ```text
//! base         = distance × emission_factor
//! excess       = max(0, cargo − free_capacity)
//! cargo_factor = 1 + surcharge_rate × excess / cargo_capacity
//! emissions    = base × cargo_factor
//! efficiency   = clamp(100 − (cargo_factor − 1) × 30, 0, 100)
//! ```

use serde::{Deserialize, Serialize};

use eco_core::{VehicleProfile, VehicleRegistry};

use crate::{OptimizeError, ServiceResult};

/// Linear cargo surcharge above a free allowance.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoPolicy {
    /// Payload carried without surcharge.
    pub free_capacity_kg: f64,
    /// Extra emissions, as a fraction of base, for a full rated load above
    /// the allowance.
    pub surcharge_rate: f64,
}

impl Default for CargoPolicy {
    fn default() -> Self {
        Self { free_capacity_kg: 100.0, surcharge_rate: 0.2 }
    }
}

impl CargoPolicy {
    pub fn cargo_factor(&self, profile: &VehicleProfile, cargo_kg: f64) -> f64 {
        let excess = (cargo_kg - self.free_capacity_kg).max(0.0);
        1.0 + self.surcharge_rate * excess / profile.cargo_capacity_kg
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmissionEstimate {
    pub vehicle_type: String,
    pub distance_m: f64,
    pub cargo_kg: f64,
    /// Grams CO2e including the cargo surcharge.
    pub emissions_g: f64,
    /// Grams CO2e for the empty vehicle.
    pub base_emissions_g: f64,
    pub cargo_factor: f64,
    /// 0–100; 100 means no cargo penalty.
    pub efficiency_score: f64,
}

/// A vehicle that would emit less over the same distance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmissionAlternative {
    pub vehicle_type: String,
    pub name: String,
    pub emissions_g: f64,
    pub savings_g: f64,
}

fn check_non_negative(field: &'static str, v: f64) -> ServiceResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(OptimizeError::InvalidInput { field, reason: format!("must be a non-negative number, got {v}") })
    }
}

/// Estimate emissions for driving `distance_m` with `cargo_kg` aboard.
pub fn estimate_emissions(
    profile: &VehicleProfile,
    distance_m: f64,
    cargo_kg: f64,
    policy: &CargoPolicy,
) -> ServiceResult<EmissionEstimate> {
    check_non_negative("distance", distance_m)?;
    check_non_negative("cargo_weight", cargo_kg)?;

    let base = distance_m * profile.emission_factor;
    let cargo_factor = policy.cargo_factor(profile, cargo_kg);
    let efficiency_score = (100.0 - (cargo_factor - 1.0) * 30.0).clamp(0.0, 100.0);

    Ok(EmissionEstimate {
        vehicle_type: profile.key.clone(),
        distance_m,
        cargo_kg,
        emissions_g: base * cargo_factor,
        base_emissions_g: base,
        cargo_factor,
        efficiency_score,
    })
}

/// Registered vehicles that beat `current` over `distance_m`, cleanest first.
/// Equal emissions keep registration order.
pub fn emission_alternatives(
    registry: &VehicleRegistry,
    current: &VehicleProfile,
    distance_m: f64,
) -> ServiceResult<Vec<EmissionAlternative>> {
    check_non_negative("distance", distance_m)?;
    let own = distance_m * current.emission_factor;

    let mut out: Vec<EmissionAlternative> = registry
        .list_profiles()
        .iter()
        .filter(|p| p.key != current.key)
        .map(|p| (p, distance_m * p.emission_factor))
        .filter(|(_, e)| *e < own)
        .map(|(p, e)| EmissionAlternative {
            vehicle_type: p.key.clone(),
            name: p.name.clone(),
            emissions_g: e,
            savings_g: own - e,
        })
        .collect();
    out.sort_by(|a, b| a.emissions_g.total_cmp(&b.emissions_g));
    Ok(out)
}
