//! Weather conditions and their cost multipliers.

use serde::{Deserialize, Serialize};

use eco_core::TimeWindow;

use crate::zone::ZoneGeometry;

fn one() -> f64 {
    1.0
}

/// Weather affecting a region for a validity window.
///
/// `duration_multiplier` scales traversal time for every vehicle;
/// `emission_multiplier` scales emissions for weather-sensitive vehicles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Region key; when regions overlap the lowest key wins.
    pub region: String,
    pub area: ZoneGeometry,
    #[serde(default = "one")]
    pub duration_multiplier: f64,
    #[serde(default = "one")]
    pub emission_multiplier: f64,
    #[serde(default)]
    pub valid: TimeWindow,
    /// Short description ("rain", "snow", "clear").
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
}

impl WeatherCondition {
    pub fn new(region: &str, area: ZoneGeometry, duration_multiplier: f64, emission_multiplier: f64) -> Self {
        Self {
            region: region.to_owned(),
            area,
            duration_multiplier,
            emission_multiplier,
            valid: TimeWindow::ALWAYS,
            summary: String::new(),
            temperature_c: None,
        }
    }

    /// Derive multipliers from raw observations.
    ///
    /// Emissions: below 0 °C ×1.2, above 30 °C ×1.1, any rain ×1.15, any
    /// snow ×1.25.  Duration: rain ×1.1, snow ×1.3.  Factors compound.
    pub fn from_observation(
        region: &str,
        area: ZoneGeometry,
        valid: TimeWindow,
        temperature_c: f64,
        rain_mm: f64,
        snow_mm: f64,
    ) -> Self {
        let mut emission = 1.0;
        let mut duration = 1.0;
        let mut summary = Vec::new();

        if temperature_c < 0.0 {
            emission *= 1.2;
            summary.push("cold");
        } else if temperature_c > 30.0 {
            emission *= 1.1;
            summary.push("hot");
        }
        if rain_mm > 0.0 {
            emission *= 1.15;
            duration *= 1.1;
            summary.push("rain");
        }
        if snow_mm > 0.0 {
            emission *= 1.25;
            duration *= 1.3;
            summary.push("snow");
        }
        if summary.is_empty() {
            summary.push("clear");
        }

        Self {
            region: region.to_owned(),
            area,
            duration_multiplier: duration,
            emission_multiplier: emission,
            valid,
            summary: summary.join(", "),
            temperature_c: Some(temperature_c),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        self.area.validate()?;
        for (what, m) in [("duration", self.duration_multiplier), ("emission", self.emission_multiplier)] {
            if !(m.is_finite() && m > 0.0) {
                return Err(format!("{what} multiplier must be positive, got {m}"));
            }
        }
        Ok(())
    }
}
