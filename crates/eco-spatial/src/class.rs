//! Road classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SpatialError;

/// Functional class of a road segment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Highway,
    Arterial,
    Local,
}

impl RoadClass {
    /// Assumed free-flow speed (m/s), used when map data carries no duration.
    pub fn default_speed_mps(self) -> f64 {
        match self {
            RoadClass::Highway  => 27.8, // ~100 km/h
            RoadClass::Arterial => 13.9, // ~50 km/h
            RoadClass::Local    => 8.3,  // ~30 km/h
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Highway  => "highway",
            RoadClass::Arterial => "arterial",
            RoadClass::Local    => "local",
        }
    }
}

impl FromStr for RoadClass {
    type Err = SpatialError;

    /// Accepts the three class names plus common OSM `highway=*` values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highway" | "motorway" | "motorway_link" | "trunk" | "trunk_link" => {
                Ok(RoadClass::Highway)
            }
            "arterial" | "primary" | "primary_link" | "secondary" | "secondary_link" => {
                Ok(RoadClass::Arterial)
            }
            "local" | "tertiary" | "tertiary_link" | "residential" | "living_street"
            | "service" | "unclassified" => Ok(RoadClass::Local),
            other => Err(SpatialError::Parse(format!("unknown road class {other:?}"))),
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
