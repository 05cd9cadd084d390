//! Green zones and their vehicle restrictions.

use geo::{Coord, Intersects, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use eco_core::{DailyWindow, GeoPoint, TimeWindow, Timestamp, VehicleProfile};

use crate::{ZoneError, ZoneResult};

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Area covered by a zone or weather region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneGeometry {
    /// Points within `radius_m` (haversine) of `center`, boundary included.
    Circle { center: GeoPoint, radius_m: f64 },
    /// Simple polygon in lat/lon space, boundary included.  The ring is
    /// closed implicitly.
    Polygon { vertices: Vec<GeoPoint> },
}

impl ZoneGeometry {
    pub fn circle(center: GeoPoint, radius_m: f64) -> Self {
        ZoneGeometry::Circle { center, radius_m }
    }

    pub fn polygon(vertices: Vec<GeoPoint>) -> Self {
        ZoneGeometry::Polygon { vertices }
    }

    /// Check the geometry is usable; `reason` text on failure.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            ZoneGeometry::Circle { center, radius_m } => {
                if !center.is_valid() {
                    return Err(format!("center {center} is not a valid coordinate"));
                }
                if !(radius_m.is_finite() && *radius_m > 0.0) {
                    return Err(format!("radius must be positive, got {radius_m}"));
                }
            }
            ZoneGeometry::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(format!("polygon needs at least 3 vertices, got {}", vertices.len()));
                }
                if let Some(v) = vertices.iter().find(|v| !v.is_valid()) {
                    return Err(format!("vertex {v} is not a valid coordinate"));
                }
            }
        }
        Ok(())
    }

    /// Boxes `([min_lat, min_lon], [max_lat, max_lon])` that together cover
    /// the area.  A circle crossing the antimeridian yields two boxes.
    /// Polygons are planar in lat/lon, so their vertex box is never split.
    pub fn bounding_boxes(&self) -> Vec<([f64; 2], [f64; 2])> {
        match self {
            ZoneGeometry::Circle { center, radius_m } => center.covering_boxes(*radius_m),
            ZoneGeometry::Polygon { vertices } => {
                let mut lo = [f64::INFINITY, f64::INFINITY];
                let mut hi = [f64::NEG_INFINITY, f64::NEG_INFINITY];
                for v in vertices {
                    lo = [lo[0].min(v.lat), lo[1].min(v.lon)];
                    hi = [hi[0].max(v.lat), hi[1].max(v.lon)];
                }
                vec![(lo, hi)]
            }
        }
    }

    /// Compile into a shape ready for repeated containment tests.
    pub(crate) fn to_shape(&self) -> Shape {
        match self {
            ZoneGeometry::Circle { center, radius_m } => Shape::Circle { center: *center, radius_m: *radius_m },
            ZoneGeometry::Polygon { vertices } => {
                let ring: Vec<Coord<f64>> = vertices
                    .iter()
                    .map(|v| Coord { x: v.lon, y: v.lat })
                    .collect();
                Shape::Polygon(Polygon::new(LineString::new(ring), vec![]))
            }
        }
    }

    /// One-off containment test.  Snapshots use precompiled shapes instead.
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.to_shape().contains(p)
    }
}

/// A [`ZoneGeometry`] with its polygon prebuilt.
#[derive(Clone, Debug)]
pub(crate) enum Shape {
    Circle { center: GeoPoint, radius_m: f64 },
    Polygon(Polygon<f64>),
}

impl Shape {
    pub(crate) fn contains(&self, p: GeoPoint) -> bool {
        match self {
            Shape::Circle { center, radius_m } => center.distance_m(p) <= *radius_m,
            Shape::Polygon(poly) => poly.intersects(&Point::new(p.lon, p.lat)),
        }
    }
}

// ── Restrictions ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Allow,
    Deny,
}

/// One entry of a zone's restriction table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestrictionRule {
    /// Profile key, powertrain name, or `"*"` for every vehicle.
    pub vehicle: String,
    pub access: Access,
    /// Daily hours during which the rule applies; absent means all day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DailyWindow>,
}

impl RestrictionRule {
    pub fn deny(vehicle: &str) -> Self {
        Self { vehicle: vehicle.to_owned(), access: Access::Deny, window: None }
    }

    pub fn allow(vehicle: &str) -> Self {
        Self { vehicle: vehicle.to_owned(), access: Access::Allow, window: None }
    }

    pub fn during(mut self, window: DailyWindow) -> Self {
        self.window = Some(window);
        self
    }

    fn applies(&self, profile: &VehicleProfile, at: Timestamp) -> bool {
        profile.matches(&self.vehicle) && self.window.is_none_or(|w| w.contains(at))
    }
}

/// Ordered rule table: the first rule that applies decides, otherwise
/// `default_access`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Restriction {
    #[serde(default)]
    pub rules: Vec<RestrictionRule>,
    #[serde(default)]
    pub default_access: Access,
}

impl Restriction {
    pub fn access_for(&self, profile: &VehicleProfile, at: Timestamp) -> Access {
        self.rules
            .iter()
            .find(|r| r.applies(profile, at))
            .map_or(self.default_access, |r| r.access)
    }
}

// ── GreenZone ─────────────────────────────────────────────────────────────────

/// A geographically bounded area with vehicle-specific access rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GreenZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: String,
    /// Free-form category shown by the UI ("park", "residential", …).
    #[serde(default)]
    pub kind: String,
    pub geometry: ZoneGeometry,
    #[serde(default)]
    pub restriction: Restriction,
    /// When the zone is in force at all.
    #[serde(default)]
    pub active: TimeWindow,
    /// Display text such as "No heavy vehicles".
    #[serde(default)]
    pub notes: Vec<String>,
}

impl GreenZone {
    pub fn new(id: &str, name: &str, geometry: ZoneGeometry) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            city: String::new(),
            kind: String::new(),
            geometry,
            restriction: Restriction::default(),
            active: TimeWindow::ALWAYS,
            notes: Vec::new(),
        }
    }

    pub fn in_city(mut self, city: &str) -> Self {
        self.city = city.to_owned();
        self
    }

    pub fn with_rule(mut self, rule: RestrictionRule) -> Self {
        self.restriction.rules.push(rule);
        self
    }

    pub fn active_during(mut self, window: TimeWindow) -> Self {
        self.active = window;
        self
    }

    /// `true` if this zone bars `profile` from entering at `at`.
    pub fn denies(&self, profile: &VehicleProfile, at: Timestamp) -> bool {
        self.active.contains(at)
            && !profile.is_exempt_from(&self.id)
            && self.restriction.access_for(profile, at) == Access::Deny
    }

    pub(crate) fn validate(&self) -> ZoneResult<()> {
        if self.id.trim().is_empty() {
            return Err(ZoneError::InvalidGeometry {
                id: self.id.clone(),
                reason: "zone id must not be empty".into(),
            });
        }
        self.geometry
            .validate()
            .map_err(|reason| ZoneError::InvalidGeometry { id: self.id.clone(), reason })
    }
}
