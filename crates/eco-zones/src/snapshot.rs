//! Immutable, versioned bundles of zones and weather.
//!
//! Lookups are pure functions over one snapshot.  Candidate areas come from
//! an R-tree over bounding boxes; the exact shape test runs only on those.

use rstar::{RTree, RTreeObject, AABB};

use eco_core::{GeoPoint, Timestamp, VehicleProfile};

use crate::weather::WeatherCondition;
use crate::zone::{GreenZone, Shape};
use crate::{ZoneError, ZoneResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Bounding box of the area at `idx` in the owning vector.
#[derive(Clone, Debug)]
struct AreaEntry {
    bbox: AABB<[f64; 2]>,
    idx: usize,
}

impl RTreeObject for AreaEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

/// Indices of the areas with a bounding box containing `p`, ascending.
fn candidates(index: &RTree<AreaEntry>, p: GeoPoint) -> Vec<usize> {
    let mut idx: Vec<usize> = index
        .locate_in_envelope_intersecting(&AABB::from_point([p.lat, p.lon]))
        .map(|e| e.idx)
        .collect();
    idx.sort_unstable();
    idx.dedup();
    idx
}

// ── ConstraintSnapshot ────────────────────────────────────────────────────────

/// Every green zone and weather condition in force as of `as_of`.
///
/// Zones are kept sorted by id and weather by region key, so every lookup
/// result is in a deterministic order.
#[derive(Debug)]
pub struct ConstraintSnapshot {
    /// Assigned by [`ConstraintStore`](crate::ConstraintStore); 0 = never published.
    pub version: u64,
    pub as_of: Timestamp,
    zones: Vec<GreenZone>,
    zone_shapes: Vec<Shape>,
    zone_index: RTree<AreaEntry>,
    weather: Vec<WeatherCondition>,
    weather_shapes: Vec<Shape>,
    weather_index: RTree<AreaEntry>,
}

impl ConstraintSnapshot {
    /// Validate and index `zones` and `weather`.
    pub fn build(
        mut zones: Vec<GreenZone>,
        mut weather: Vec<WeatherCondition>,
        as_of: Timestamp,
    ) -> ZoneResult<Self> {
        for z in &zones {
            z.validate()?;
        }
        zones.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = zones.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(ZoneError::DuplicateZone(pair[0].id.clone()));
        }
        for w in &weather {
            w.validate().map_err(|reason| ZoneError::InvalidWeather {
                region: w.region.clone(),
                reason,
            })?;
        }
        weather.sort_by(|a, b| a.region.cmp(&b.region));

        let zone_shapes = zones.iter().map(|z| z.geometry.to_shape()).collect();
        let zone_index = RTree::bulk_load(
            zones
                .iter()
                .enumerate()
                .flat_map(|(idx, z)| {
                    z.geometry
                        .bounding_boxes()
                        .into_iter()
                        .map(move |(lo, hi)| AreaEntry { bbox: AABB::from_corners(lo, hi), idx })
                })
                .collect(),
        );
        let weather_shapes = weather.iter().map(|w| w.area.to_shape()).collect();
        let weather_index = RTree::bulk_load(
            weather
                .iter()
                .enumerate()
                .flat_map(|(idx, w)| {
                    w.area
                        .bounding_boxes()
                        .into_iter()
                        .map(move |(lo, hi)| AreaEntry { bbox: AABB::from_corners(lo, hi), idx })
                })
                .collect(),
        );

        Ok(Self {
            version: 0,
            as_of,
            zones,
            zone_shapes,
            zone_index,
            weather,
            weather_shapes,
            weather_index,
        })
    }

    /// A snapshot with no zones and no weather.
    pub fn empty(as_of: Timestamp) -> Self {
        Self {
            version: 0,
            as_of,
            zones: Vec::new(),
            zone_shapes: Vec::new(),
            zone_index: RTree::new(),
            weather: Vec::new(),
            weather_shapes: Vec::new(),
            weather_index: RTree::new(),
        }
    }

    pub fn zones(&self) -> &[GreenZone] {
        &self.zones
    }

    pub fn weather(&self) -> &[WeatherCondition] {
        &self.weather
    }

    /// Zones whose geometry contains `p`, ordered by id.
    pub fn zones_covering(&self, p: GeoPoint) -> Vec<&GreenZone> {
        candidates(&self.zone_index, p)
            .into_iter()
            .filter(|&i| self.zone_shapes[i].contains(p))
            .map(|i| &self.zones[i])
            .collect()
    }

    /// The first zone (by id) containing `p` that bars `profile` at `at`.
    pub fn blocking_zone(&self, p: GeoPoint, profile: &VehicleProfile, at: Timestamp) -> Option<&GreenZone> {
        candidates(&self.zone_index, p)
            .into_iter()
            .filter(|&i| self.zone_shapes[i].contains(p))
            .map(|i| &self.zones[i])
            .find(|z| z.denies(profile, at))
    }

    /// The weather in force at `p` and `at`: the covering condition with the
    /// lowest region key, or `None` for neutral weather.
    pub fn weather_at(&self, p: GeoPoint, at: Timestamp) -> Option<&WeatherCondition> {
        candidates(&self.weather_index, p)
            .into_iter()
            .filter(|&i| self.weather[i].valid.contains(at) && self.weather_shapes[i].contains(p))
            .map(|i| &self.weather[i])
            .next()
    }

    /// Zones tagged with `city`, compared case-insensitively.
    pub fn zones_in_city(&self, city: &str) -> Vec<&GreenZone> {
        let city = city.trim();
        self.zones
            .iter()
            .filter(|z| z.city.eq_ignore_ascii_case(city))
            .collect()
    }
}
