//! Free-text location resolution.
//!
//! The engine only ever sees coordinates.  The gazetteer accepts either a
//! literal `"lat,lon"` pair or one of the place names configured in
//! `EngineConfig::places`.

use std::collections::BTreeMap;

use eco_core::GeoPoint;

/// Name → coordinate lookup, case-insensitive.
#[derive(Clone, Debug, Default)]
pub struct Gazetteer {
    places: BTreeMap<String, GeoPoint>,
}

impl Gazetteer {
    pub fn from_places(places: &BTreeMap<String, GeoPoint>) -> Self {
        Self {
            places: places.iter().map(|(name, p)| (normalize(name), *p)).collect(),
        }
    }

    /// Resolve `text`, or `None` if it is neither a coordinate pair nor a
    /// known place.
    pub fn resolve(&self, text: &str) -> Option<GeoPoint> {
        parse_lat_lon(text).or_else(|| self.places.get(&normalize(text)).copied())
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// `"28.61, 77.21"` → `GeoPoint { lat: 28.61, lon: 77.21 }`.
fn parse_lat_lon(text: &str) -> Option<GeoPoint> {
    let (lat, lon) = text.split_once(',')?;
    let p = GeoPoint::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    p.is_valid().then_some(p)
}
