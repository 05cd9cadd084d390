//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Zone membership is decided by
//! comparing haversine distances against radii of a few hundred metres, so
//! the extra precision matters at zone borders.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Midpoint in lat/lon space, taking the short way across the
    /// antimeridian.  Road edges are short enough that the great-circle
    /// midpoint differs by centimetres.
    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        let d_lon = wrap_lon(other.lon - self.lon);
        GeoPoint::new((self.lat + other.lat) * 0.5, wrap_lon(self.lon + d_lon * 0.5))
    }

    /// Half-extent in degrees `(d_lat, d_lon)` of a box guaranteed to contain
    /// every point within `radius_m` of `self`.
    pub fn degree_extent(self, radius_m: f64) -> (f64, f64) {
        let d_lat = (radius_m / EARTH_RADIUS_M).to_degrees();
        let cos_lat = (self.lat.abs() + d_lat).min(89.999).to_radians().cos();
        let d_lon = (radius_m / (EARTH_RADIUS_M * cos_lat)).to_degrees();
        (d_lat, d_lon.min(180.0))
    }

    /// Boxes `([min_lat, min_lon], [max_lat, max_lon])` that together contain
    /// every point within `radius_m` of `self`.
    ///
    /// A box reaching past ±180° longitude is split into one box on each side
    /// of the antimeridian.  A box touching a pole spans every longitude.
    pub fn covering_boxes(self, radius_m: f64) -> Vec<([f64; 2], [f64; 2])> {
        let (d_lat, d_lon) = self.degree_extent(radius_m);
        let lat_lo = (self.lat - d_lat).max(-90.0);
        let lat_hi = (self.lat + d_lat).min(90.0);
        if lat_lo <= -90.0 || lat_hi >= 90.0 || d_lon >= 180.0 {
            return vec![([lat_lo, -180.0], [lat_hi, 180.0])];
        }

        let (lon_lo, lon_hi) = (self.lon - d_lon, self.lon + d_lon);
        if lon_lo < -180.0 {
            vec![
                ([lat_lo, -180.0], [lat_hi, lon_hi]),
                ([lat_lo, lon_lo + 360.0], [lat_hi, 180.0]),
            ]
        } else if lon_hi > 180.0 {
            vec![
                ([lat_lo, lon_lo], [lat_hi, 180.0]),
                ([lat_lo, -180.0], [lat_hi, lon_hi - 360.0]),
            ]
        } else {
            vec![([lat_lo, lon_lo], [lat_hi, lon_hi])]
        }
    }

    /// `true` if both components are finite and within WGS-84 bounds.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Normalise a longitude or longitude difference into `[-180, 180]`.
#[inline]
fn wrap_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
