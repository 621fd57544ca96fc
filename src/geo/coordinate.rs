//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// A point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> PlannerResult<Self> {
        let coord = Self { lat, lon };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(PlannerError::InvalidInput(format!(
                "coordinate ({lat}, {lon}) is out of range"
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Build from a GeoJSON-style `[lon, lat]` pair.
    pub fn from_lon_lat(pair: &[f64]) -> Option<Self> {
        match pair {
            [lon, lat, ..] => {
                let coord = Self { lat: *lat, lon: *lon };
                coord.is_valid().then_some(coord)
            }
            _ => None,
        }
    }

    /// `[lon, lat]`, the order routing APIs expect.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Great-circle distance in meters.
    pub fn haversine_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }

    /// Fixed-precision text key, e.g. `36.12,-115.17` at 2 decimals.
    pub fn grid_key(&self, decimals: usize) -> String {
        format!("{:.*},{:.*}", decimals, self.lat, decimals, self.lon)
    }
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}
