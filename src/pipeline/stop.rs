//! A stop as it moves through the pipeline.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Which strategy produced a stop's coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    BrandCache,
    BrandNearest,
    BrandRadius,
    Geocode,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::BrandCache => "brand_cache",
            ResolutionSource::BrandNearest => "brand_nearest",
            ResolutionSource::BrandRadius => "brand_radius",
            ResolutionSource::Geocode => "geocode",
        }
    }
}

/// Output of a single resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub source: ResolutionSource,
}

/// A stop with its coordinate and distance estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStop {
    pub id: String,
    pub query: String,
    pub coordinate: Coordinate,
    pub source: ResolutionSource,
    pub straight_line_m: f64,
    pub driving_m: Option<f64>,
    pub eta_min: Option<u32>,
}

impl ResolvedStop {
    /// Build from a resolution, measuring straight-line distance from `origin`.
    pub fn new(id: String, query: String, resolution: Resolution, origin: &Coordinate) -> Self {
        Self {
            id,
            query,
            straight_line_m: origin.haversine_m(&resolution.coordinate),
            coordinate: resolution.coordinate,
            source: resolution.source,
            driving_m: None,
            eta_min: None,
        }
    }

    /// Driving distance when known, else straight-line.
    pub fn ranking_distance_m(&self) -> f64 {
        self.driving_m.unwrap_or(self.straight_line_m)
    }
}
