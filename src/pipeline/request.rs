//! Inbound request body and its validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::geo::Coordinate;

/// One caller-supplied stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRequest {
    pub id: String,
    pub query: String,
}

impl StopRequest {
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
        }
    }
}

/// Body of `POST /api/optimize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_coords: Option<Coordinate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,

    #[serde(default)]
    pub preview_only: bool,

    #[serde(default)]
    pub stops: Vec<StopRequest>,
}

/// Where the trip starts, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Coordinates(Coordinate),
    Query(String),
}

/// A request that passed every pre-network check.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub origin: Origin,
    pub destination_id: Option<String>,
    pub preview_only: bool,
    pub stops: Vec<StopRequest>,
}

impl OptimizeRequest {
    /// Check the request without touching the network.
    ///
    /// Coordinates take precedence over a start query when both are sent.
    /// Stop queries are trimmed; ids are kept verbatim but must be unique
    /// and non-blank.
    pub fn validate(self, max_stops: usize) -> PlannerResult<ValidatedRequest> {
        if self.stops.is_empty() {
            return Err(PlannerError::InvalidInput("at least one stop is required".into()));
        }
        if self.stops.len() > max_stops {
            return Err(PlannerError::InvalidInput(format!(
                "too many stops ({}, limit {})",
                self.stops.len(),
                max_stops
            )));
        }

        let origin = match (self.start_coords, self.start_query) {
            (Some(coords), _) => Origin::Coordinates(Coordinate::new(coords.lat, coords.lon)?),
            (None, Some(query)) if !query.trim().is_empty() => {
                Origin::Query(query.trim().to_string())
            }
            _ => {
                return Err(PlannerError::InvalidInput(
                    "startCoords or startQuery is required".into(),
                ))
            }
        };

        let mut seen = HashSet::with_capacity(self.stops.len());
        let mut stops = Vec::with_capacity(self.stops.len());
        for stop in self.stops {
            if stop.id.trim().is_empty() {
                return Err(PlannerError::InvalidInput("stop id must not be blank".into()));
            }
            let query = stop.query.trim();
            if query.is_empty() {
                return Err(PlannerError::InvalidInput(format!(
                    "stop {:?} has an empty query",
                    stop.id
                )));
            }
            if !seen.insert(stop.id.clone()) {
                return Err(PlannerError::InvalidInput(format!(
                    "duplicate stop id {:?}",
                    stop.id
                )));
            }
            stops.push(StopRequest::new(stop.id, query));
        }

        Ok(ValidatedRequest {
            origin,
            destination_id: self.destination_id,
            preview_only: self.preview_only,
            stops,
        })
    }
}
