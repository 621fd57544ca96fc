//! Response payloads for `POST /api/optimize`.

use serde::{Deserialize, Serialize};

use crate::geo::{meters_to_miles, Coordinate};
use crate::pipeline::destination::DestinationChoice;
use crate::pipeline::matrix::MatrixOutcome;
use crate::pipeline::optimizer::RouteResult;
use crate::pipeline::stop::{ResolutionSource, ResolvedStop};

/// How the origin was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginSource {
    Gps,
    Zip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartUsed {
    pub lat: f64,
    pub lon: f64,
    pub source: OriginSource,
}

impl StartUsed {
    pub fn new(coordinate: Coordinate, source: OriginSource) -> Self {
        Self {
            lat: coordinate.lat,
            lon: coordinate.lon,
            source,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStopView {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub picked_from: ResolutionSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub optimized: bool,
    #[serde(rename = "orderedIds")]
    pub ordered_ids: Vec<String>,
    #[serde(rename = "destinationId")]
    pub destination_id: String,
    #[serde(rename = "routeDistance_m", default, skip_serializing_if = "Option::is_none")]
    pub route_distance_m: Option<f64>,
    #[serde(rename = "routeDuration_s", default, skip_serializing_if = "Option::is_none")]
    pub route_duration_s: Option<f64>,
    #[serde(rename = "startUsed")]
    pub start_used: StartUsed,
    #[serde(rename = "resolvedStops")]
    pub resolved_stops: Vec<ResolvedStopView>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewStop {
    pub id: String,
    pub dist_mi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_min: Option<u32>,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "pickedFrom")]
    pub picked_from: ResolutionSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub preview: bool,
    pub optimized: bool,
    #[serde(rename = "startUsed")]
    pub start_used: StartUsed,
    #[serde(rename = "suggestedDestinationId")]
    pub suggested_destination_id: String,
    pub stops: Vec<PreviewStop>,
    pub note: String,
}

/// Either successful shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanResponse {
    Final(FinalResponse),
    Preview(PreviewResponse),
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub optimized: bool,
    pub note: String,
}

impl ErrorResponse {
    pub fn new(note: impl Into<String>) -> Self {
        Self {
            optimized: false,
            note: note.into(),
        }
    }
}

pub const PREVIEW_NOTE: &str = "Preview only; confirm a destination to optimize.";
pub const DEGRADED_SUFFIX: &str = " Driving estimates unavailable.";

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn preview(
    start: StartUsed,
    stops: &[ResolvedStop],
    choice: &DestinationChoice,
    matrix: MatrixOutcome,
) -> PreviewResponse {
    let mut note = PREVIEW_NOTE.to_string();
    if matrix == MatrixOutcome::Degraded {
        note.push_str(DEGRADED_SUFFIX);
    }

    PreviewResponse {
        preview: true,
        optimized: false,
        start_used: start,
        suggested_destination_id: choice.stop_id.clone(),
        stops: stops
            .iter()
            .map(|stop| PreviewStop {
                id: stop.id.clone(),
                dist_mi: round_tenth(meters_to_miles(stop.ranking_distance_m())),
                eta_min: stop.eta_min,
                lat: stop.coordinate.lat,
                lon: stop.coordinate.lon,
                picked_from: stop.source,
            })
            .collect(),
        note,
    }
}

pub fn final_response(
    start: StartUsed,
    stops: &[ResolvedStop],
    choice: &DestinationChoice,
    route: RouteResult,
) -> FinalResponse {
    let note = format!(
        "Optimized {} stops; destination {}.",
        route.ordered_ids.len(),
        choice.reason.describe()
    );

    FinalResponse {
        optimized: true,
        ordered_ids: route.ordered_ids,
        destination_id: route.destination_id,
        route_distance_m: route.distance_m,
        route_duration_s: route.duration_s,
        start_used: start,
        resolved_stops: stops
            .iter()
            .map(|stop| ResolvedStopView {
                id: stop.id.clone(),
                lat: stop.coordinate.lat,
                lon: stop.coordinate.lon,
                picked_from: stop.source,
            })
            .collect(),
        note,
    }
}
