//! Provider seams and the data exchanged across them.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::PlannerResult;
use crate::geo::Coordinate;

/// A named location returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub coordinate: Coordinate,
}

/// Free-text geocoding search.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeQuery {
    pub text: String,
    pub size: u32,
    /// Bias results toward this point.
    pub focus: Option<Coordinate>,
    /// Restrict results to a circle of `radius_km` around a point.
    pub circle: Option<(Coordinate, f64)>,
    pub country: Option<String>,
}

/// How a nearby place search bounds its results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceRank {
    /// Ordered by distance from the location, no radius.
    NearestFirst,
    /// Anything within this many meters.
    Within(u32),
}

/// Keyword search for places around a location.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacesQuery {
    pub location: Coordinate,
    pub keyword: String,
    pub rank: PlaceRank,
}

/// One-origin, many-destination driving estimates, in destination order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistanceMatrix {
    pub distances_m: Vec<Option<f64>>,
    pub durations_s: Vec<Option<f64>>,
}

/// A single required visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverJob {
    pub id: u64,
    #[serde(serialize_with = "serialize_lon_lat")]
    pub location: Coordinate,
}

/// The single vehicle of the trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverVehicle {
    pub id: u64,
    pub profile: String,
    #[serde(serialize_with = "serialize_lon_lat")]
    pub start: Coordinate,
    #[serde(serialize_with = "serialize_lon_lat")]
    pub end: Coordinate,
}

/// Request body for the routing solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverProblem {
    pub jobs: Vec<SolverJob>,
    pub vehicles: Vec<SolverVehicle>,
}

/// What the solver decided.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolverSolution {
    /// Job ids in visiting order.
    pub job_order: Vec<u64>,
    /// Job ids the solver could not place.
    pub unassigned: Vec<u64>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

fn serialize_lon_lat<S>(coord: &Coordinate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    coord.lon_lat().serialize(serializer)
}

/// Free-text geocoding.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &GeocodeQuery) -> PlannerResult<Vec<Candidate>>;
}

/// Nearby keyword search for places.
#[async_trait]
pub trait PlacesSearch: Send + Sync {
    async fn nearby(&self, query: &PlacesQuery) -> PlannerResult<Vec<Candidate>>;
}

/// Driving distance and duration from one origin to many points.
#[async_trait]
pub trait DistanceMatrixProvider: Send + Sync {
    async fn one_to_many(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> PlannerResult<DistanceMatrix>;
}

/// External vehicle-routing solver.
#[async_trait]
pub trait RoutingSolver: Send + Sync {
    async fn solve(&self, problem: &SolverProblem) -> PlannerResult<SolverSolution>;
}
