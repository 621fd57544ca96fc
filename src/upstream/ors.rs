//! openrouteservice adapter: geocoding search, matrix, optimization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::geo::Coordinate;
use crate::upstream::http::{join_url, send_json};
use crate::upstream::types::{
    Candidate, DistanceMatrix, DistanceMatrixProvider, GeocodeQuery, Geocoder, RoutingSolver,
    SolverProblem, SolverSolution,
};

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    label: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct MatrixRequest<'a> {
    locations: Vec<[f64; 2]>,
    sources: [usize; 1],
    destinations: Vec<usize>,
    metrics: [&'a str; 2],
    units: &'a str,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OptimizationResponse {
    #[serde(default)]
    code: i64,
    error: Option<String>,
    summary: Option<OptimizationSummary>,
    #[serde(default)]
    routes: Vec<OptimizedRoute>,
    #[serde(default)]
    unassigned: Vec<UnassignedJob>,
}

#[derive(Debug, Deserialize)]
struct OptimizationSummary {
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OptimizedRoute {
    #[serde(default)]
    steps: Vec<RouteStep>,
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RouteStep {
    #[serde(rename = "type")]
    kind: String,
    // Older solver versions use `job`, newer ones `id`.
    job: Option<u64>,
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UnassignedJob {
    id: u64,
}

/// HTTP client for openrouteservice.
#[derive(Clone)]
pub struct OrsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    profile: String,
}

impl OrsClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, profile: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            profile: profile.to_string(),
        }
    }
}

impl std::fmt::Debug for OrsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrsClient")
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .finish()
    }
}

fn geocode_params(query: &GeocodeQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("text", query.text.clone()), ("size", query.size.to_string())];
    if let Some(focus) = query.focus {
        params.push(("focus.point.lat", focus.lat.to_string()));
        params.push(("focus.point.lon", focus.lon.to_string()));
    }
    if let Some((center, radius_km)) = query.circle {
        params.push(("boundary.circle.lat", center.lat.to_string()));
        params.push(("boundary.circle.lon", center.lon.to_string()));
        params.push(("boundary.circle.radius", radius_km.to_string()));
    }
    if let Some(country) = &query.country {
        params.push(("boundary.country", country.clone()));
    }
    params
}

fn into_candidates(response: GeoResponse) -> Vec<Candidate> {
    response
        .features
        .into_iter()
        .filter_map(|feature| {
            let coordinate = Coordinate::from_lon_lat(&feature.geometry.coordinates)?;
            let name = feature
                .properties
                .label
                .or(feature.properties.name)
                .unwrap_or_default();
            Some(Candidate { name, coordinate })
        })
        .collect()
}

fn into_matrix(response: MatrixResponse, expected: usize) -> PlannerResult<DistanceMatrix> {
    let first_row = |rows: Option<Vec<Vec<Option<f64>>>>, what: &str| {
        let row = rows
            .and_then(|rows| rows.into_iter().next())
            .ok_or_else(|| PlannerError::upstream("matrix", format!("response has no {what}")))?;
        if row.len() != expected {
            return Err(PlannerError::upstream(
                "matrix",
                format!("expected {} {}, got {}", expected, what, row.len()),
            ));
        }
        Ok(row)
    };

    Ok(DistanceMatrix {
        distances_m: first_row(response.distances, "distances")?,
        durations_s: first_row(response.durations, "durations")?,
    })
}

fn into_solution(response: OptimizationResponse) -> PlannerResult<SolverSolution> {
    if response.code != 0 {
        return Err(PlannerError::SolverFailure(format!(
            "solver code {}: {}",
            response.code,
            response.error.unwrap_or_default()
        )));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| PlannerError::SolverFailure("solution has no routes".to_string()))?;

    let job_order = route
        .steps
        .iter()
        .filter(|step| step.kind == "job")
        .map(|step| {
            step.job
                .or(step.id)
                .ok_or_else(|| PlannerError::SolverFailure("job step without an id".to_string()))
        })
        .collect::<PlannerResult<Vec<u64>>>()?;

    let (summary_distance, summary_duration) = response
        .summary
        .map(|s| (s.distance, s.duration))
        .unwrap_or((None, None));

    Ok(SolverSolution {
        job_order,
        unassigned: response.unassigned.into_iter().map(|u| u.id).collect(),
        distance_m: summary_distance.or(route.distance),
        duration_s: summary_duration.or(route.duration),
    })
}

#[async_trait]
impl Geocoder for OrsClient {
    async fn search(&self, query: &GeocodeQuery) -> PlannerResult<Vec<Candidate>> {
        let request = self
            .client
            .get(join_url(&self.base_url, "/geocode/search"))
            .query(&[("api_key", self.api_key.as_str())])
            .query(&geocode_params(query));

        let response: GeoResponse = send_json("geocode", request).await?;
        Ok(into_candidates(response))
    }
}

#[async_trait]
impl DistanceMatrixProvider for OrsClient {
    async fn one_to_many(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> PlannerResult<DistanceMatrix> {
        if destinations.is_empty() {
            return Ok(DistanceMatrix::default());
        }

        let mut locations = Vec::with_capacity(destinations.len() + 1);
        locations.push(origin.lon_lat());
        locations.extend(destinations.iter().map(Coordinate::lon_lat));

        let body = MatrixRequest {
            locations,
            sources: [0],
            destinations: (1..=destinations.len()).collect(),
            metrics: ["distance", "duration"],
            units: "m",
        };

        let request = self
            .client
            .post(join_url(&self.base_url, &format!("/v2/matrix/{}", self.profile)))
            .header("Authorization", &self.api_key)
            .json(&body);

        let response: MatrixResponse = send_json("matrix", request).await?;
        into_matrix(response, destinations.len())
    }
}

#[async_trait]
impl RoutingSolver for OrsClient {
    async fn solve(&self, problem: &SolverProblem) -> PlannerResult<SolverSolution> {
        let request = self
            .client
            .post(join_url(&self.base_url, "/optimization"))
            .header("Authorization", &self.api_key)
            .json(problem);

        let response: OptimizationResponse = send_json("solver", request).await?;
        into_solution(response)
    }
}
