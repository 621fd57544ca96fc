//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use route_planner::cache::{GeoCache, ManualClock};
use route_planner::geo::Coordinate;
use route_planner::upstream::{
    Candidate, DistanceMatrix, DistanceMatrixProvider, GeocodeQuery, Geocoder, PlacesQuery,
    PlacesSearch, Providers, RoutingSolver, SolverProblem, SolverSolution,
};
use route_planner::{HttpServer, Planner, PlannerConfig, PlannerError, PlannerResult, Shutdown};

/// Las Vegas Strip, the center of ZIP 89109.
pub const STRIP: Coordinate = Coordinate { lat: 36.1147, lon: -115.1728 };
pub const STARBUCKS: Coordinate = Coordinate { lat: 36.1215, lon: -115.1690 };
pub const CHIPOTLE: Coordinate = Coordinate { lat: 36.1600, lon: -115.1400 };

/// How a fake provider should behave on its next calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,
    Fail,
    Delay(Duration),
}

#[derive(Debug)]
pub struct Behavior {
    mode: Mutex<Mode>,
    calls: AtomicUsize,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            mode: Mutex::new(Mode::Normal),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Behavior {
    pub fn set(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, service: &'static str) -> PlannerResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.mode.lock().unwrap();
        match mode {
            Mode::Normal => Ok(()),
            Mode::Fail => Err(PlannerError::upstream(service, "HTTP 500: injected")),
            Mode::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

fn candidate(name: &str, coordinate: Coordinate) -> Candidate {
    Candidate {
        name: name.to_string(),
        coordinate,
    }
}

/// Geocoder answering from a fixed text → results table.
#[derive(Default)]
pub struct FakeGeocoder {
    pub behavior: Behavior,
    results: Mutex<HashMap<String, Vec<Candidate>>>,
}

impl FakeGeocoder {
    pub fn with_defaults() -> Self {
        let fake = Self::default();
        fake.insert("89109", vec![candidate("Las Vegas, NV 89109", STRIP)]);
        fake.insert(
            "hoover dam",
            vec![candidate("Hoover Dam", Coordinate { lat: 36.0161, lon: -114.7377 })],
        );
        fake.insert(
            "fremont street",
            vec![candidate("Fremont Street Experience", Coordinate { lat: 36.1707, lon: -115.1437 })],
        );
        fake.insert(
            "red rock canyon",
            vec![candidate("Red Rock Canyon", Coordinate { lat: 36.1357, lon: -115.4270 })],
        );
        fake
    }

    pub fn insert(&self, text: &str, results: Vec<Candidate>) {
        self.results
            .lock()
            .unwrap()
            .insert(text.to_lowercase(), results);
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, query: &GeocodeQuery) -> PlannerResult<Vec<Candidate>> {
        self.behavior.enter("geocode").await?;
        let results = self.results.lock().unwrap();
        Ok(results
            .get(&query.text.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Places search answering by keyword.
#[derive(Default)]
pub struct FakePlaces {
    pub behavior: Behavior,
    results: Mutex<HashMap<String, Vec<Candidate>>>,
}

impl FakePlaces {
    pub fn with_defaults() -> Self {
        let fake = Self::default();
        fake.insert("Starbucks", vec![candidate("Starbucks", STARBUCKS)]);
        fake.insert(
            "Chipotle",
            vec![candidate("Chipotle Mexican Grill", CHIPOTLE)],
        );
        fake
    }

    pub fn insert(&self, keyword: &str, results: Vec<Candidate>) {
        self.results
            .lock()
            .unwrap()
            .insert(keyword.to_string(), results);
    }
}

#[async_trait]
impl PlacesSearch for FakePlaces {
    async fn nearby(&self, query: &PlacesQuery) -> PlannerResult<Vec<Candidate>> {
        self.behavior.enter("places").await?;
        let results = self.results.lock().unwrap();
        Ok(results.get(&query.keyword).cloned().unwrap_or_default())
    }
}

/// Matrix deriving driving figures from straight-line distance, unless
/// fixed distances are set.
#[derive(Default)]
pub struct FakeMatrix {
    pub behavior: Behavior,
    fixed_distances: Mutex<Option<Vec<Option<f64>>>>,
}

impl FakeMatrix {
    pub fn fix_distances(&self, distances: Vec<Option<f64>>) {
        *self.fixed_distances.lock().unwrap() = Some(distances);
    }
}

#[async_trait]
impl DistanceMatrixProvider for FakeMatrix {
    async fn one_to_many(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> PlannerResult<DistanceMatrix> {
        self.behavior.enter("matrix").await?;
        let distances_m = match self.fixed_distances.lock().unwrap().clone() {
            Some(fixed) => fixed,
            None => destinations
                .iter()
                .map(|d| Some(origin.haversine_m(d) * 1.3))
                .collect(),
        };
        let durations_s = distances_m.iter().map(|d| d.map(|m| m / 13.0)).collect();
        Ok(DistanceMatrix {
            distances_m,
            durations_s,
        })
    }
}

/// Solver that visits jobs in reverse input order.
#[derive(Default)]
pub struct FakeSolver {
    pub behavior: Behavior,
    last_problem: Mutex<Option<SolverProblem>>,
}

impl FakeSolver {
    pub fn last_problem(&self) -> Option<SolverProblem> {
        self.last_problem.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingSolver for FakeSolver {
    async fn solve(&self, problem: &SolverProblem) -> PlannerResult<SolverSolution> {
        self.behavior.enter("solver").await?;
        *self.last_problem.lock().unwrap() = Some(problem.clone());
        Ok(SolverSolution {
            job_order: problem.jobs.iter().rev().map(|j| j.id).collect(),
            unassigned: vec![],
            distance_m: Some(15_000.0),
            duration_s: Some(1_200.0),
        })
    }
}

/// Config with short deadlines and dummy keys.
pub fn test_config() -> PlannerConfig {
    let mut config = PlannerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.timeouts.geocode_ms = 500;
    config.timeouts.places_ms = 500;
    config.timeouts.matrix_ms = 200;
    config.timeouts.solver_ms = 1_000;
    config.timeouts.request_secs = 10;
    config.providers.ors_api_key = Some("test-ors-key".to_string());
    config.providers.places_api_key = Some("test-places-key".to_string());
    config
}

/// A planner wired to in-process fakes.
pub struct Harness {
    pub planner: Arc<Planner>,
    pub geocoder: Arc<FakeGeocoder>,
    pub places: Arc<FakePlaces>,
    pub matrix: Arc<FakeMatrix>,
    pub solver: Arc<FakeSolver>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        let geocoder = Arc::new(FakeGeocoder::with_defaults());
        let places = Arc::new(FakePlaces::with_defaults());
        let matrix = Arc::new(FakeMatrix::default());
        let solver = Arc::new(FakeSolver::default());
        let clock = Arc::new(ManualClock::new());

        let providers = Providers {
            geocoder: geocoder.clone(),
            places: places.clone(),
            matrix: matrix.clone(),
            solver: solver.clone(),
        };
        let cache = GeoCache::new(
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.grid_decimals,
            clock.clone(),
        );
        let planner = Arc::new(Planner::with_cache(&config, providers, cache));

        Self {
            planner,
            geocoder,
            places,
            matrix,
            solver,
            clock,
        }
    }

    pub fn network_calls(&self) -> usize {
        self.geocoder.behavior.calls()
            + self.places.behavior.calls()
            + self.matrix.behavior.calls()
            + self.solver.behavior.calls()
    }
}

/// Serve `planner` on an ephemeral port.
pub async fn start_planner_server(config: PlannerConfig, planner: Arc<Planner>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = HttpServer::new(config, planner)
            .run(listener, server_shutdown)
            .await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Programmable stand-in for the geocoding, places, matrix and solver APIs.
#[derive(Default)]
pub struct MockUpstream {
    pub geocode_calls: AtomicUsize,
    pub places_calls: AtomicUsize,
    pub matrix_calls: AtomicUsize,
    pub solver_calls: AtomicUsize,
    /// Non-zero forces this status on every solver response.
    pub solver_status: AtomicU16,
    /// Non-zero forces this status on every geocode response.
    pub geocode_status: AtomicU16,
    /// Artificial matrix latency in milliseconds.
    pub matrix_delay_ms: AtomicUsize,
    /// Report this many trailing jobs as unassigned.
    pub solver_unassigned: AtomicUsize,
    /// Artificial solver latency in milliseconds.
    pub solver_delay_ms: AtomicUsize,
}

pub type SharedMock = Arc<MockUpstream>;

async fn mock_geocode(
    State(mock): State<SharedMock>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    mock.geocode_calls.fetch_add(1, Ordering::SeqCst);
    let forced = mock.geocode_status.load(Ordering::SeqCst);
    if forced != 0 {
        let status = StatusCode::from_u16(forced).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (
            status,
            Json(json!({"error": {"code": 2099, "message": "injected failure"}})),
        );
    }
    if params.get("api_key").map(String::as_str) != Some("test-ors-key") {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "Access to this API has been disallowed"})));
    }

    let text = params.get("text").cloned().unwrap_or_default().to_lowercase();
    let features = match text.as_str() {
        "89109" => vec![json!({
            "geometry": {"coordinates": [STRIP.lon, STRIP.lat]},
            "properties": {"label": "Las Vegas, NV 89109"}
        })],
        "hoover dam" => vec![json!({
            "geometry": {"coordinates": [-114.7377, 36.0161]},
            "properties": {"name": "Hoover Dam"}
        })],
        _ => vec![],
    };
    (StatusCode::OK, Json(json!({ "features": features })))
}

async fn mock_places(
    State(mock): State<SharedMock>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    mock.places_calls.fetch_add(1, Ordering::SeqCst);
    if params.get("key").map(String::as_str) != Some("test-places-key") {
        return Json(json!({"status": "REQUEST_DENIED", "error_message": "bad key", "results": []}));
    }

    let keyword = params.get("keyword").cloned().unwrap_or_default();
    let place = |name: &str, at: Coordinate| {
        json!({"name": name, "geometry": {"location": {"lat": at.lat, "lng": at.lon}}})
    };
    let results = match keyword.as_str() {
        "Starbucks" => vec![place("Dutch Bros", STRIP), place("Starbucks", STARBUCKS)],
        "Chipotle" => vec![place("Chipotle Mexican Grill", CHIPOTLE)],
        _ => vec![],
    };
    let status = if results.is_empty() { "ZERO_RESULTS" } else { "OK" };
    Json(json!({ "status": status, "results": results }))
}

async fn mock_matrix(State(mock): State<SharedMock>, Json(body): Json<Value>) -> Json<Value> {
    mock.matrix_calls.fetch_add(1, Ordering::SeqCst);
    let delay = mock.matrix_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;
    }

    let locations: Vec<Coordinate> = body["locations"]
        .as_array()
        .map(|points| {
            points
                .iter()
                .filter_map(|p| {
                    let pair: Vec<f64> = serde_json::from_value(p.clone()).ok()?;
                    Coordinate::from_lon_lat(&pair)
                })
                .collect()
        })
        .unwrap_or_default();

    let origin = locations[0];
    let distances: Vec<f64> = locations[1..]
        .iter()
        .map(|d| (origin.haversine_m(d) * 1.4).round())
        .collect();
    let durations: Vec<f64> = distances.iter().map(|m| (m / 12.0).round()).collect();
    Json(json!({ "distances": [distances], "durations": [durations] }))
}

async fn mock_optimization(
    State(mock): State<SharedMock>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.solver_calls.fetch_add(1, Ordering::SeqCst);
    let delay = mock.solver_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;
    }
    let forced = mock.solver_status.load(Ordering::SeqCst);
    if forced != 0 {
        let status = StatusCode::from_u16(forced).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"error": "solver unavailable"})));
    }

    let mut ids: Vec<u64> = body["jobs"]
        .as_array()
        .map(|jobs| jobs.iter().filter_map(|j| j["id"].as_u64()).collect())
        .unwrap_or_default();
    ids.reverse();

    let unassigned_count = mock.solver_unassigned.load(Ordering::SeqCst).min(ids.len());
    let unassigned: Vec<u64> = ids.split_off(ids.len() - unassigned_count);

    let mut steps = vec![json!({"type": "start"})];
    steps.extend(ids.iter().map(|id| json!({"type": "job", "job": id})));
    steps.push(json!({"type": "end"}));

    (
        StatusCode::OK,
        Json(json!({
            "code": 0,
            "summary": {"cost": 1800, "distance": 21000, "duration": 1800},
            "unassigned": unassigned.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
            "routes": [{"vehicle": 1, "steps": steps}]
        })),
    )
}

/// Start the mock upstream on an ephemeral port; returns its base URL.
pub async fn start_mock_upstream() -> (String, SharedMock) {
    let mock = SharedMock::default();
    let app = Router::new()
        .route("/geocode/search", get(mock_geocode))
        .route("/nearbysearch/json", get(mock_places))
        .route("/v2/matrix/{profile}", post(mock_matrix))
        .route("/optimization", post(mock_optimization))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), mock)
}

/// Config pointing both providers at the mock upstream.
pub fn mock_config(base_url: &str) -> PlannerConfig {
    let mut config = test_config();
    config.providers.ors_base_url = base_url.to_string();
    config.providers.places_base_url = base_url.to_string();
    config
}

/// Planner server backed by real HTTP adapters talking to a mock upstream.
pub async fn start_end_to_end() -> (SocketAddr, Shutdown, SharedMock) {
    let (base_url, mock) = start_mock_upstream().await;
    let config = mock_config(&base_url);
    let providers = Providers::from_config(&config).unwrap();
    let planner = Arc::new(Planner::new(&config, providers));
    let (addr, shutdown) = start_planner_server(config, planner).await;
    (addr, shutdown, mock)
}
