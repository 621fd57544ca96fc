//! Outbound provider subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline (resolver, matrix, optimizer)
//!     → types.rs traits (Geocoder, PlacesSearch, DistanceMatrixProvider, RoutingSolver)
//!     → ors.rs / places.rs HTTP adapters
//!     → http.rs send_json (status check, decode, metrics)
//! ```
//!
//! # Design Decisions
//! - The pipeline only sees traits; tests substitute in-process fakes
//! - Deadlines are applied by the callers, not by the adapters
//! - API keys are checked once, when the providers are built

pub(crate) mod http;
pub mod ors;
pub mod places;
pub mod types;

use std::sync::Arc;

pub use ors::OrsClient;
pub use places::GooglePlacesClient;
pub use types::{
    Candidate, DistanceMatrix, DistanceMatrixProvider, GeocodeQuery, Geocoder, PlaceRank,
    PlacesQuery, PlacesSearch, RoutingSolver, SolverJob, SolverProblem, SolverSolution,
    SolverVehicle,
};

use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};

/// The four provider seams used by the pipeline.
#[derive(Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn Geocoder>,
    pub places: Arc<dyn PlacesSearch>,
    pub matrix: Arc<dyn DistanceMatrixProvider>,
    pub solver: Arc<dyn RoutingSolver>,
}

impl Providers {
    /// Build the HTTP-backed providers. Fails on a missing API key.
    pub fn from_config(config: &PlannerConfig) -> PlannerResult<Self> {
        let credentials = config.credentials()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("route-planner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlannerError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let ors = Arc::new(OrsClient::new(
            client.clone(),
            &config.providers.ors_base_url,
            credentials.ors_api_key,
            &config.providers.profile,
        ));
        let places = Arc::new(GooglePlacesClient::new(
            client,
            &config.providers.places_base_url,
            credentials.places_api_key,
        ));

        Ok(Self {
            geocoder: ors.clone(),
            places,
            matrix: ors.clone(),
            solver: ors,
        })
    }
}
