//! One request, start to finish.
//!
//! ```text
//! Validated → OriginResolved → StopsResolved → MatrixAttempted (non-fatal)
//!           → DestinationSelected → Preview: done
//!                                 → JobsBuilt → Solved → done
//! ```
//! Anything failing before `StopsResolved` fails the whole request.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::cache::GeoCache;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::geo::{BrandRegistry, Coordinate};
use crate::pipeline::assembler::{self, OriginSource, PlanResponse, StartUsed};
use crate::pipeline::destination;
use crate::pipeline::matrix::DistanceMatrixClient;
use crate::pipeline::optimizer::RouteOptimizer;
use crate::pipeline::request::{OptimizeRequest, Origin, StopRequest};
use crate::pipeline::resolver::{GeoResolver, ResolverSettings};
use crate::pipeline::stop::ResolvedStop;
use crate::upstream::Providers;

/// Request orchestrator shared by all handlers.
pub struct Planner {
    resolver: Arc<GeoResolver>,
    matrix: DistanceMatrixClient,
    optimizer: RouteOptimizer,
    max_stops: usize,
}

impl Planner {
    pub fn new(config: &PlannerConfig, providers: Providers) -> Self {
        Self::with_cache(config, providers, GeoCache::from_config(&config.cache))
    }

    /// Build with an explicit cache (tests inject a manual clock this way).
    pub fn with_cache(config: &PlannerConfig, providers: Providers, cache: GeoCache) -> Self {
        let resolver = GeoResolver::new(
            providers.geocoder,
            providers.places,
            BrandRegistry::from_config(&config.brands),
            cache,
            ResolverSettings::from_config(config),
        );

        Self {
            resolver: Arc::new(resolver),
            matrix: DistanceMatrixClient::new(providers.matrix, config.timeouts.matrix()),
            optimizer: RouteOptimizer::new(
                providers.solver,
                config.providers.profile.clone(),
                config.timeouts.solver(),
            ),
            max_stops: config.limits.max_stops,
        }
    }

    pub fn cache(&self) -> &GeoCache {
        self.resolver.cache()
    }

    pub async fn plan(&self, request: OptimizeRequest) -> PlannerResult<PlanResponse> {
        let request = request.validate(self.max_stops)?;

        let start = self.resolve_origin(&request.origin).await?;
        let origin = start.coordinate();

        let mut stops = self.resolve_stops(&request.stops, origin).await?;

        let matrix = self.matrix.enrich(origin, &mut stops).await;
        let choice = destination::select(&stops, request.destination_id.as_deref())?;

        tracing::debug!(
            stops = stops.len(),
            destination_id = %choice.stop_id,
            reason = choice.reason.describe(),
            "Destination selected"
        );

        if request.preview_only {
            return Ok(PlanResponse::Preview(assembler::preview(
                start, &stops, &choice, matrix,
            )));
        }

        let route = self
            .optimizer
            .optimize(origin, &stops, &choice.stop_id)
            .await?;
        Ok(PlanResponse::Final(assembler::final_response(
            start, &stops, &choice, route,
        )))
    }

    async fn resolve_origin(&self, origin: &Origin) -> PlannerResult<StartUsed> {
        match origin {
            Origin::Coordinates(coordinate) => Ok(StartUsed::new(*coordinate, OriginSource::Gps)),
            Origin::Query(query) => {
                let coordinate = self.resolver.resolve_origin(query).await?;
                Ok(StartUsed::new(coordinate, OriginSource::Zip))
            }
        }
    }

    /// Resolve every stop concurrently. The first failure cancels the rest.
    async fn resolve_stops(
        &self,
        stops: &[StopRequest],
        origin: Coordinate,
    ) -> PlannerResult<Vec<ResolvedStop>> {
        let mut tasks = JoinSet::new();
        for (index, stop) in stops.iter().cloned().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            tasks.spawn(async move {
                let resolution = resolver.resolve(&stop.query, origin).await;
                (index, stop, resolution)
            });
        }

        let mut resolved: Vec<Option<ResolvedStop>> = vec![None; stops.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, stop, resolution) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tasks.abort_all();
                    return Err(PlannerError::Internal(format!("resolution task failed: {e}")));
                }
            };

            match resolution {
                Ok(resolution) => {
                    resolved[index] = Some(ResolvedStop::new(stop.id, stop.query, resolution, &origin));
                }
                Err(e) => {
                    tracing::warn!(stop_id = %stop.id, query = %stop.query, error = %e, "Stop resolution failed");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        resolved
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| PlannerError::Internal("a stop was left unresolved".into()))
    }
}
