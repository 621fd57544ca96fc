//! Free-text query → coordinate near a reference point.
//!
//! # Strategies
//! ```text
//! query ──classify──▶ brand?  ── yes ──▶ cache ─hit─▶ done
//!                       │                  │miss
//!                       │                  ▼
//!                       │           nearest-first places search (name filtered)
//!                       │                  │nothing
//!                       │                  ▼
//!                       │           radius places search, closest match
//!                       │
//!                       └── no ───▶ geocode passes at growing radii,
//!                                   dedup, closest candidate
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::GeoCache;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::geo::{Brand, BrandRegistry, Coordinate};
use crate::pipeline::stop::{Resolution, ResolutionSource};
use crate::resilience::with_deadline;
use crate::upstream::{Candidate, GeocodeQuery, Geocoder, PlaceRank, PlacesQuery, PlacesSearch};

/// Decimal places of the candidate dedup key (~1 m).
const DEDUP_DECIMALS: usize = 5;

/// Tuning for both strategies.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub geocode_timeout: Duration,
    pub places_timeout: Duration,
    pub radii_km: Vec<f64>,
    pub result_size: u32,
    pub min_candidates: usize,
    pub brand_radius_m: u32,
    pub country: Option<String>,
}

impl ResolverSettings {
    pub fn from_config(config: &PlannerConfig) -> Self {
        let country = config.providers.country.trim();
        Self {
            geocode_timeout: config.timeouts.geocode(),
            places_timeout: config.timeouts.places(),
            radii_km: config.geocoding.radii_km.clone(),
            result_size: config.geocoding.result_size,
            min_candidates: config.geocoding.min_candidates,
            brand_radius_m: config.geocoding.brand_radius_m,
            country: (!country.is_empty()).then(|| country.to_string()),
        }
    }
}

/// Resolves stop and origin queries.
pub struct GeoResolver {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlacesSearch>,
    brands: BrandRegistry,
    cache: GeoCache,
    settings: ResolverSettings,
}

impl GeoResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlacesSearch>,
        brands: BrandRegistry,
        cache: GeoCache,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            geocoder,
            places,
            brands,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    /// Resolve one stop query near `reference`.
    pub async fn resolve(&self, query: &str, reference: Coordinate) -> PlannerResult<Resolution> {
        match self.brands.classify(query) {
            Some(brand) => self.resolve_brand(query, brand, reference).await,
            None => self.resolve_generic(query, reference).await,
        }
    }

    /// Geocode the trip origin: first result of an unbiased search.
    pub async fn resolve_origin(&self, query: &str) -> PlannerResult<Coordinate> {
        let search = GeocodeQuery {
            text: query.to_string(),
            size: 1,
            focus: None,
            circle: None,
            country: self.settings.country.clone(),
        };
        let found = with_deadline(
            "geocode",
            self.settings.geocode_timeout,
            self.geocoder.search(&search),
        )
        .await?;

        found
            .into_iter()
            .next()
            .map(|candidate| candidate.coordinate)
            .ok_or_else(|| PlannerError::GeocodeNotFound {
                query: query.to_string(),
            })
    }

    async fn resolve_brand(
        &self,
        query: &str,
        brand: &Brand,
        reference: Coordinate,
    ) -> PlannerResult<Resolution> {
        if let Some(coordinate) = self.cache.get(&brand.canonical, &reference) {
            tracing::debug!(brand = %brand.canonical, "Brand resolved from cache");
            return Ok(Resolution {
                coordinate,
                source: ResolutionSource::BrandCache,
            });
        }

        let mut failures = 0;

        let nearest = self
            .search_places(brand, reference, PlaceRank::NearestFirst)
            .await;
        match nearest {
            Ok(candidates) => {
                if let Some(hit) = candidates.into_iter().find(|c| brand.matches_name(&c.name)) {
                    return Ok(self.remember(brand, reference, hit, ResolutionSource::BrandNearest));
                }
            }
            Err(e @ PlannerError::UpstreamFailure { .. }) => {
                tracing::warn!(brand = %brand.canonical, error = %e, "Nearest-first search failed, widening");
                failures += 1;
            }
            Err(e) => return Err(e),
        }

        let within = self
            .search_places(brand, reference, PlaceRank::Within(self.settings.brand_radius_m))
            .await;
        match within {
            Ok(candidates) => {
                let closest = closest_to(
                    reference,
                    candidates.into_iter().filter(|c| brand.matches_name(&c.name)),
                );
                if let Some(hit) = closest {
                    return Ok(self.remember(brand, reference, hit, ResolutionSource::BrandRadius));
                }
            }
            Err(e @ PlannerError::UpstreamFailure { .. }) => {
                failures += 1;
                if failures == 2 {
                    return Err(e);
                }
                tracing::warn!(brand = %brand.canonical, error = %e, "Radius search failed");
            }
            Err(e) => return Err(e),
        }

        tracing::info!(query = %query, brand = %brand.canonical, "No matching brand location");
        Err(PlannerError::GeocodeNotFound {
            query: query.to_string(),
        })
    }

    async fn search_places(
        &self,
        brand: &Brand,
        reference: Coordinate,
        rank: PlaceRank,
    ) -> PlannerResult<Vec<Candidate>> {
        let search = PlacesQuery {
            location: reference,
            keyword: brand.canonical.clone(),
            rank,
        };
        with_deadline(
            "places",
            self.settings.places_timeout,
            self.places.nearby(&search),
        )
        .await
    }

    fn remember(
        &self,
        brand: &Brand,
        reference: Coordinate,
        hit: Candidate,
        source: ResolutionSource,
    ) -> Resolution {
        self.cache.put(&brand.canonical, &reference, hit.coordinate);
        tracing::debug!(
            brand = %brand.canonical,
            name = %hit.name,
            source = source.as_str(),
            "Brand location resolved"
        );
        Resolution {
            coordinate: hit.coordinate,
            source,
        }
    }

    async fn resolve_generic(
        &self,
        query: &str,
        reference: Coordinate,
    ) -> PlannerResult<Resolution> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut attempted = 0;
        let mut failed = 0;
        let mut last_failure = None;

        for &radius_km in &self.settings.radii_km {
            attempted += 1;
            let search = GeocodeQuery {
                text: query.to_string(),
                size: self.settings.result_size,
                focus: Some(reference),
                circle: Some((reference, radius_km)),
                country: self.settings.country.clone(),
            };

            let found = with_deadline(
                "geocode",
                self.settings.geocode_timeout,
                self.geocoder.search(&search),
            )
            .await;

            match found {
                Ok(found) => {
                    for candidate in found {
                        if seen.insert(candidate.coordinate.grid_key(DEDUP_DECIMALS)) {
                            candidates.push(candidate);
                        }
                    }
                }
                Err(e @ PlannerError::UpstreamFailure { .. }) => {
                    tracing::warn!(query = %query, radius_km, error = %e, "Geocode pass failed");
                    failed += 1;
                    last_failure = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            }

            if candidates.len() >= self.settings.min_candidates {
                break;
            }
        }

        if let Some(e) = last_failure {
            if failed == attempted {
                return Err(e);
            }
        }

        closest_to(reference, candidates.into_iter())
            .map(|hit| Resolution {
                coordinate: hit.coordinate,
                source: ResolutionSource::Geocode,
            })
            .ok_or_else(|| PlannerError::GeocodeNotFound {
                query: query.to_string(),
            })
    }
}

/// Candidate with minimum haversine distance; the first one wins a tie.
fn closest_to(reference: Coordinate, candidates: impl Iterator<Item = Candidate>) -> Option<Candidate> {
    candidates.min_by(|a, b| {
        reference
            .haversine_m(&a.coordinate)
            .total_cmp(&reference.haversine_m(&b.coordinate))
    })
}
