//! Time-bounded brand lookup cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::cache::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::geo::Coordinate;
use crate::observability::metrics;

/// A cached brand resolution.
#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    pub coordinate: Coordinate,
    pub stored_at: Instant,
}

/// Concurrent cache mapping (brand, reference grid cell) → coordinate.
///
/// Entries expire lazily: a stale entry is treated as a miss and removed on
/// the read that notices it. Writes are last-writer-wins.
#[derive(Clone)]
pub struct GeoCache {
    inner: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    grid_decimals: usize,
    clock: Arc<dyn Clock>,
}

impl GeoCache {
    pub fn new(ttl: Duration, grid_decimals: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            grid_decimals,
            clock,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Duration::from_secs(config.ttl_secs),
            config.grid_decimals,
            Arc::new(SystemClock),
        )
    }

    /// `brand:lat,lon` with the reference point rounded to the grid.
    pub fn key(&self, brand: &str, point: &Coordinate) -> String {
        format!("{}:{}", brand, point.grid_key(self.grid_decimals))
    }

    pub fn get(&self, brand: &str, point: &Coordinate) -> Option<Coordinate> {
        let key = self.key(brand, point);
        let now = self.clock.now();

        let entry = match self.inner.get(&key) {
            Some(entry) => *entry.value(),
            None => {
                metrics::record_cache_lookup("miss");
                return None;
            }
        };

        if now.saturating_duration_since(entry.stored_at) > self.ttl {
            // Only drop it if no writer refreshed it in the meantime.
            self.inner
                .remove_if(&key, |_, current| current.stored_at == entry.stored_at);
            metrics::record_cache_lookup("stale");
            metrics::record_cache_size(self.inner.len());
            tracing::debug!(key = %key, "Geo cache entry expired");
            return None;
        }

        metrics::record_cache_lookup("hit");
        Some(entry.coordinate)
    }

    pub fn put(&self, brand: &str, point: &Coordinate, coordinate: Coordinate) {
        let key = self.key(brand, point);
        self.inner.insert(
            key,
            CacheEntry {
                coordinate,
                stored_at: self.clock.now(),
            },
        );
        metrics::record_cache_size(self.inner.len());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for GeoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoCache")
            .field("entries", &self.inner.len())
            .field("ttl", &self.ttl)
            .field("grid_decimals", &self.grid_decimals)
            .finish()
    }
}
