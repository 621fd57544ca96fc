//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the planner.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// Root configuration for the planner service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PlannerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Deadlines for outbound calls and the whole request.
    pub timeouts: TimeoutConfig,

    /// Upstream endpoints and credentials.
    pub providers: ProviderConfig,

    /// Geocoding search tuning.
    pub geocoding: GeocodingConfig,

    /// Brand lookup cache settings.
    pub cache: CacheConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Brand registry. Empty means the built-in list.
    pub brands: Vec<BrandConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Geocoding search deadline in milliseconds.
    pub geocode_ms: u64,

    /// Places search deadline in milliseconds.
    pub places_ms: u64,

    /// Distance matrix deadline in milliseconds.
    pub matrix_ms: u64,

    /// Routing solver deadline in milliseconds.
    pub solver_ms: u64,

    /// Whole-request guard in seconds. Must cover the slowest chain of
    /// per-call deadlines; see `validation::slowest_chain_ms`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            geocode_ms: 8_000,
            places_ms: 8_000,
            matrix_ms: 9_000,
            solver_ms: 20_000,
            request_secs: 90,
        }
    }
}

impl TimeoutConfig {
    pub fn geocode(&self) -> Duration {
        Duration::from_millis(self.geocode_ms)
    }

    pub fn places(&self) -> Duration {
        Duration::from_millis(self.places_ms)
    }

    pub fn matrix(&self) -> Duration {
        Duration::from_millis(self.matrix_ms)
    }

    pub fn solver(&self) -> Duration {
        Duration::from_millis(self.solver_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

/// Upstream provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL for geocoding, matrix and optimization calls.
    pub ors_base_url: String,

    /// Base URL for nearby place search.
    pub places_base_url: String,

    /// openrouteservice API key. Prefer the ORS_API_KEY env var.
    pub ors_api_key: Option<String>,

    /// Places API key. Prefer the PLACES_API_KEY env var.
    pub places_api_key: Option<String>,

    /// ISO country filter for geocoding.
    pub country: String,

    /// Routing profile for matrix and solver calls.
    pub profile: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ors_base_url: "https://api.openrouteservice.org".to_string(),
            places_base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            ors_api_key: None,
            places_api_key: None,
            country: "US".to_string(),
            profile: "driving-car".to_string(),
        }
    }
}

// Keys never reach logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("ors_base_url", &self.ors_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("ors_api_key", &self.ors_api_key.as_ref().map(|_| "<redacted>"))
            .field("places_api_key", &self.places_api_key.as_ref().map(|_| "<redacted>"))
            .field("country", &self.country)
            .field("profile", &self.profile)
            .finish()
    }
}

/// API keys required by the upstream clients.
#[derive(Clone)]
pub struct Credentials {
    pub ors_api_key: String,
    pub places_api_key: String,
}

/// Geocoding search tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Radii (km) of the expanding generic search passes.
    pub radii_km: Vec<f64>,

    /// Result cap per geocoding pass.
    pub result_size: u32,

    /// Stop expanding once this many unique candidates are collected.
    pub min_candidates: usize,

    /// Radius (m) of the brand fallback search.
    pub brand_radius_m: u32,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            radii_km: vec![8.0, 20.0, 50.0],
            result_size: 10,
            min_candidates: 15,
            brand_radius_m: 50_000,
        }
    }
}

/// Brand lookup cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,

    /// Decimal places of the reference-point grid cell.
    pub grid_decimals: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            grid_decimals: 2,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum stops per request.
    pub max_stops: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_stops: 25 }
    }
}

/// One brand registry entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrandConfig {
    /// Name that place results must contain.
    pub canonical: String,

    /// Query keywords (case-insensitive) that select this brand.
    pub keywords: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Keys required by the upstream clients.
    pub fn credentials(&self) -> PlannerResult<Credentials> {
        let ors_api_key = non_blank(&self.providers.ors_api_key)
            .ok_or(PlannerError::MissingCredential("ORS_API_KEY"))?;
        let places_api_key = non_blank(&self.providers.places_api_key)
            .ok_or(PlannerError::MissingCredential("PLACES_API_KEY"))?;
        Ok(Credentials {
            ors_api_key,
            places_api_key,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
