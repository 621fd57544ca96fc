//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, radii increasing)
//! - Validate provider URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PlannerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Missing API keys are not checked here; see `PlannerConfig::credentials`

use thiserror::Error;

use crate::config::schema::PlannerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Longest run of per-call deadlines a single request can chain together.
///
/// Stops resolve concurrently, so only one stop's worst case counts: every
/// generic geocoding pass, or both brand phases.
pub fn slowest_chain_ms(config: &PlannerConfig) -> u64 {
    let t = &config.timeouts;
    let passes = config.geocoding.radii_km.len() as u64;
    let stop = passes.saturating_mul(t.geocode_ms).max(t.places_ms.saturating_mul(2));
    t.geocode_ms
        .saturating_add(stop)
        .saturating_add(t.matrix_ms)
        .saturating_add(t.solver_ms)
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PlannerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.geocode_ms", timeouts.geocode_ms),
        ("timeouts.places_ms", timeouts.places_ms),
        ("timeouts.matrix_ms", timeouts.matrix_ms),
        ("timeouts.solver_ms", timeouts.solver_ms),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    let chain_ms = slowest_chain_ms(config);
    if timeouts.request_secs > 0 && timeouts.request_secs.saturating_mul(1_000) < chain_ms {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!("must be at least {}s to cover the per-call deadlines", chain_ms.div_ceil(1_000)),
        ));
    }

    let radii = &config.geocoding.radii_km;
    if radii.is_empty() {
        errors.push(ValidationError::new("geocoding.radii_km", "at least one radius is required"));
    } else if radii.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        errors.push(ValidationError::new("geocoding.radii_km", "radii must be positive"));
    } else if radii.windows(2).any(|w| w[1] <= w[0]) {
        errors.push(ValidationError::new("geocoding.radii_km", "radii must be strictly increasing"));
    }
    if config.geocoding.min_candidates == 0 {
        errors.push(ValidationError::new("geocoding.min_candidates", "must be greater than zero"));
    }
    if config.geocoding.result_size == 0 {
        errors.push(ValidationError::new("geocoding.result_size", "must be greater than zero"));
    }
    if config.geocoding.brand_radius_m == 0 {
        errors.push(ValidationError::new("geocoding.brand_radius_m", "must be greater than zero"));
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::new("cache.ttl_secs", "must be greater than zero"));
    }
    if config.cache.grid_decimals > 6 {
        errors.push(ValidationError::new("cache.grid_decimals", "must be at most 6"));
    }

    if config.limits.max_stops == 0 {
        errors.push(ValidationError::new("limits.max_stops", "must be greater than zero"));
    }

    for (field, value) in [
        ("providers.ors_base_url", &config.providers.ors_base_url),
        ("providers.places_base_url", &config.providers.places_base_url),
    ] {
        if let Err(e) = url::Url::parse(value) {
            errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
        }
    }

    for brand in &config.brands {
        if brand.canonical.trim().is_empty() {
            errors.push(ValidationError::new("brands", "brand with empty canonical name"));
        }
        if brand.keywords.iter().all(|k| k.trim().is_empty()) {
            errors.push(ValidationError::new(
                "brands",
                format!("brand '{}' has no keywords", brand.canonical),
            ));
        }
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
