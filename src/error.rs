//! Error taxonomy for the planning pipeline.
//!
//! # Propagation
//! ```text
//! InvalidInput / MissingCredential  → detected before any network call
//! GeocodeNotFound / NetworkTimeout  → abort the whole request
//! UpstreamFailure                   → abort, except inside matrix enrichment
//! SolverFailure                     → aborts final mode only
//! ```
//!
//! Callers only ever see `note()` and `status_code()`. Provider messages,
//! URLs and keys stay in the logs; the only request text echoed back is the
//! query that could not be geocoded.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced while resolving and optimizing a trip.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Request failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required API key is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// No viable coordinate for a stop or origin query.
    #[error("no geocode result for {query:?}")]
    GeocodeNotFound { query: String },

    /// An outbound call exceeded its deadline.
    #[error("{call} timed out after {}ms", after.as_millis())]
    NetworkTimeout { call: &'static str, after: Duration },

    /// An outbound call failed or returned a non-success status.
    #[error("{service} failed: {message}")]
    UpstreamFailure {
        service: &'static str,
        message: String,
    },

    /// The routing solver gave no usable route.
    #[error("solver failure: {0}")]
    SolverFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;

impl PlannerError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            service,
            message: message.into(),
        }
    }

    /// Coarse HTTP-style status for the error response.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlannerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlannerError::MissingCredential(_) | PlannerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PlannerError::GeocodeNotFound { .. }
            | PlannerError::NetworkTimeout { .. }
            | PlannerError::UpstreamFailure { .. }
            | PlannerError::SolverFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Human-readable note returned to the caller.
    pub fn note(&self) -> String {
        match self {
            PlannerError::InvalidInput(reason) => format!("Invalid request: {reason}"),
            PlannerError::MissingCredential(_) => {
                "Server is missing a required API key.".to_string()
            }
            PlannerError::GeocodeNotFound { query } => {
                format!("Could not find a location for \"{query}\".")
            }
            PlannerError::NetworkTimeout { .. } => {
                "A mapping service took too long to respond. Please try again.".to_string()
            }
            PlannerError::UpstreamFailure { .. } => {
                "A mapping service returned an error. Please try again.".to_string()
            }
            PlannerError::SolverFailure(_) => {
                "Route optimization failed. Please try again.".to_string()
            }
            PlannerError::Internal(_) => "Unexpected server error.".to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::InvalidInput(_) => "invalid_input",
            PlannerError::MissingCredential(_) => "missing_credential",
            PlannerError::GeocodeNotFound { .. } => "geocode_not_found",
            PlannerError::NetworkTimeout { .. } => "timeout",
            PlannerError::UpstreamFailure { .. } => "upstream",
            PlannerError::SolverFailure(_) => "solver",
            PlannerError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PlannerError::InvalidInput("no stops".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlannerError::MissingCredential("ORS_API_KEY").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PlannerError::SolverFailure("empty".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PlannerError::NetworkTimeout {
                call: "geocode",
                after: Duration::from_secs(8)
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_display() {
        let err = PlannerError::NetworkTimeout {
            call: "matrix",
            after: Duration::from_millis(9000),
        };
        assert_eq!(err.to_string(), "matrix timed out after 9000ms");

        let err = PlannerError::upstream("places", "HTTP 403");
        assert_eq!(err.to_string(), "places failed: HTTP 403");
    }

    #[test]
    fn test_note_hides_upstream_details() {
        let err = PlannerError::upstream("solver", "api_key=secret rejected");
        assert!(!err.note().contains("secret"));
    }

    #[test]
    fn test_only_unresolved_query_is_echoed() {
        let err = PlannerError::GeocodeNotFound {
            query: "Nowhere Diner".into(),
        };
        assert_eq!(err.note(), "Could not find a location for \"Nowhere Diner\".");

        let err = PlannerError::NetworkTimeout {
            call: "geocode",
            after: Duration::from_secs(8),
        };
        assert!(!err.note().contains("geocode"));
    }
}
