//! Error → HTTP response mapping.
//!
//! Every failure leaves the service as `{ "optimized": false, "note": ... }`
//! with the status from `PlannerError::status_code`. Internal details stay
//! in the logs.

use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::PlannerError;
use crate::pipeline::ErrorResponse;

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.note()))).into_response()
    }
}
