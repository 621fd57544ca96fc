//! Shared plumbing for the HTTP adapters.

use std::time::Instant;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{PlannerError, PlannerResult};
use crate::observability::metrics;

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY: usize = 300;

// openrouteservice error payloads look like {"error": {"code": 2003, "message": "..."}}
// or {"error": "..."}.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Structured { error: ErrorDetail },
    Plain { error: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<i64>,
    message: String,
}

/// Send a request and decode a JSON body, mapping every failure to
/// `UpstreamFailure` for `service`.
pub(crate) async fn send_json<T>(service: &'static str, request: RequestBuilder) -> PlannerResult<T>
where
    T: DeserializeOwned,
{
    let started = Instant::now();
    tracing::debug!(service, "Calling upstream");

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            // The URL carries the API key for some providers.
            let e = e.without_url();
            tracing::warn!(service, error = %e, "Upstream request failed");
            metrics::record_upstream_call(service, "transport_error");
            return Err(PlannerError::upstream(service, e.to_string()));
        }
    };

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        metrics::record_upstream_call(service, "transport_error");
        PlannerError::upstream(service, e.without_url().to_string())
    })?;

    if !status.is_success() {
        let message = describe_error_body(&text);
        tracing::warn!(
            service,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            message = %message,
            "Upstream returned non-success status"
        );
        metrics::record_upstream_call(service, "http_error");
        return Err(PlannerError::upstream(
            service,
            format!("HTTP {}: {}", status.as_u16(), message),
        ));
    }

    match serde_json::from_str::<T>(&text) {
        Ok(body) => {
            tracing::debug!(
                service,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Upstream call succeeded"
            );
            metrics::record_upstream_call(service, "ok");
            Ok(body)
        }
        Err(e) => {
            tracing::warn!(service, error = %e, "Failed to parse upstream response");
            metrics::record_upstream_call(service, "invalid_body");
            Err(PlannerError::upstream(service, format!("invalid response: {}", e)))
        }
    }
}

fn describe_error_body(text: &str) -> String {
    match serde_json::from_str::<ErrorPayload>(text) {
        Ok(ErrorPayload::Structured { error }) => match error.code {
            Some(code) => format!("code {}: {}", code, error.message),
            None => error.message,
        },
        Ok(ErrorPayload::Plain { error }) => error,
        Err(_) => text.chars().take(MAX_ERROR_BODY).collect(),
    }
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
