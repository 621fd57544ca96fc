//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router (`POST /api/optimize`, `GET /health`)
//! - Wire up middleware (request ID, tracing) and the body limit
//! - Bound each planning run by `timeouts.request_secs`
//! - Bind to a listener and serve until shutdown is broadcast
//! - Record request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::observability::metrics;
use crate::pipeline::{OptimizeRequest, Planner};
use crate::resilience::timeouts::with_deadline;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<Planner>,
    pub request_timeout: Duration,
}

/// HTTP front end for the planner.
pub struct HttpServer {
    router: Router,
    config: PlannerConfig,
}

impl HttpServer {
    pub fn new(config: PlannerConfig, planner: Arc<Planner>) -> Self {
        let state = AppState {
            planner,
            request_timeout: config.timeouts.request(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Oversized bodies surface as a `JsonRejection` in the handler, so they
    /// get the same error shape as any other invalid request.
    fn build_router(config: &PlannerConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request.headers().request_id(),
                    )
                }),
            );

        Router::new()
            .route("/api/optimize", post(optimize_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(middleware)
    }

    /// Serve until a value arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn optimize_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = headers.request_id();

    let (mode, result) = match payload {
        Ok(Json(request)) => {
            let mode = if request.preview_only { "preview" } else { "final" };
            tracing::debug!(
                request_id = %request_id,
                stops = request.stops.len(),
                mode,
                "Planning trip"
            );
            let planned = with_deadline("request", state.request_timeout, state.planner.plan(request));
            (mode, planned.await)
        }
        Err(rejection) => (
            "unknown",
            Err(PlannerError::InvalidInput(rejection.body_text())),
        ),
    };

    match result {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                mode,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Trip planned"
            );
            metrics::record_request(mode, 200, start_time);
            Json(response).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, kind = e.kind(), error = %e, "Planning failed");
            } else {
                tracing::info!(request_id = %request_id, kind = e.kind(), error = %e, "Request rejected");
            }
            metrics::record_request(mode, status.as_u16(), start_time);
            e.into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
