//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry,
//!   which aborts the in-flight HTTP request
//! - Timeout errors are distinct from other errors (`NetworkTimeout`)

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::error::{PlannerError, PlannerResult};

/// Run `call` under `deadline`, surfacing `NetworkTimeout` if it elapses.
pub async fn with_deadline<T, F>(name: &'static str, deadline: Duration, call: F) -> PlannerResult<T>
where
    F: Future<Output = PlannerResult<T>>,
{
    let started = Instant::now();
    match timeout(deadline, call).await {
        Ok(result) => {
            tracing::trace!(
                call = name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "Upstream call finished"
            );
            result
        }
        Err(_) => {
            tracing::warn!(
                call = name,
                deadline_ms = deadline.as_millis() as u64,
                "Upstream call timed out"
            );
            Err(PlannerError::NetworkTimeout {
                call: name,
                after: deadline,
            })
        }
    }
}
