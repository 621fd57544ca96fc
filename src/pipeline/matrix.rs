//! Best-effort driving distance and ETA enrichment.

use std::sync::Arc;
use std::time::Duration;

use crate::geo::Coordinate;
use crate::observability::metrics;
use crate::pipeline::stop::ResolvedStop;
use crate::resilience::with_deadline;
use crate::upstream::DistanceMatrixProvider;

/// Whether the matrix step produced driving data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixOutcome {
    Applied,
    Degraded,
}

/// Minutes shown to the caller; never zero.
pub fn eta_minutes(duration_s: f64) -> u32 {
    ((duration_s / 60.0).round() as u32).max(1)
}

/// One-origin matrix call applied to resolved stops.
pub struct DistanceMatrixClient {
    provider: Arc<dyn DistanceMatrixProvider>,
    deadline: Duration,
}

impl DistanceMatrixClient {
    pub fn new(provider: Arc<dyn DistanceMatrixProvider>, deadline: Duration) -> Self {
        Self { provider, deadline }
    }

    /// Fill `driving_m` and `eta_min` where the matrix has values.
    ///
    /// Any failure leaves every stop untouched and reports `Degraded`.
    pub async fn enrich(&self, origin: Coordinate, stops: &mut [ResolvedStop]) -> MatrixOutcome {
        let points: Vec<Coordinate> = stops.iter().map(|s| s.coordinate).collect();

        let matrix = match with_deadline(
            "matrix",
            self.deadline,
            self.provider.one_to_many(origin, &points),
        )
        .await
        {
            Ok(matrix)
                if matrix.distances_m.len() == stops.len()
                    && matrix.durations_s.len() == stops.len() =>
            {
                matrix
            }
            Ok(_) => {
                tracing::warn!(stops = stops.len(), "Matrix size mismatch, using straight-line distances");
                metrics::record_matrix_degraded();
                return MatrixOutcome::Degraded;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Matrix call failed, using straight-line distances");
                metrics::record_matrix_degraded();
                return MatrixOutcome::Degraded;
            }
        };

        for (i, stop) in stops.iter_mut().enumerate() {
            stop.driving_m = matrix.distances_m[i];
            stop.eta_min = matrix.durations_s[i].map(eta_minutes);
        }
        MatrixOutcome::Applied
    }
}
