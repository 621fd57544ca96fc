//! Stop ids ↔ solver jobs, and the visiting order that comes back.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PlannerError, PlannerResult};
use crate::geo::Coordinate;
use crate::pipeline::stop::ResolvedStop;
use crate::resilience::with_deadline;
use crate::upstream::{RoutingSolver, SolverJob, SolverProblem, SolverSolution, SolverVehicle};

/// Optimized visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Every stop id, destination last.
    pub ordered_ids: Vec<String>,
    pub destination_id: String,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

/// Job id → stop id for one request. Job `n` is `stop_ids[n - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobTable {
    stop_ids: Vec<String>,
}

impl JobTable {
    pub fn stop_id(&self, job_id: u64) -> Option<&str> {
        let index = usize::try_from(job_id).ok()?.checked_sub(1)?;
        self.stop_ids.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stop_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_ids.is_empty()
    }
}

/// Build the single-vehicle problem ending at `destination_id`.
///
/// Non-destination stops become jobs `1..=N` in input order.
pub fn build_problem(
    origin: Coordinate,
    stops: &[ResolvedStop],
    destination_id: &str,
    profile: &str,
) -> PlannerResult<(SolverProblem, JobTable)> {
    let destination = stops
        .iter()
        .find(|s| s.id == destination_id)
        .ok_or_else(|| {
            PlannerError::Internal(format!("destination {destination_id:?} is not a stop"))
        })?;

    let mut jobs = Vec::with_capacity(stops.len().saturating_sub(1));
    let mut stop_ids = Vec::with_capacity(jobs.capacity());
    for stop in stops.iter().filter(|s| s.id != destination_id) {
        jobs.push(SolverJob {
            id: stop_ids.len() as u64 + 1,
            location: stop.coordinate,
        });
        stop_ids.push(stop.id.clone());
    }

    let problem = SolverProblem {
        jobs,
        vehicles: vec![SolverVehicle {
            id: 1,
            profile: profile.to_string(),
            start: origin,
            end: destination.coordinate,
        }],
    };
    Ok((problem, JobTable { stop_ids }))
}

/// Map the solver's job order back to stop ids and append the destination.
pub fn reconstruct(
    table: &JobTable,
    solution: SolverSolution,
    destination_id: &str,
) -> PlannerResult<RouteResult> {
    if !solution.unassigned.is_empty() {
        return Err(PlannerError::SolverFailure(format!(
            "{} stops could not be routed",
            solution.unassigned.len()
        )));
    }

    let mut visited = HashSet::with_capacity(table.len());
    let mut ordered_ids = Vec::with_capacity(table.len() + 1);
    for job_id in solution.job_order {
        let stop_id = table
            .stop_id(job_id)
            .ok_or_else(|| PlannerError::SolverFailure(format!("unknown job {job_id}")))?;
        if !visited.insert(job_id) {
            return Err(PlannerError::SolverFailure(format!("job {job_id} visited twice")));
        }
        ordered_ids.push(stop_id.to_string());
    }

    if ordered_ids.len() != table.len() {
        return Err(PlannerError::SolverFailure(format!(
            "route visits {} of {} stops",
            ordered_ids.len(),
            table.len()
        )));
    }

    ordered_ids.push(destination_id.to_string());
    Ok(RouteResult {
        ordered_ids,
        destination_id: destination_id.to_string(),
        distance_m: solution.distance_m,
        duration_s: solution.duration_s,
    })
}

/// Calls the routing solver for one request.
pub struct RouteOptimizer {
    solver: Arc<dyn RoutingSolver>,
    profile: String,
    deadline: Duration,
}

impl RouteOptimizer {
    pub fn new(solver: Arc<dyn RoutingSolver>, profile: impl Into<String>, deadline: Duration) -> Self {
        Self {
            solver,
            profile: profile.into(),
            deadline,
        }
    }

    pub async fn optimize(
        &self,
        origin: Coordinate,
        stops: &[ResolvedStop],
        destination_id: &str,
    ) -> PlannerResult<RouteResult> {
        let (problem, table) = build_problem(origin, stops, destination_id, &self.profile)?;

        if table.is_empty() {
            // Only the destination; nothing to order.
            return Ok(RouteResult {
                ordered_ids: vec![destination_id.to_string()],
                destination_id: destination_id.to_string(),
                distance_m: None,
                duration_s: None,
            });
        }

        let solution = with_deadline("solver", self.deadline, self.solver.solve(&problem))
            .await
            .map_err(|e| match e {
                PlannerError::UpstreamFailure { message, .. } => PlannerError::SolverFailure(message),
                other => other,
            })?;

        tracing::debug!(
            jobs = table.len(),
            distance_m = solution.distance_m,
            duration_s = solution.duration_s,
            "Solver returned a route"
        );
        reconstruct(&table, solution, destination_id)
    }
}
