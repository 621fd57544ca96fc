//! Picks the trip's final stop.

use crate::error::{PlannerError, PlannerResult};
use crate::pipeline::stop::ResolvedStop;

/// Why a stop was chosen as the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    CallerChoice,
    FarthestDriving,
    FarthestStraightLine,
}

impl SelectionReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SelectionReason::CallerChoice => "chosen by caller",
            SelectionReason::FarthestDriving => "farthest by driving distance",
            SelectionReason::FarthestStraightLine => "farthest by straight-line distance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationChoice {
    pub stop_id: String,
    pub reason: SelectionReason,
}

/// Honour `requested` when it names a stop; otherwise take the stop with
/// the strictly greatest ranking distance, earliest stop on a tie.
pub fn select(stops: &[ResolvedStop], requested: Option<&str>) -> PlannerResult<DestinationChoice> {
    if let Some(requested) = requested {
        if stops.iter().any(|s| s.id == requested) {
            return Ok(DestinationChoice {
                stop_id: requested.to_string(),
                reason: SelectionReason::CallerChoice,
            });
        }
        tracing::debug!(destination_id = %requested, "Requested destination is not a stop, ignoring");
    }

    let mut best: Option<&ResolvedStop> = None;
    for stop in stops {
        match best {
            Some(current) if stop.ranking_distance_m() > current.ranking_distance_m() => {
                best = Some(stop)
            }
            None => best = Some(stop),
            _ => {}
        }
    }

    let best = best.ok_or_else(|| PlannerError::Internal("no stops to choose from".into()))?;
    let reason = if best.driving_m.is_some() {
        SelectionReason::FarthestDriving
    } else {
        SelectionReason::FarthestStraightLine
    };

    Ok(DestinationChoice {
        stop_id: best.id.clone(),
        reason,
    })
}
