//! Stop resolution and route optimization.
//!
//! # Data Flow
//! ```text
//! OptimizeRequest
//!     → request.rs (validation, no network)
//!     → resolver.rs (origin, then every stop concurrently; GeoCache for brands)
//!     → matrix.rs (driving distance/ETA, failure degrades to straight-line)
//!     → destination.rs (caller choice or farthest stop)
//!     → optimizer.rs (jobs 1..N, solver, order mapped back)
//!     → assembler.rs (preview or final payload)
//! ```
//!
//! `planner.rs` drives the steps above for one request.

pub mod assembler;
pub mod destination;
pub mod matrix;
pub mod optimizer;
pub mod planner;
pub mod request;
pub mod resolver;
pub mod stop;

pub use assembler::{ErrorResponse, FinalResponse, PlanResponse, PreviewResponse};
pub use planner::Planner;
pub use request::{OptimizeRequest, StopRequest};
pub use stop::{ResolutionSource, ResolvedStop};
