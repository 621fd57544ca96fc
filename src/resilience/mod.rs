//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call (geocode, places, matrix, solver):
//!     → timeouts.rs (deadline-bound call, cancelled when the deadline elapses)
//!     → NetworkTimeout or the call's own result
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: each call is attempted once, callers retry whole requests
//! - Cancelling one call never touches calls running beside it

pub mod timeouts;

pub use timeouts::with_deadline;
