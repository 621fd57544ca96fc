//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted strings
//! - Request ID flows through the trace span of every request
//! - Metrics are cheap (atomic increments) and safe to record before init

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
