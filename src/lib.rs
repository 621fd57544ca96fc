//! Stop resolution and route optimization service.

pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod resilience;
pub mod upstream;

pub use config::schema::PlannerConfig;
pub use error::{PlannerError, PlannerResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::Planner;
