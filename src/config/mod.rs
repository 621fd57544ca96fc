//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! planner.toml (optional)
//!     → loader.rs (parse & deserialize, env overrides for API keys)
//!     → validation.rs (semantic checks)
//!     → PlannerConfig (validated, immutable)
//!     → credentials() checked once while building upstream clients
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    BrandConfig, CacheConfig, Credentials, GeocodingConfig, LimitsConfig, ListenerConfig,
    ObservabilityConfig, PlannerConfig, ProviderConfig, TimeoutConfig,
};
