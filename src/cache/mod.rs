//! Brand lookup cache.
//!
//! # Data Flow
//! ```text
//! GeoResolver (brand-aware path)
//!     → geo_cache.rs get(brand, reference point)   hit → skip network
//!     → network lookup on miss
//!     → geo_cache.rs put(brand, reference point, coordinate)
//! ```
//!
//! # Design Decisions
//! - Explicit instance passed into the resolver, never global state
//! - Clock is injected so TTL expiry is testable without sleeping
//! - Only successes are cached; failures always go back to the network
//! - Racing writers may both hit the network; last write wins

pub mod clock;
pub mod geo_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use geo_cache::{CacheEntry, GeoCache};
