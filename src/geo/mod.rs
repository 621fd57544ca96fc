//! Geographic primitives.
//!
//! - coordinate.rs: `Coordinate`, haversine distance, grid keys
//! - brand.rs: brand keyword registry used to pick a resolution strategy

pub mod brand;
pub mod coordinate;

pub use brand::{Brand, BrandRegistry};
pub use coordinate::{meters_to_miles, Coordinate};
