//! Spatial indexing and query utilities.

pub mod index;
pub mod queries;

pub use index::{NearbyRoute, NearbyStop, ProximityIndex};
pub use queries::{bearing_degrees, haversine_distance, haversine_km};
