//! Spatial indexing and query utilities.

pub mod index;
pub mod queries;

pub use index::{NearbyStop, StopIndex};
pub use queries::{haversine_distance, initial_bearing};
