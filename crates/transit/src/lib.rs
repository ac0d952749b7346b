//! # transit-sim
//!
//! Timetable-driven vehicle positions for scheduled transit.
//!
//! Given a line's published stop times and the route polyline a routing
//! provider returned for it, this crate works out where every vehicle on the
//! line should be at any moment, and which way it is heading.
//!
//! ## Features
//!
//! - **Distance-indexed geometry**: vehicles move at a steady speed along the
//!   route regardless of how its points are spaced
//! - **Pure position queries**: feed any time of day, get positions back
//! - **Build-once geometry**: each line's route is turned into geometry once
//!   and shared for the rest of the session
//! - **Arrival boards**: upcoming runs at a stop, or at every stop near a point
//! - **Pluggable routing**: implement [`PolylineSource`](network::PolylineSource)
//!   to supply route polylines
//!
//! ## Example
//!
//! ```
//! use transit_sim::prelude::*;
//!
//! let stops = vec![
//!     Stop::new("Harbour", 0.0, 0.0, vec!["08:00".into()]),
//!     Stop::new("Lighthouse", 0.0, 1.0, vec!["08:10".into()]),
//! ];
//! let line = Line::new("1", "Harbour - Lighthouse", "#0057b8", TransportKind::Ferry, stops).unwrap();
//!
//! let sim = Simulator::new(vec![line], SimConfig::default()).unwrap();
//! let id = LineIdentifier::new("1");
//!
//! // The route polyline normally comes from a routing provider
//! let route = sim.line(&id).unwrap().waypoints();
//! sim.install_route(&id, route).unwrap();
//!
//! let now = parse_time_to_seconds("08:05").unwrap();
//! let positions = sim.tick(now);
//! assert_eq!(positions.len(), 1);
//! assert!((positions[0].lng - 0.5).abs() < 1e-9);
//! ```

pub mod cache;
pub mod config;
pub mod geometry;
pub mod identifiers;
pub mod interpolate;
pub mod models;
pub mod network;
pub mod positions;
pub mod schedule;
pub mod simulator;
pub mod spatial;
pub mod time;

// Re-exports for convenience
pub mod prelude {
    pub use crate::cache::GeometryCache;
    pub use crate::config::SimConfig;
    pub use crate::geometry::RouteGeometry;
    pub use crate::identifiers::*;
    pub use crate::interpolate::{interpolate_between_anchors, Located};
    pub use crate::models::{Line, Result, Stop, TransitError, TransportKind};
    pub use crate::network::{PolylineFuture, PolylineSource};
    pub use crate::positions::{compute_positions, Phase, VehiclePosition, TERMINUS_LABEL};
    pub use crate::schedule::{active_runs, next_arrivals, Arrival, RunState};
    pub use crate::simulator::Simulator;
    pub use crate::spatial::{NearbyStop, StopIndex};
    pub use crate::time::{format_clock, now_in_seconds, parse_clock, parse_time_to_seconds};
}

pub use prelude::*;
