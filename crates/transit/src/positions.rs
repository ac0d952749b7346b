//! Vehicle positions for one line at one instant.
//!
//! [`compute_positions`] is a pure function of the timetable, the route
//! geometry and the time. Whoever drives the simulation decides how often to
//! call it.

use std::sync::Arc;

use geo::Point;
use tracing::debug;

use crate::config::SimConfig;
use crate::geometry::RouteGeometry;
use crate::identifiers::LineIdentifier;
use crate::interpolate::interpolate_between_anchors;
use crate::models::line::Line;
use crate::models::types::TransportKind;
use crate::schedule::{active_runs, RunState};
use crate::time::format_clock;

/// Stand-in for the "next stop" of a vehicle waiting at the end of its run
pub const TERMINUS_LABEL: &str = "Terminus";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    InTransit,
    AtTerminus,
}

/// Where one run of a line is at a given moment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VehiclePosition {
    pub line_id: LineIdentifier,
    pub kind: TransportKind,
    pub run: usize,
    pub lat: f64,
    pub lng: f64,
    /// Degrees [0, 360), 0 = north
    pub heading: f64,
    pub from_stop: Arc<str>,
    pub to_stop: Arc<str>,
    pub progress: f64,
    pub on_route: bool,
    pub phase: Phase,
    pub departure_time: String,
    pub arrival_time: String,
    pub current_time: String,
}

impl VehiclePosition {
    pub fn point(&self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

/// Positions of every active run of `line` at `now` (seconds since midnight).
pub fn compute_positions(
    line: &Line,
    geometry: &RouteGeometry,
    now: u32,
    config: &SimConfig,
) -> Vec<VehiclePosition> {
    let current_time = format_clock(now);

    active_runs(line, now, config)
        .into_iter()
        .filter_map(|state| position_for(line, geometry, state, &current_time))
        .collect()
}

fn position_for(
    line: &Line,
    geometry: &RouteGeometry,
    state: RunState,
    current_time: &str,
) -> Option<VehiclePosition> {
    let stops = line.stops();
    let run = state.run();

    let (point, heading, from_stop, to_stop, phase) = match state {
        RunState::InTransit {
            from_stop,
            to_stop,
            progress,
            ..
        } => {
            let (Some(from_anchor), Some(to_anchor)) =
                (geometry.anchor(from_stop), geometry.anchor(to_stop))
            else {
                debug!(line = %line.id(), run, "geometry has no anchor for stop, skipping run");
                return None;
            };
            let located = interpolate_between_anchors(geometry, from_anchor, to_anchor, progress);
            (
                located.point,
                located.heading,
                stops[from_stop].name.clone(),
                stops[to_stop].name.clone(),
                Phase::InTransit,
            )
        }
        RunState::AtTerminus { .. } => {
            let terminus = line.terminus();
            let anchor = geometry.anchor(stops.len() - 1).unwrap_or(geometry.len() - 1);
            (
                terminus.location,
                geometry.heading_at(anchor),
                terminus.name.clone(),
                Arc::from(TERMINUS_LABEL),
                Phase::AtTerminus,
            )
        }
    };

    Some(VehiclePosition {
        line_id: line.id().clone(),
        kind: line.kind(),
        run,
        lat: point.y(),
        lng: point.x(),
        heading,
        from_stop,
        to_stop,
        progress: state.progress(),
        on_route: true,
        phase,
        departure_time: line.origin().times[run].clone(),
        arrival_time: line.terminus().times[run].clone(),
        current_time: current_time.to_string(),
    })
}
