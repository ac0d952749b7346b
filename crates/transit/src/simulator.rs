//! The simulation context: lines, their geometry and configuration.
//!
//! A [`Simulator`] is built once per session by whoever owns the map. It
//! holds no timers; the owner calls [`Simulator::tick`] as often as it wants
//! fresh positions.

use std::collections::HashMap;
use std::sync::Arc;

use geo::{LineString, Point};
use tracing::{debug, info, warn};

use crate::cache::GeometryCache;
use crate::config::SimConfig;
use crate::geometry::RouteGeometry;
use crate::identifiers::LineIdentifier;
use crate::models::line::Line;
use crate::models::types::{Result, TransitError};
use crate::network::PolylineSource;
use crate::positions::{compute_positions, VehiclePosition};
use crate::schedule::{merged_arrivals, next_arrivals, Arrival};
use crate::spatial::index::{NearbyStop, StopIndex};

pub struct Simulator {
    lines: Vec<Line>,
    line_map: HashMap<LineIdentifier, usize>,
    geometry: GeometryCache,
    stop_index: StopIndex,
    config: SimConfig,
}

impl Simulator {
    pub fn new(lines: Vec<Line>, config: SimConfig) -> Result<Self> {
        let mut line_map = HashMap::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if line_map.insert(line.id().clone(), i).is_some() {
                return Err(TransitError::InvalidData(format!(
                    "Duplicate line id: {}",
                    line.id()
                )));
            }
        }

        let stop_index = StopIndex::build(&lines);

        Ok(Self {
            lines,
            line_map,
            geometry: GeometryCache::new(),
            stop_index,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: &LineIdentifier) -> Option<&Line> {
        self.line_map.get(id).map(|&i| &self.lines[i])
    }

    pub fn geometry(&self, id: &LineIdentifier) -> Option<Arc<RouteGeometry>> {
        self.geometry.get(id)
    }

    pub fn is_ready(&self, id: &LineIdentifier) -> bool {
        self.geometry.contains(id)
    }

    /// Lines still waiting for a route polyline
    pub fn pending_lines(&self) -> Vec<&Line> {
        self.lines
            .iter()
            .filter(|line| !self.geometry.contains(line.id()))
            .collect()
    }

    /// Build and publish the geometry of a line from its route polyline.
    ///
    /// A line keeps the first geometry installed for it; later calls return
    /// that geometry unchanged.
    pub fn install_route(&self, id: &LineIdentifier, polyline: LineString) -> Result<Arc<RouteGeometry>> {
        let line = self
            .line(id)
            .ok_or_else(|| TransitError::LineNotFound(id.clone()))?;

        if let Some(existing) = self.geometry.get(id) {
            debug!(line = %id, "route already installed, keeping the first one");
            return Ok(existing);
        }

        let geometry = RouteGeometry::build(polyline, line.stops())?;
        if !geometry.anchors_monotonic() {
            warn!(
                line = %id,
                anchors = ?geometry.anchors(),
                "stop anchors go backwards along the route, vehicles may jump"
            );
        }

        debug!(
            line = %id,
            points = geometry.len(),
            meters = geometry.total_distance(),
            "route installed"
        );
        Ok(self.geometry.insert(id.clone(), geometry))
    }

    /// Fetch and install routes for every line that has none yet.
    ///
    /// Each line gets a single attempt. A failed line stays pending and its
    /// vehicles are not shown. Returns the number of lines that became ready.
    pub async fn load_routes(&self, source: &dyn PolylineSource) -> usize {
        let mut loaded = 0;

        for line in self.pending_lines() {
            let installed = match source.fetch_polyline(line).await {
                Ok(polyline) => self.install_route(line.id(), polyline),
                Err(e) => Err(e),
            };

            match installed {
                Ok(_) => loaded += 1,
                Err(e) => warn!(line = %line.id(), error = %e, "route unavailable"),
            }
        }

        info!(
            loaded,
            ready = self.geometry.len(),
            total = self.lines.len(),
            "route loading finished"
        );
        loaded
    }

    /// Positions of one line's vehicles. Empty while its route is not ready.
    pub fn positions(&self, id: &LineIdentifier, now: u32) -> Result<Vec<VehiclePosition>> {
        let line = self
            .line(id)
            .ok_or_else(|| TransitError::LineNotFound(id.clone()))?;

        Ok(match self.geometry.get(id) {
            Some(geometry) => compute_positions(line, &geometry, now, &self.config),
            None => Vec::new(),
        })
    }

    /// Positions of all vehicles on all lines whose route is ready.
    pub fn tick(&self, now: u32) -> Vec<VehiclePosition> {
        let mut positions = Vec::new();
        for line in &self.lines {
            match self.geometry.get(line.id()) {
                Some(geometry) => {
                    positions.extend(compute_positions(line, &geometry, now, &self.config))
                }
                None => debug!(line = %line.id(), "route not ready, skipping"),
            }
        }
        positions
    }

    /// Upcoming arrivals at one stop of a line.
    pub fn next_arrivals(&self, id: &LineIdentifier, stop_index: usize, now: u32) -> Result<Vec<Arrival>> {
        let line = self
            .line(id)
            .ok_or_else(|| TransitError::LineNotFound(id.clone()))?;
        Ok(next_arrivals(line, stop_index, now, &self.config))
    }

    /// Upcoming arrivals at every stop within `radius_m` of `point`.
    pub fn arrivals_near(&self, point: Point, radius_m: f64, now: u32) -> Vec<Arrival> {
        let nearby = self.stop_index.stops_near(point, radius_m);
        merged_arrivals(
            nearby
                .iter()
                .filter_map(|stop| Some((self.line(&stop.line_id)?, stop.stop_index))),
            now,
            &self.config,
        )
    }

    pub fn stops_near(&self, point: Point, radius_m: f64) -> Vec<NearbyStop> {
        self.stop_index.stops_near(point, radius_m)
    }

    pub fn nearest_stops(&self, point: Point, n: usize) -> Vec<NearbyStop> {
        self.stop_index.nearest_stops(point, n)
    }
}
