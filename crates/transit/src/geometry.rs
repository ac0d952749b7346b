//! Distance-indexed route geometry.
//!
//! A routing provider returns a route as a bare list of coordinates. To move a
//! vehicle along it at a steady speed we need to know how far along the route
//! every coordinate lies, and which coordinate stands in for each stop (its
//! "anchor").

use geo::{Coord, LineString, Point};

use crate::models::line::Stop;
use crate::models::types::{Result, TransitError};
use crate::spatial::queries::{haversine_distance, initial_bearing};

/// Route polyline with cumulative distances and per-stop anchors.
///
/// Immutable once built; shared between consumers behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteGeometry {
    coords: Vec<Coord>,
    cumulative: Vec<f64>,
    anchors: Vec<usize>,
}

impl RouteGeometry {
    /// Build the geometry for `stops` over the provider's `polyline`.
    ///
    /// Coordinates use x = longitude, y = latitude.
    pub fn build(polyline: LineString, stops: &[Stop]) -> Result<Self> {
        let coords = polyline.0;

        if coords.is_empty() {
            return Err(TransitError::InvalidData("Route polyline is empty".into()));
        }
        if let Some(bad) = coords.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(TransitError::InvalidData(format!(
                "Route polyline contains a non-finite coordinate: {:?}",
                bad
            )));
        }

        let cumulative = cumulative_distances(&coords);
        let anchors = stops
            .iter()
            .map(|stop| nearest_index(&coords, stop.location))
            .collect();

        Ok(Self {
            coords,
            cumulative,
            anchors,
        })
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Distance in meters from the first coordinate to each coordinate
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Route length in meters
    pub fn total_distance(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Anchor index for every stop, in stop order
    pub fn anchors(&self) -> &[usize] {
        &self.anchors
    }

    pub fn anchor(&self, stop_index: usize) -> Option<usize> {
        self.anchors.get(stop_index).copied()
    }

    /// Whether anchors only ever move forward along the polyline.
    ///
    /// Holds for well-behaved provider data. A self-intersecting route can
    /// break it, in which case vehicles may appear to jump backwards.
    pub fn anchors_monotonic(&self) -> bool {
        self.anchors.windows(2).all(|w| w[0] <= w[1])
    }

    /// Coordinate at `index`, clamped to the last coordinate.
    pub fn point(&self, index: usize) -> Point {
        Point::from(self.coords[index.min(self.coords.len() - 1)])
    }

    /// Heading of the route at a coordinate.
    ///
    /// Uses the bearing towards the next coordinate, or from the previous one
    /// at the end of the route. A single-point route has heading 0.
    pub fn heading_at(&self, index: usize) -> f64 {
        let n = self.coords.len();
        if n < 2 {
            return 0.0;
        }
        let index = index.min(n - 1);
        if index < n - 1 {
            initial_bearing(self.point(index), self.point(index + 1))
        } else {
            initial_bearing(self.point(n - 2), self.point(n - 1))
        }
    }
}

/// Running great-circle distance from the first coordinate.
fn cumulative_distances(coords: &[Coord]) -> Vec<f64> {
    let mut total = 0.0;
    let mut out = Vec::with_capacity(coords.len());
    out.push(0.0);
    for pair in coords.windows(2) {
        total += haversine_distance(Point::from(pair[0]), Point::from(pair[1]));
        out.push(total);
    }
    out
}

/// Index of the coordinate closest to `target`, first one wins on ties.
///
/// Compares planar distance in degrees, which is enough to rank candidates a
/// few hundred meters apart.
pub fn nearest_index(coords: &[Coord], target: Point) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in coords.iter().enumerate() {
        let dx = c.x - target.x();
        let dy = c.y - target.y();
        let d = dx * dx + dy * dy;
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}
