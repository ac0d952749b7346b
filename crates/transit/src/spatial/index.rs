//! R-tree over every stop of every line.
//!
//! ## Two-Stage Filtering
//!
//! Radius queries first ask the R-tree for candidates within a degree radius
//! that is wide enough for the query latitude, then keep only the stops whose
//! Haversine distance is inside the requested radius in meters.

use std::sync::Arc;

use geo::Point;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::identifiers::LineIdentifier;
use crate::models::line::Line;
use crate::spatial::queries::{haversine_distance, search_radius_degrees};

// ============================================================================
// Stop Spatial Node
// ============================================================================

#[derive(Clone, Debug)]
pub struct StopNode {
    pub line_id: LineIdentifier,
    pub stop_index: usize,
    pub name: Arc<str>,
    pub location: Point,
    point: [f64; 2],
}

impl StopNode {
    pub fn new(line_id: LineIdentifier, stop_index: usize, name: Arc<str>, location: Point) -> Self {
        Self {
            line_id,
            stop_index,
            name,
            location,
            point: [location.x(), location.y()],
        }
    }
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StopNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ============================================================================
// Stop Index
// ============================================================================

/// A stop found by a spatial query
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyStop {
    pub line_id: LineIdentifier,
    pub stop_index: usize,
    pub name: Arc<str>,
    pub location: Point,
    pub distance_m: f64,
}

#[derive(Clone, Debug, Default)]
pub struct StopIndex {
    tree: RTree<StopNode>,
}

impl StopIndex {
    pub fn build<'a>(lines: impl IntoIterator<Item = &'a Line>) -> Self {
        let nodes = lines
            .into_iter()
            .flat_map(|line| {
                line.stops().iter().enumerate().map(move |(i, stop)| {
                    StopNode::new(line.id().clone(), i, stop.name.clone(), stop.location)
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops within `radius_m` meters of `point`, closest first.
    pub fn stops_near(&self, point: Point, radius_m: f64) -> Vec<NearbyStop> {
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        let degrees = search_radius_degrees(radius_m, point.y());
        let mut found: Vec<NearbyStop> = self
            .tree
            .locate_within_distance([point.x(), point.y()], degrees * degrees)
            .map(|node| nearby(node, point))
            .filter(|stop| stop.distance_m <= radius_m)
            .collect();

        found.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        found
    }

    /// The `n` stops closest to `point`.
    pub fn nearest_stops(&self, point: Point, n: usize) -> Vec<NearbyStop> {
        let mut found: Vec<NearbyStop> = self
            .tree
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .take(n)
            .map(|node| nearby(node, point))
            .collect();

        // Planar order can differ slightly from geodesic order
        found.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        found
    }
}

fn nearby(node: &StopNode, from: Point) -> NearbyStop {
    NearbyStop {
        line_id: node.line_id.clone(),
        stop_index: node.stop_index,
        name: node.name.clone(),
        location: node.location,
        distance_m: haversine_distance(from, node.location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::line::Stop;
    use crate::models::types::TransportKind;

    fn lines() -> Vec<Line> {
        let times = || vec!["08:00".to_string()];
        vec![
            Line::new(
                "1",
                "Old Town",
                "#f00",
                TransportKind::Bus,
                vec![
                    Stop::new("Bus Station", 42.4572, 18.5310, times()),
                    Stop::new("Old Town", 42.4530, 18.5370, times()),
                ],
            )
            .unwrap(),
            Line::new(
                "2",
                "Bay",
                "#00f",
                TransportKind::Ferry,
                vec![
                    Stop::new("Pier", 42.4505, 18.5355, times()),
                    Stop::new("Across the Bay", 42.4300, 18.6900, times()),
                ],
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_empty_index() {
        let index = StopIndex::default();
        assert!(index.is_empty());
        assert!(index.stops_near(Point::new(18.53, 42.45), 1000.0).is_empty());
    }

    #[test]
    fn test_stops_near() {
        let lines = lines();
        let index = StopIndex::build(&lines);
        assert_eq!(index.len(), 4);

        // Near the old town, ferry pier and old town stop are a few hundred meters away
        let here = Point::new(18.5365, 42.4520);
        let found = index.stops_near(here, 500.0);
        let names: Vec<&str> = found.iter().map(|s| &*s.name).collect();
        assert_eq!(names, vec!["Old Town", "Pier"]);
        assert!(found.windows(2).all(|w| w[0].distance_m <= w[1].distance_m));
        assert!(found.iter().all(|s| s.distance_m <= 500.0));
        assert_eq!(found[1].line_id, LineIdentifier::new("2"));
        assert_eq!(found[1].stop_index, 0);
    }

    #[test]
    fn test_invalid_radius() {
        let lines = lines();
        let index = StopIndex::build(&lines);
        let here = Point::new(18.5365, 42.4520);
        assert!(index.stops_near(here, 0.0).is_empty());
        assert!(index.stops_near(here, f64::NAN).is_empty());
    }

    #[test]
    fn test_nearest_stops() {
        let lines = lines();
        let index = StopIndex::build(&lines);

        let found = index.nearest_stops(Point::new(18.69, 42.43), 2);
        assert_eq!(found.len(), 2);
        assert_eq!(&*found[0].name, "Across the Bay");
    }
}
