//! Placing a vehicle between two anchors of a route.
//!
//! Interpolation is by distance along the polyline, not by coordinate index,
//! so a vehicle moves at a steady speed however unevenly the routing provider
//! spaced its points.

use geo::Point;

use crate::geometry::RouteGeometry;
use crate::spatial::queries::initial_bearing;

/// Smallest segment length used as an interpolation denominator, in meters
const MIN_SEGMENT_METERS: f64 = 1.0;

/// An interpolated vehicle location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Located {
    /// x = longitude, y = latitude
    pub point: Point,
    /// Direction of travel in degrees [0, 360), 0 = north
    pub heading: f64,
}

/// Location `progress` of the way from `from_anchor` to `to_anchor`.
///
/// Progress is clamped to [0, 1]. A zero-length or inverted span yields the
/// from-anchor itself.
pub fn interpolate_between_anchors(
    geometry: &RouteGeometry,
    from_anchor: usize,
    to_anchor: usize,
    progress: f64,
) -> Located {
    let last = geometry.len() - 1;
    let from_anchor = from_anchor.min(last);
    let to_anchor = to_anchor.min(last);

    let cumulative = geometry.cumulative();
    let from_dist = cumulative[from_anchor];
    let to_dist = cumulative[to_anchor];

    if to_dist <= from_dist {
        return Located {
            point: geometry.point(from_anchor),
            heading: geometry.heading_at(from_anchor),
        };
    }

    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let target = from_dist + (to_dist - from_dist) * progress;

    // First segment starting at or after the anchor whose far end reaches
    // target. to_anchor > from_anchor here, so j + 1 never passes the end.
    let mut j = from_anchor;
    while j + 1 < to_anchor && cumulative[j + 1] < target {
        j += 1;
    }

    let start = geometry.point(j);
    let end = geometry.point(j + 1);
    let span = (cumulative[j + 1] - cumulative[j]).max(MIN_SEGMENT_METERS);
    let t = ((target - cumulative[j]) / span).clamp(0.0, 1.0);

    let point = Point::new(
        start.x() + (end.x() - start.x()) * t,
        start.y() + (end.y() - start.y()) * t,
    );

    Located {
        point,
        heading: initial_bearing(start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::queries::haversine_distance;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use geo::{Coord, LineString};

    fn geometry(points: &[(f64, f64)]) -> RouteGeometry {
        let line: LineString = points.iter().map(|&(lat, lng)| Coord { x: lng, y: lat }).collect();
        RouteGeometry::build(line, &[]).unwrap()
    }

    #[test]
    fn test_midpoint_lands_on_middle_coordinate() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);

        let located = interpolate_between_anchors(&geometry, 0, 2, 0.5);
        assert_abs_diff_eq!(located.point.x(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(located.point.y(), 0.0, epsilon = 1e-9);

        let expected = initial_bearing(geometry.point(0), geometry.point(1));
        assert_abs_diff_eq!(located.heading, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(located.heading, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_endpoints() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);

        let start = interpolate_between_anchors(&geometry, 0, 2, 0.0);
        assert_eq!(start.point, geometry.point(0));

        let end = interpolate_between_anchors(&geometry, 0, 2, 1.0);
        assert_abs_diff_eq!(end.point.x(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_progress_is_clamped() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 1.0)]);

        let before = interpolate_between_anchors(&geometry, 0, 1, -3.0);
        assert_eq!(before.point, geometry.point(0));

        let after = interpolate_between_anchors(&geometry, 0, 1, 7.0);
        assert_abs_diff_eq!(after.point.x(), 1.0, epsilon = 1e-9);

        let nan = interpolate_between_anchors(&geometry, 0, 1, f64::NAN);
        assert_eq!(nan.point, geometry.point(0));
    }

    #[test]
    fn test_uneven_spacing_moves_by_distance() {
        // Dense points at the start, one long segment after
        let geometry = geometry(&[(0.0, 0.0), (0.0, 0.1), (0.0, 0.2), (0.0, 0.3), (0.0, 4.0)]);

        let located = interpolate_between_anchors(&geometry, 0, 4, 0.5);
        assert_abs_diff_eq!(located.point.x(), 2.0, epsilon = 1e-6);

        let covered = haversine_distance(geometry.point(0), located.point);
        assert_relative_eq!(covered, geometry.total_distance() / 2.0, max_relative = 1e-6);
    }

    #[test]
    fn test_interpolates_within_later_anchor_span() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);

        let located = interpolate_between_anchors(&geometry, 1, 3, 0.25);
        assert_abs_diff_eq!(located.point.x(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(located.point.y(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(located.heading, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_span_returns_from_anchor() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);

        let same = interpolate_between_anchors(&geometry, 1, 1, 0.5);
        assert_eq!(same.point, geometry.point(1));
        assert_abs_diff_eq!(same.heading, 90.0, epsilon = 1e-6);

        let inverted = interpolate_between_anchors(&geometry, 2, 0, 0.5);
        assert_eq!(inverted.point, geometry.point(2));
        assert_abs_diff_eq!(inverted.heading, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_duplicate_points_do_not_divide_by_zero() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]);

        let located = interpolate_between_anchors(&geometry, 0, 2, 0.5);
        assert_eq!(located.point, geometry.point(0));
        assert!(located.heading.is_finite());
    }

    #[test]
    fn test_out_of_range_anchors_are_clamped() {
        let geometry = geometry(&[(0.0, 0.0), (0.0, 1.0)]);
        let located = interpolate_between_anchors(&geometry, 0, 10, 1.0);
        assert_abs_diff_eq!(located.point.x(), 1.0, epsilon = 1e-9);
    }
}
