//! Adapter between fixed-point path sets and the polygon clipping backend.
//!
//! The backend (`geo-clipper`) takes `geo` polygons in floating point plus a
//! scale factor, and rounds to integers internally. Passing the same scale as
//! [`FLOAT_TO_INT_SCALE`] makes the round trip exact: every coordinate it
//! returns is a whole fixed-point unit.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geo_clipper::{Clipper, EndType, JoinType};

use crate::math::fixed_2d::{path_to_points, IntPath, IntPoint, FLOAT_TO_INT_SCALE, INT_TO_FLOAT_SCALE};
use crate::math::polygon_2d::signed_area_2d;

/// Polygon clipping operations on fixed-point path sets.
#[derive(Debug, Clone, Copy)]
pub struct PathClipper {
    miter_limit: f64,
}

impl PathClipper {
    /// Creates a clipper whose offsets use mitered joins with `miter_limit`.
    #[must_use]
    pub fn new(miter_limit: f64) -> Self {
        Self { miter_limit }
    }

    /// Offsets closed paths by `delta` world units (negative shrinks).
    #[must_use]
    pub fn offset(&self, paths: &[IntPath], delta: f64) -> Vec<IntPath> {
        let subject = to_multi_polygon(paths);
        if subject.0.is_empty() {
            return Vec::new();
        }
        let result = subject.offset(
            delta,
            JoinType::Miter(self.miter_limit),
            EndType::ClosedPolygon,
            FLOAT_TO_INT_SCALE,
        );
        from_multi_polygon(&result)
    }

    /// Union of two path sets.
    #[must_use]
    pub fn union(&self, subject: &[IntPath], clip: &[IntPath]) -> Vec<IntPath> {
        let subject = to_multi_polygon(subject);
        let clip = to_multi_polygon(clip);
        from_multi_polygon(&subject.union(&clip, FLOAT_TO_INT_SCALE))
    }

    /// `subject` minus `clip`.
    #[must_use]
    pub fn difference(&self, subject: &[IntPath], clip: &[IntPath]) -> Vec<IntPath> {
        let subject = to_multi_polygon(subject);
        if subject.0.is_empty() {
            return Vec::new();
        }
        let clip = to_multi_polygon(clip);
        from_multi_polygon(&subject.difference(&clip, FLOAT_TO_INT_SCALE))
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_coord(p: IntPoint) -> Coord<f64> {
    Coord {
        x: p.x as f64 * INT_TO_FLOAT_SCALE,
        y: p.y as f64 * INT_TO_FLOAT_SCALE,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn from_coord(c: Coord<f64>) -> IntPoint {
    IntPoint::new(
        (c.x * FLOAT_TO_INT_SCALE).round() as i64,
        (c.y * FLOAT_TO_INT_SCALE).round() as i64,
    )
}

/// Every path becomes its own exterior ring; orientation is passed through
/// untouched so holes keep cancelling under the backend's fill rule.
fn to_multi_polygon(paths: &[IntPath]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        paths
            .iter()
            .filter(|path| path.len() >= 3)
            .map(|path| {
                let ring: LineString<f64> = path.iter().copied().map(to_coord).collect();
                Polygon::new(ring, Vec::new())
            })
            .collect(),
    )
}

/// Exteriors come back counter-clockwise and holes clockwise.
fn from_multi_polygon(mp: &MultiPolygon<f64>) -> Vec<IntPath> {
    let mut paths = Vec::new();
    for polygon in &mp.0 {
        push_ring(&mut paths, polygon.exterior(), true);
        for hole in polygon.interiors() {
            push_ring(&mut paths, hole, false);
        }
    }
    paths
}

fn push_ring(paths: &mut Vec<IntPath>, ring: &LineString<f64>, exterior: bool) {
    let mut path: IntPath = ring.coords().copied().map(from_coord).collect();
    if path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    if path.len() < 3 {
        return;
    }
    if (path_area(&path) > 0.0) != exterior {
        path.reverse();
    }
    paths.push(path);
}

/// Signed area of a fixed-point loop in world units (positive when
/// counter-clockwise).
#[must_use]
pub fn path_area(path: &[IntPoint]) -> f64 {
    signed_area_2d(&path_to_points(path))
}

/// Reverses loops with negative area so every loop is counter-clockwise.
pub fn orient_positive(paths: &mut [IntPath]) {
    for path in paths.iter_mut() {
        if path_area(path) < 0.0 {
            path.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed_2d::path_from_points;
    use crate::math::Point2;

    fn square(min: f64, max: f64) -> IntPath {
        path_from_points(&[
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ])
    }

    fn total_area(paths: &[IntPath]) -> f64 {
        paths.iter().map(|p| path_area(p)).sum()
    }

    #[test]
    fn offset_shrinks_square() {
        let clipper = PathClipper::new(2.0);
        let result = clipper.offset(&[square(0.0, 10.0)], -2.0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
        assert!((total_area(&result).abs() - 36.0).abs() < 1e-6);
    }

    #[test]
    fn offset_past_collapse_is_empty() {
        let clipper = PathClipper::new(2.0);
        assert!(clipper.offset(&[square(0.0, 10.0)], -6.0).is_empty());
    }

    #[test]
    fn union_of_overlapping_squares() {
        let clipper = PathClipper::new(2.0);
        let result = clipper.union(&[square(0.0, 2.0)], &[square(1.0, 3.0)]);
        assert_eq!(result.len(), 1);
        assert!((total_area(&result).abs() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn difference_cuts_corner() {
        let clipper = PathClipper::new(2.0);
        let result = clipper.difference(&[square(0.0, 2.0)], &[square(1.0, 3.0)]);
        assert!((total_area(&result).abs() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn holes_come_back_clockwise() {
        let clipper = PathClipper::new(2.0);
        let result = clipper.difference(&[square(0.0, 4.0)], &[square(1.0, 3.0)]);
        assert_eq!(result.len(), 2);
        let outer = result.iter().filter(|p| path_area(p) > 0.0).count();
        let holes = result.iter().filter(|p| path_area(p) < 0.0).count();
        assert_eq!((outer, holes), (1, 1));
        assert!((total_area(&result) - 12.0).abs() < 1e-6);
    }

    #[test]
    fn path_area_is_signed_world_area() {
        let mut sq = square(1.0, 3.5);
        assert!((path_area(&sq) - 6.25).abs() < 1e-9);
        sq.reverse();
        assert!((path_area(&sq) + 6.25).abs() < 1e-9);
    }

    #[test]
    fn orientation_normalized() {
        let mut sq = square(0.0, 1.0);
        sq.reverse();
        let mut paths = vec![sq];
        orient_positive(&mut paths);
        assert!(path_area(&paths[0]) > 0.0);
    }
}
