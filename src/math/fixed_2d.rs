//! Fixed-point (scaled integer) geometry.
//!
//! The clipping backend works on integer coordinates; these helpers share that
//! representation so containment and projection tests agree exactly with the
//! paths it produces.

use super::Point2;

/// Scale from world units to fixed-point units (same as Physics2D).
pub const FLOAT_TO_INT_SCALE: f64 = 10_000_000.0;

/// Scale from fixed-point units back to world units.
pub const INT_TO_FLOAT_SCALE: f64 = 1.0 / FLOAT_TO_INT_SCALE;

/// A point in fixed-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

/// A closed loop of fixed-point points (the closing edge is implicit).
pub type IntPath = Vec<IntPoint>;

impl IntPoint {
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts a world-space point, rounding to the nearest fixed-point unit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_point(p: &Point2) -> Self {
        Self {
            x: (p.x * FLOAT_TO_INT_SCALE).round() as i64,
            y: (p.y * FLOAT_TO_INT_SCALE).round() as i64,
        }
    }

    /// Converts back to world space.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_point(self) -> Point2 {
        Point2::new(
            self.x as f64 * INT_TO_FLOAT_SCALE,
            self.y as f64 * INT_TO_FLOAT_SCALE,
        )
    }

    /// Squared distance in fixed-point units, computed in floating point to
    /// stay clear of `i64` overflow.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sqr_distance(self, other: IntPoint) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx * dx + dy * dy
    }

    /// Linear interpolation towards `other`, rounded to fixed-point units.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn lerp(self, other: IntPoint, t: f64) -> Self {
        Self {
            x: (self.x as f64 + (other.x - self.x) as f64 * t).round() as i64,
            y: (self.y as f64 + (other.y - self.y) as f64 * t).round() as i64,
        }
    }
}

/// Converts a world-space loop to fixed point.
#[must_use]
pub fn path_from_points(points: &[Point2]) -> IntPath {
    points.iter().map(IntPoint::from_point).collect()
}

/// Converts a fixed-point loop to world space.
#[must_use]
pub fn path_to_points(path: &[IntPoint]) -> Vec<Point2> {
    path.iter().map(|p| p.to_point()).collect()
}

/// Where a point lies relative to a closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Outside,
    Inside,
    OnBoundary,
}

impl PointLocation {
    /// True for `Inside` and `OnBoundary`.
    #[must_use]
    pub fn is_contained(self) -> bool {
        !matches!(self, PointLocation::Outside)
    }
}

/// Point-in-polygon test for a closed fixed-point loop.
///
/// Uses the crossing rule of Hormann & Agathos with exact integer
/// orientation tests, so points exactly on an edge are reported as
/// `OnBoundary`.
#[must_use]
pub fn point_in_polygon(pt: IntPoint, path: &[IntPoint]) -> PointLocation {
    let n = path.len();
    if n < 3 {
        return PointLocation::Outside;
    }

    let mut inside = false;
    let mut ip = path[0];
    for i in 1..=n {
        let next = if i == n { path[0] } else { path[i] };

        if next.y == pt.y
            && (next.x == pt.x || (ip.y == pt.y && ((next.x > pt.x) == (ip.x < pt.x))))
        {
            return PointLocation::OnBoundary;
        }

        if (ip.y < pt.y) != (next.y < pt.y) {
            if ip.x >= pt.x && next.x > pt.x {
                inside = !inside;
            } else if ip.x >= pt.x || next.x > pt.x {
                let d = i128::from(ip.x - pt.x) * i128::from(next.y - pt.y)
                    - i128::from(next.x - pt.x) * i128::from(ip.y - pt.y);
                if d == 0 {
                    return PointLocation::OnBoundary;
                }
                if (d > 0) == (next.y > ip.y) {
                    inside = !inside;
                }
            }
        }
        ip = next;
    }

    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}

/// Classification of a fixed-point segment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedIntersection {
    /// Parallel (or degenerate) and apart.
    None,
    /// The supporting lines cross outside at least one segment.
    Lines,
    /// The segments cross, or are near-coincident parallels.
    Segments,
}

/// Segment intersection test for `p1-p2` against `p3-p4`.
///
/// Parallel segments are never reported as crossing unless one of their
/// endpoints lies within `coincident_distance` (world units) of an endpoint of
/// the other; that catches near-duplicate lines that the parametric solve
/// cannot classify. `parallel_epsilon` is relative to the product of the
/// segment lengths.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn find_intersection(
    p1: IntPoint,
    p2: IntPoint,
    p3: IntPoint,
    p4: IntPoint,
    parallel_epsilon: f64,
    coincident_distance: f64,
) -> FixedIntersection {
    let dx12 = (p2.x - p1.x) as f64;
    let dy12 = (p2.y - p1.y) as f64;
    let dx34 = (p4.x - p3.x) as f64;
    let dy34 = (p4.y - p3.y) as f64;

    let denominator = dy12 * dx34 - dx12 * dy34;
    let lengths = (dx12 * dx12 + dy12 * dy12).sqrt() * (dx34 * dx34 + dy34 * dy34).sqrt();
    if denominator.abs() <= parallel_epsilon * lengths || !denominator.is_normal() {
        let limit = coincident_distance * FLOAT_TO_INT_SCALE;
        let limit_sq = limit * limit;
        if p1.sqr_distance(p3) < limit_sq
            || p1.sqr_distance(p4) < limit_sq
            || p2.sqr_distance(p3) < limit_sq
            || p2.sqr_distance(p4) < limit_sq
        {
            return FixedIntersection::Segments;
        }
        return FixedIntersection::None;
    }

    let t1 = ((p1.x - p3.x) as f64 * dy34 + (p3.y - p1.y) as f64 * dx34) / denominator;
    let t2 = ((p3.x - p1.x) as f64 * dy12 + (p1.y - p3.y) as f64 * dx12) / -denominator;
    if (0.0..=1.0).contains(&t1) && (0.0..1.0).contains(&t2) {
        FixedIntersection::Segments
    } else {
        FixedIntersection::Lines
    }
}

/// Parameter in `[0, 1]` of the projection of `p` onto segment `s0-s1`.
///
/// Degenerate segments project to 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn closest_point_on_segment(p: IntPoint, s0: IntPoint, s1: IntPoint) -> f64 {
    let sx = (s1.x - s0.x) as f64;
    let sy = (s1.y - s0.y) as f64;
    let len2 = sx * sx + sy * sy;
    if len2 < 1.0 {
        return 0.0;
    }
    let dot = (p.x - s0.x) as f64 * sx + (p.y - s0.y) as f64 * sy;
    (dot / len2).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: i64) -> IntPath {
        vec![
            IntPoint::new(0, 0),
            IntPoint::new(size, 0),
            IntPoint::new(size, size),
            IntPoint::new(0, size),
        ]
    }

    #[test]
    fn round_trip_conversion() {
        let p = Point2::new(1.25, -3.5);
        let back = IntPoint::from_point(&p).to_point();
        assert!((back.x - 1.25).abs() < 1e-9);
        assert!((back.y + 3.5).abs() < 1e-9);
    }

    #[test]
    fn point_in_polygon_classification() {
        let sq = square(100);
        assert_eq!(point_in_polygon(IntPoint::new(50, 50), &sq), PointLocation::Inside);
        assert_eq!(point_in_polygon(IntPoint::new(150, 50), &sq), PointLocation::Outside);
        assert_eq!(point_in_polygon(IntPoint::new(100, 50), &sq), PointLocation::OnBoundary);
        assert_eq!(point_in_polygon(IntPoint::new(0, 0), &sq), PointLocation::OnBoundary);
    }

    #[test]
    fn point_in_polygon_winding_independent() {
        let mut sq = square(100);
        sq.reverse();
        assert_eq!(point_in_polygon(IntPoint::new(10, 90), &sq), PointLocation::Inside);
    }

    #[test]
    fn point_in_degenerate_polygon() {
        let line = vec![IntPoint::new(0, 0), IntPoint::new(10, 0)];
        assert_eq!(point_in_polygon(IntPoint::new(5, 0), &line), PointLocation::Outside);
    }

    #[test]
    fn crossing_segments() {
        let r = find_intersection(
            IntPoint::new(0, 0),
            IntPoint::new(10, 10),
            IntPoint::new(0, 10),
            IntPoint::new(10, 0),
            1e-9,
            0.01,
        );
        assert_eq!(r, FixedIntersection::Segments);
    }

    #[test]
    fn lines_cross_outside_segments() {
        let r = find_intersection(
            IntPoint::new(0, 0),
            IntPoint::new(10, 0),
            IntPoint::new(20, -5),
            IntPoint::new(20, 5),
            1e-9,
            0.01,
        );
        assert_eq!(r, FixedIntersection::Lines);
    }

    #[test]
    fn parallel_apart_and_coincident() {
        let s = 10_000_000;
        let apart = find_intersection(
            IntPoint::new(0, 0),
            IntPoint::new(10 * s, 0),
            IntPoint::new(0, s),
            IntPoint::new(10 * s, s),
            1e-9,
            0.01,
        );
        assert_eq!(apart, FixedIntersection::None);

        let touching = find_intersection(
            IntPoint::new(0, 0),
            IntPoint::new(10 * s, 0),
            IntPoint::new(10 * s, 10),
            IntPoint::new(20 * s, 10),
            1e-9,
            0.01,
        );
        assert_eq!(touching, FixedIntersection::Segments);
    }

    #[test]
    fn projection_parameter() {
        let t = closest_point_on_segment(IntPoint::new(5, 5), IntPoint::new(0, 0), IntPoint::new(10, 0));
        assert!((t - 0.5).abs() < 1e-12);
        let clamped =
            closest_point_on_segment(IntPoint::new(-5, 5), IntPoint::new(0, 0), IntPoint::new(10, 0));
        assert!(clamped.abs() < 1e-12);
        let degenerate =
            closest_point_on_segment(IntPoint::new(3, 3), IntPoint::new(1, 1), IntPoint::new(1, 1));
        assert!(degenerate.abs() < 1e-12);
    }

    #[test]
    fn lerp_rounds() {
        let p = IntPoint::new(0, 0).lerp(IntPoint::new(3, 7), 0.5);
        assert_eq!(p, IntPoint::new(2, 4));
    }
}
