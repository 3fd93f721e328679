use super::angle_2d::cross;
use super::{Point2, TOLERANCE};

/// Result of intersecting two 2D segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// Parallel (or degenerate) without overlap.
    None,
    /// The supporting lines cross outside at least one of the segments.
    Lines(Point2),
    /// The segments cross strictly inside both of them.
    Segments(Point2),
    /// The segments meet at an endpoint of one of them.
    Touching(Point2),
    /// Collinear segments that overlap; the point is the middle of the overlap.
    Overlapping(Point2),
}

impl SegmentIntersection {
    /// Returns the intersection point, if the segments share one.
    #[must_use]
    pub fn point(&self) -> Option<Point2> {
        match *self {
            SegmentIntersection::Segments(p)
            | SegmentIntersection::Touching(p)
            | SegmentIntersection::Overlapping(p) => Some(p),
            SegmentIntersection::None | SegmentIntersection::Lines(_) => None,
        }
    }
}

/// Intersects segment `p1-p2` with segment `q1-q2`.
///
/// `parallel_epsilon` bounds the cross product of the unit directions below
/// which the segments are treated as parallel.
#[must_use]
pub fn find_intersection(
    p1: &Point2,
    p2: &Point2,
    q1: &Point2,
    q2: &Point2,
    parallel_epsilon: f64,
) -> SegmentIntersection {
    let r = p2 - p1;
    let s = q2 - q1;
    let qp = q1 - p1;

    let rs = cross(r, s);
    let lengths = r.norm() * s.norm();
    if lengths < TOLERANCE {
        return SegmentIntersection::None;
    }

    if rs.abs() <= parallel_epsilon * lengths {
        if cross(qp, r).abs() > parallel_epsilon * r.norm() * qp.norm().max(1.0) {
            return SegmentIntersection::None;
        }
        // Collinear: project q onto r.
        let rr = r.norm_squared();
        let mut t0 = qp.dot(&r) / rr;
        let mut t1 = t0 + s.dot(&r) / rr;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > 1.0 || t1 < 0.0 {
            return SegmentIntersection::None;
        }
        let mid = 0.5 * (t0.max(0.0) + t1.min(1.0));
        return SegmentIntersection::Overlapping(p1 + r * mid);
    }

    let t = cross(qp, s) / rs;
    let u = cross(qp, r) / rs;
    let point = p1 + r * t;

    let eps = TOLERANCE;
    if t < -eps || t > 1.0 + eps || u < -eps || u > 1.0 + eps {
        return SegmentIntersection::Lines(point);
    }
    let t_at_end = t < eps || t > 1.0 - eps;
    let u_at_end = u < eps || u > 1.0 - eps;
    if t_at_end || u_at_end {
        SegmentIntersection::Touching(point)
    } else {
        SegmentIntersection::Segments(point)
    }
}
