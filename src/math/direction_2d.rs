//! Anisotropic shrink directions.
//!
//! A camera window is an `aspect × 1` rectangle (half extents). When a polygon
//! corner erodes by one unit of frustum height, the window centre moves along
//! a vector bounded by that rectangle rather than by a unit circle. The vector
//! depends on which part of the window touches the corner: a window corner
//! alone, one of its sides, or its diagonal.

use super::angle_2d::{angle_deg, signed_angle_deg};
use super::{Point2, Vector2};

/// Compass offsets of the window, clockwise from straight up.
const UP: usize = 0;
const RIGHT: usize = 2;
const DOWN: usize = 4;
const LEFT: usize = 6;

/// Tolerance on the angle sum of the side-touching triangle, in degrees.
const ANGLE_SUM_SLACK: f64 = 0.5;

/// One 90° sector of normal directions.
///
/// The window pieces are given as compass indices: a side is the pair of
/// window corners bounding it plus the offset from its midpoint back to the
/// window centre.
struct Sector {
    /// Open range `(lower, lower + 90)` of the signed angle from the normal to
    /// straight up.
    lower: f64,
    corner: usize,
    near_side: (usize, usize, usize),
    far_side: (usize, usize, usize),
    diagonal: (usize, usize),
}

const SECTORS: [Sector; 4] = [
    // normal points up-right
    Sector {
        lower: 0.0,
        corner: 1,
        near_side: (3, 5, UP),
        far_side: (7, 5, RIGHT),
        diagonal: (3, 7),
    },
    // normal points down-right
    Sector {
        lower: 90.0,
        corner: 3,
        near_side: (UP, DOWN, RIGHT),
        far_side: (1, 7, DOWN),
        diagonal: (1, 5),
    },
    // normal points down-left
    Sector {
        lower: -180.0,
        corner: 5,
        near_side: (7, 1, DOWN),
        far_side: (1, 3, LEFT),
        diagonal: (3, 7),
    },
    // normal points up-left
    Sector {
        lower: -90.0,
        corner: 7,
        near_side: (7, 5, LEFT),
        far_side: (5, 3, UP),
        diagonal: (1, 5),
    },
];

fn sector_of(angle: f64) -> Option<&'static Sector> {
    SECTORS
        .iter()
        .find(|s| s.lower < angle && angle < s.lower + 90.0)
}

/// The camera window used to turn edge normals into shrink directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectWindow {
    aspect: f64,
    diagonal: f64,
    compass: [Vector2; 8],
    narrow_angle: f64,
    corner_slack: f64,
}

impl AspectWindow {
    /// Creates the window for `aspect` (width over height).
    ///
    /// `narrow_angle` (degrees) is the angle below which a triangle is too thin
    /// to solve and the chord midpoint is used instead; `corner_slack`
    /// (degrees) widens the single-corner contact case.
    #[must_use]
    pub fn new(aspect: f64, narrow_angle: f64, corner_slack: f64) -> Self {
        Self {
            aspect,
            diagonal: (aspect * aspect + 1.0).sqrt(),
            compass: [
                Vector2::new(0.0, 1.0),
                Vector2::new(aspect, 1.0),
                Vector2::new(aspect, 0.0),
                Vector2::new(aspect, -1.0),
                Vector2::new(0.0, -1.0),
                Vector2::new(-aspect, -1.0),
                Vector2::new(-aspect, 0.0),
                Vector2::new(-aspect, 1.0),
            ],
            narrow_angle,
            corner_slack,
        }
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Scales `v` down so it fits the `aspect × 1` rectangle, preserving its
    /// direction. Vectors already inside are returned unchanged.
    #[must_use]
    pub fn fit(&self, v: Vector2) -> Vector2 {
        let mut v = v;
        if v.x > self.aspect {
            v *= self.aspect / v.x;
        } else if v.x < -self.aspect {
            v *= -self.aspect / v.x;
        }
        if v.y > 1.0 {
            v *= 1.0 / v.y;
        } else if v.y < -1.0 {
            v *= -1.0 / v.y;
        }
        v
    }

    /// Scales `v` so that it reaches the rectangle boundary along its own
    /// direction (x to ±aspect, then y clamped to ±1).
    #[must_use]
    pub fn stretch_to_boundary(&self, v: Vector2) -> Vector2 {
        let mut v = v;
        if v.x.abs() > 0.0 {
            v *= self.aspect / v.x.abs();
        }
        if v.y.abs() > 1.0 {
            v *= 1.0 / v.y.abs();
        }
        v
    }

    /// Clamps each component into the rectangle independently.
    #[must_use]
    pub fn clamp(&self, v: Vector2) -> Vector2 {
        Vector2::new(v.x.clamp(-self.aspect, self.aspect), v.y.clamp(-1.0, 1.0))
    }

    /// Shrink direction of the corner `this` with neighbours `prev` and `next`
    /// and inward unit `normal`.
    ///
    /// The result is the displacement of the window centre per unit of frustum
    /// height when the window is pushed into the corner along `normal`.
    #[must_use]
    pub fn shrink_direction(
        &self,
        normal: Vector2,
        prev: &Point2,
        this: &Point2,
        next: &Point2,
    ) -> Vector2 {
        let ca = prev - this;
        let cb = next - this;
        let angle1 = angle_deg(ca, normal);
        let angle2 = angle_deg(cb, normal);

        let r = normal * self.diagonal;
        let angle = signed_angle_deg(r, self.compass[UP]);

        let Some(sector) = sector_of(angle) else {
            // axis-aligned normal
            return self.clamp(r);
        };

        let lo = sector.lower;
        let a = angle - angle1;
        let b = angle + angle2;
        if a <= lo + self.corner_slack && b >= lo + 90.0 - self.corner_slack {
            self.compass[sector.corner]
        } else if a <= lo && b < lo + 90.0 {
            self.side_direction(prev, next, this, sector.near_side)
        } else if a > lo && b >= lo + 90.0 {
            self.side_direction(prev, next, this, sector.far_side)
        } else if a > lo && b < lo + 90.0 {
            let (d1, d2) = sector.diagonal;
            let mid = self.find_mid_point(prev, next, this, d1, d2);
            mid - this
        } else {
            debug_assert!(false, "shrink direction case analysis fell through (angle {angle})");
            tracing::warn!(angle, a, b, "unclassified corner, clamping shrink direction");
            self.clamp(r)
        }
    }

    fn side_direction(
        &self,
        prev: &Point2,
        next: &Point2,
        this: &Point2,
        (d1, d2, to_centre): (usize, usize, usize),
    ) -> Vector2 {
        let side_mid = self.find_mid_point(prev, next, this, d1, d2);
        (side_mid + self.compass[to_centre]) - this
    }

    /// Midpoint of the window piece `d1-d2` when it touches both `c-a` and
    /// `c-b`.
    ///
    /// Falls back to the midpoint of `a-b` for triangles too thin to solve, or
    /// when that midpoint is closer to `c`.
    fn find_mid_point(&self, a: &Point2, b: &Point2, c: &Point2, d1: usize, d2: usize) -> Point2 {
        let chord_mid = Point2::from((a.coords + b.coords) * 0.5);
        let ca = a - c;
        let cb = b - c;

        let gamma = angle_deg(ca, cb);
        if self.is_narrow(gamma) {
            return chord_mid;
        }

        let (d1, d2) = (self.compass[d1], self.compass[d2]);
        let d1c = c - b;
        let d2c = c - a;
        let mut d1d2 = d1 - d2;
        let mut beta = angle_deg(d1c, d1d2);
        let mut alpha = angle_deg(d2c, d2 - d1);
        if (gamma + beta + alpha - 180.0).abs() > ANGLE_SUM_SLACK {
            d1d2 = d2 - d1;
            beta = angle_deg(d1c, d1d2);
            alpha = angle_deg(d2c, d1 - d2);
        }
        if self.is_narrow(alpha) || self.is_narrow(beta) {
            return chord_mid;
        }

        let side = d1d2.norm();
        let scale = side / gamma.to_radians().sin();
        let len_a = (scale * alpha.to_radians().sin()).abs();
        let len_b = (scale * beta.to_radians().sin()).abs();

        let m1 = c + cb.normalize() * len_a;
        let m2 = c + ca.normalize() * len_b;
        let touch_mid = Point2::from((m1.coords + m2.coords) * 0.5);

        if (chord_mid - c).norm_squared() < (touch_mid - c).norm_squared() {
            chord_mid
        } else {
            touch_mid
        }
    }

    fn is_narrow(&self, angle: f64) -> bool {
        angle <= self.narrow_angle || 180.0 - self.narrow_angle <= angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angle_2d::normalize_or_zero;

    const EPS: f64 = 1e-9;

    fn window(aspect: f64) -> AspectWindow {
        AspectWindow::new(aspect, 0.05, 1.0)
    }

    fn corner_direction(w: &AspectWindow, prev: Point2, this: Point2, next: Point2) -> Vector2 {
        let e1 = normalize_or_zero(this - prev);
        let e2 = normalize_or_zero(next - this);
        // counter-clockwise polygon: inward normals are left normals
        let n1 = Vector2::new(-e1.y, e1.x);
        let n2 = Vector2::new(-e2.y, e2.x);
        w.shrink_direction(normalize_or_zero(n1 + n2), &prev, &this, &next)
    }

    #[test]
    fn square_corners_take_window_corners() {
        let w = window(1.0);
        let d = corner_direction(
            &w,
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        );
        assert!((d.x - 1.0).abs() < EPS && (d.y - 1.0).abs() < EPS);

        let d = corner_direction(
            &w,
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        );
        assert!((d.x + 1.0).abs() < EPS && (d.y - 1.0).abs() < EPS);

        let d = corner_direction(
            &w,
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        );
        assert!((d.x + 1.0).abs() < EPS && (d.y + 1.0).abs() < EPS);

        let d = corner_direction(
            &w,
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        );
        assert!((d.x - 1.0).abs() < EPS && (d.y + 1.0).abs() < EPS);
    }

    #[test]
    fn wide_window_corner() {
        let w = window(2.0);
        let d = corner_direction(
            &w,
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        );
        assert!((d.x - 2.0).abs() < EPS && (d.y - 1.0).abs() < EPS);
    }

    #[test]
    fn axis_aligned_normal_is_clamped() {
        let w = window(1.5);
        let d = w.shrink_direction(
            Vector2::new(0.0, 1.0),
            &Point2::new(-1.0, 0.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
        );
        assert!(d.x.abs() < EPS && (d.y - 1.0).abs() < EPS);

        let d = w.shrink_direction(
            Vector2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(0.0, -1.0),
        );
        assert!((d.x - 1.5).abs() < EPS && d.y.abs() < EPS);
    }

    #[test]
    fn sharp_corner_stays_inside_window() {
        let w = window(1.0);
        // narrow wedge opening upwards: the window's bottom side wedges in
        // well above the tip
        let d = corner_direction(
            &w,
            Point2::new(-1.0, 10.0),
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 10.0),
        );
        assert!(d.y > 1.0);
        assert!(d.x > 0.0 && d.x < 1.0);
    }

    #[test]
    fn fit_preserves_direction() {
        let w = window(2.0);
        let v = w.fit(Vector2::new(4.0, 1.0));
        assert!((v.x - 2.0).abs() < EPS && (v.y - 0.5).abs() < EPS);
        let inside = w.fit(Vector2::new(0.5, 0.5));
        assert!((inside.x - 0.5).abs() < EPS && (inside.y - 0.5).abs() < EPS);
    }

    #[test]
    fn stretch_reaches_boundary() {
        let w = window(2.0);
        let v = w.stretch_to_boundary(Vector2::new(0.1, 0.01));
        assert!((v.x - 2.0).abs() < EPS && (v.y - 0.2).abs() < EPS);
    }

    #[test]
    fn sectors_cover_open_quadrants() {
        for angle in [10.0, 100.0, -170.0, -10.0] {
            assert!(sector_of(angle).is_some());
        }
        for angle in [0.0, 90.0, 180.0, -90.0] {
            assert!(sector_of(angle).is_none());
        }
    }
}
