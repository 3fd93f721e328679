use super::{Vector2, EPSILON};

/// Returns `v` scaled to unit length, or the zero vector if `v` is too short
/// to have a direction.
#[must_use]
pub fn normalize_or_zero(v: Vector2) -> Vector2 {
    let len = v.norm();
    if len < EPSILON {
        Vector2::zeros()
    } else {
        v / len
    }
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns 0 if either vector has no direction.
#[must_use]
pub fn angle_deg(from: Vector2, to: Vector2) -> f64 {
    let denom = (from.norm_squared() * to.norm_squared()).sqrt();
    if denom < EPSILON * EPSILON {
        return 0.0;
    }
    let cos = (from.dot(&to) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Signed angle from `from` to `to` in degrees, in `[-180, 180]`.
///
/// Positive when `to` lies counter-clockwise of `from`.
#[must_use]
pub fn signed_angle_deg(from: Vector2, to: Vector2) -> f64 {
    let angle = angle_deg(from, to);
    if cross(from, to) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// 2D cross product (z component of the 3D cross product).
#[must_use]
pub fn cross(a: Vector2, b: Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
