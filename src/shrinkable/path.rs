use crate::clip::{orient_positive, PathClipper};
use crate::math::angle_2d::normalize_or_zero;
use crate::math::fixed_2d::{path_from_points, path_to_points, IntPath};
use crate::math::{Point2, Vector2};

use super::ShrinkablePolygon;

/// Plain loops produced by [`convert_to_path`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathConversion {
    pub paths: Vec<Vec<Point2>>,
    /// Whether any polygon carried cut points that had to be bridged.
    pub has_intersections: bool,
}

/// Merges shrinkable polygons into plain loops.
///
/// Alongside each polygon's own loop, the union includes thin bridges from
/// every cut point to the nearest vertex, so pieces divided from one another
/// stay connected, and from every input corner towards the point where a
/// window of `frustum_height` would touch it. `extra` loops (the skeleton)
/// are merged in after hole polygons have been subtracted.
#[must_use]
pub fn convert_to_path(
    polygons: &[ShrinkablePolygon],
    frustum_height: f64,
    extra: &[IntPath],
    clipper: &PathClipper,
) -> PathConversion {
    let mut has_intersections = false;
    let mut solids = Vec::new();
    let mut holes = Vec::new();

    for polygon in polygons {
        let half_width = polygon.tolerances.bridge_half_width;
        let target = if polygon.is_hole() { &mut holes } else { &mut solids };
        target.push(path_from_points(&polygon.positions()));

        for cut in &polygon.intersection_points {
            has_intersections = true;
            let closest = polygon.closest_vertex(cut);
            if let Some(quad) = bridge(&closest, cut, closest - cut, half_width) {
                target.push(quad);
            }
        }

        if polygon.is_hole() {
            continue;
        }
        for point in &polygon.points {
            let Some(corner) = point.original_position else {
                continue;
            };
            let offset = point.position - corner;
            let reach = polygon.window.stretch_to_boundary(offset) * frustum_height;
            if reach.norm_squared() > offset.norm_squared() {
                // the window already touches this corner
                continue;
            }
            if let Some(quad) = bridge(&point.position, &(corner + reach), reach, half_width) {
                solids.push(quad);
            }
        }
    }

    orient_positive(&mut solids);
    if !holes.is_empty() {
        orient_positive(&mut holes);
        solids = clipper.difference(&solids, &holes);
    }
    let merged = clipper.union(&solids, extra);

    PathConversion {
        paths: merged.iter().map(|p| path_to_points(p)).collect(),
        has_intersections,
    }
}

/// A quad of half-width `half_width` from `from` to `to`, widened across
/// `along`.
fn bridge(from: &Point2, to: &Point2, along: Vector2, half_width: f64) -> Option<IntPath> {
    let normal = normalize_or_zero(Vector2::new(along.y, -along.x)) * half_width;
    if normal == Vector2::zeros() || (to - from).norm_squared() == 0.0 {
        return None;
    }
    Some(path_from_points(&[from + normal, to + normal, to - normal, from - normal]))
}
