//! Nearest-boundary confinement against a baked solution.

use crate::math::fixed_2d::{
    closest_point_on_segment, find_intersection, path_to_points, point_in_polygon, FixedIntersection,
    IntPath, IntPoint, PointLocation,
};
use crate::math::{Point2, Vector2};

use super::BakedConfiner;

/// The confiner outline at one frustum height, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfinerSolution {
    paths: Vec<IntPath>,
    frustum_height: f64,
}

impl ConfinerSolution {
    pub(crate) fn new(paths: Vec<IntPath>, frustum_height: f64) -> Self {
        Self {
            paths,
            frustum_height,
        }
    }

    #[must_use]
    pub fn frustum_height(&self) -> f64 {
        self.frustum_height
    }

    /// Fixed-point loops of the outline.
    #[must_use]
    pub fn int_paths(&self) -> &[IntPath] {
        &self.paths
    }

    /// Loops of the outline.
    #[must_use]
    pub fn paths(&self) -> Vec<Vec<Point2>> {
        self.paths.iter().map(|p| path_to_points(p)).collect()
    }

    /// Whether `p` lies inside or on the outline.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        contains(&self.paths, IntPoint::from_point(p))
    }
}

/// Even-odd containment over a set of loops; boundary points count as inside.
fn contains(paths: &[IntPath], p: IntPoint) -> bool {
    let mut inside = false;
    for path in paths {
        match point_in_polygon(p, path) {
            PointLocation::OnBoundary => return true,
            PointLocation::Inside => inside = !inside,
            PointLocation::Outside => {}
        }
    }
    inside
}

impl BakedConfiner {
    /// Displacement that moves `point` onto the nearest point of `solution`,
    /// or zero if it is already inside.
    ///
    /// Candidates far outside the shape's extent are penalized so visible
    /// boundary is preferred over merely close boundary. Once the solution
    /// has bones and `point` lies within the input shape, candidates whose
    /// connecting segment leaves the input shape are rejected, so the camera
    /// never snaps through a wall to a neighbouring section.
    #[must_use]
    pub fn confine_point(&self, solution: &ConfinerSolution, point: &Point2) -> Vector2 {
        let p = IntPoint::from_point(point);
        if contains(&solution.paths, p) {
            return Vector2::zeros();
        }

        let has_bones = self.min_frustum_height_with_bones < solution.frustum_height;
        let check_original = has_bones && contains(&self.original, p);

        let mut closest = *point;
        let mut min_distance = f64::MAX;
        for path in &solution.paths {
            let n = path.len();
            for j in 0..n {
                let l1 = path[j];
                let l2 = path[(j + 1) % n];
                let c = l1.lerp(l2, closest_point_on_segment(p, l1, l2));
                let c_world = c.to_point();
                let diff = point - c_world;
                let mut distance = diff.norm_squared();
                if diff.x.abs() > self.bounds.width() || diff.y.abs() > self.bounds.height() {
                    distance += self.sqr_polygon_diagonal;
                }
                if distance < min_distance && !(check_original && self.crosses_original(p, c)) {
                    min_distance = distance;
                    closest = c_world;
                }
            }
        }
        closest - point
    }

    fn crosses_original(&self, from: IntPoint, to: IntPoint) -> bool {
        let eps = self.tolerances.parallel_epsilon;
        let coincident = self.tolerances.coincident_distance;
        self.original.iter().any(|path| {
            let n = path.len();
            (0..n).any(|i| {
                find_intersection(from, to, path[i], path[(i + 1) % n], eps, coincident)
                    == FixedIntersection::Segments
            })
        })
    }
}
