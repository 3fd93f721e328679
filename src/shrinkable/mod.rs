//! Erodible polygons that track their own topology.
//!
//! A [`ShrinkablePolygon`] is a single closed contour whose points each carry
//! a shrink direction: the displacement of a camera window's centre per unit
//! of frustum height when the window is pushed into that point. Eroding moves
//! every point along its direction; self-intersections that appear are
//! repaired by dividing the contour into pieces.

mod divide;
mod path;
mod shrink;

pub use path::{convert_to_path, PathConversion};

use crate::config::Tolerances;
use crate::error::{BakeError, GeometryError, Result};
use crate::math::angle_2d::{angle_deg, normalize_or_zero, signed_angle_deg};
use crate::math::direction_2d::AspectWindow;
use crate::math::intersect_2d::{find_intersection, SegmentIntersection};
use crate::math::polygon_2d::{signed_area_2d, vertex_centroid};
use crate::math::{Point2, Vector2, EPSILON};

/// A point of a [`ShrinkablePolygon`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkablePoint {
    pub position: Point2,
    /// Input corner this point started from. `None` for points created by
    /// reflex-corner fixing or by cutting.
    pub original_position: Option<Point2>,
    pub shrink_direction: Vector2,
    /// Marks the synthetic points bracketing a reflex corner.
    pub cant_intersect: bool,
}

impl ShrinkablePoint {
    fn original(position: Point2) -> Self {
        Self {
            position,
            original_position: Some(position),
            shrink_direction: Vector2::zeros(),
            cant_intersect: false,
        }
    }

    fn cut(position: Point2) -> Self {
        Self {
            position,
            original_position: None,
            shrink_direction: Vector2::zeros(),
            cant_intersect: false,
        }
    }
}

/// Fingerprint of a polygon's shrink configuration.
///
/// Advances whenever points are added or removed or a shrink direction
/// changes. Two polygons with the same id can be interpolated
/// vertex-for-vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StateId(u32);

impl StateId {
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    fn bump(&mut self) {
        *self = self.next();
    }
}

/// A closed contour of points with shrink directions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkablePolygon {
    points: Vec<ShrinkablePoint>,
    window: AspectWindow,
    tolerances: Tolerances,
    frustum_height: f64,
    state: StateId,
    min_area: f64,
    intersection_points: Vec<Point2>,
    clockwise: bool,
    hole: bool,
}

/// Checks that `points` form a usable contour and returns its signed area.
///
/// # Errors
///
/// Returns an error if the contour has fewer than 3 points, a non-finite
/// coordinate, or no determinable winding.
pub fn validate_contour(index: usize, points: &[Point2]) -> Result<f64> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewPoints {
            index,
            count: points.len(),
        }
        .into());
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(
            GeometryError::Degenerate(format!("contour {index} has a non-finite coordinate")).into(),
        );
    }
    let area = signed_area_2d(points);
    if !area.is_finite() || area.abs() < EPSILON {
        return Err(GeometryError::UndeterminedWinding { index, area }.into());
    }
    Ok(area)
}

/// Checks that `aspect_ratio` is finite and positive.
///
/// # Errors
///
/// Returns [`BakeError::InvalidAspectRatio`] otherwise.
pub fn validate_aspect_ratio(aspect_ratio: f64) -> Result<()> {
    if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        Ok(())
    } else {
        Err(BakeError::InvalidAspectRatio(aspect_ratio).into())
    }
}

impl ShrinkablePolygon {
    /// Builds a polygon from a contour enclosing solid area.
    ///
    /// Shrink directions point into the contour. Reflex corners are split
    /// into three points so the window can approach them from either edge.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid aspect ratio, fewer than 3 points, or
    /// a contour with no determinable winding.
    pub fn new(points: &[Point2], aspect_ratio: f64, tolerances: &Tolerances) -> Result<Self> {
        Self::build(points, aspect_ratio, tolerances, false)
    }

    /// Builds a polygon from a contour enclosing a hole. Shrink directions
    /// point out of the contour, into the surrounding solid, so eroding grows
    /// the hole.
    ///
    /// # Errors
    ///
    /// Same as [`ShrinkablePolygon::new`].
    pub fn new_hole(points: &[Point2], aspect_ratio: f64, tolerances: &Tolerances) -> Result<Self> {
        Self::build(points, aspect_ratio, tolerances, true)
    }

    fn build(points: &[Point2], aspect_ratio: f64, tolerances: &Tolerances, hole: bool) -> Result<Self> {
        validate_aspect_ratio(aspect_ratio)?;
        let area = validate_contour(0, points)?;
        let mut polygon = Self {
            points: points.iter().copied().map(ShrinkablePoint::original).collect(),
            window: AspectWindow::new(aspect_ratio, tolerances.narrow_angle, tolerances.corner_slack),
            tolerances: *tolerances,
            frustum_height: 0.0,
            state: StateId::default(),
            min_area: 0.0,
            intersection_points: Vec::new(),
            clockwise: area < 0.0,
            hole,
        };
        polygon.compute_normals(true);
        polygon.assign_aspect_directions();
        Ok(polygon)
    }

    /// Builds a polygon from a loop whose shrink directions are already
    /// known. Clockwise loops are holes. No corner is split and no point
    /// remembers an input corner.
    pub(crate) fn from_loop(
        positions: &[Point2],
        directions: &[Vector2],
        aspect_ratio: f64,
        tolerances: &Tolerances,
        state: StateId,
    ) -> Self {
        let clockwise = signed_area_2d(positions) < 0.0;
        Self {
            points: positions
                .iter()
                .enumerate()
                .map(|(i, &position)| ShrinkablePoint {
                    shrink_direction: directions.get(i).copied().unwrap_or_else(Vector2::zeros),
                    ..ShrinkablePoint::cut(position)
                })
                .collect(),
            window: AspectWindow::new(aspect_ratio, tolerances.narrow_angle, tolerances.corner_slack),
            tolerances: *tolerances,
            frustum_height: 0.0,
            state,
            min_area: 0.0,
            intersection_points: Vec::new(),
            clockwise,
            hole: clockwise,
        }
    }

    /// Sets the accumulated erosion.
    #[must_use]
    pub(crate) fn at_frustum_height(mut self, frustum_height: f64) -> Self {
        self.frustum_height = frustum_height;
        self
    }

    /// A copy with every point moved by `t` of the way towards the matching
    /// point of `other`. Both polygons must have the same point count.
    #[must_use]
    pub(crate) fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut result = self.clone();
        for (point, target) in result.points.iter_mut().zip(&other.points) {
            point.position += (target.position - point.position) * t;
        }
        result.frustum_height += (other.frustum_height - self.frustum_height) * t;
        result
    }

    /// A copy moved along its shrink directions by `amount`, without any of
    /// the bookkeeping of [`shrink`](Self::shrink).
    #[must_use]
    pub(crate) fn advanced(&self, amount: f64) -> Self {
        let mut result = self.clone();
        for point in &mut result.points {
            point.position += point.shrink_direction * amount;
        }
        result.frustum_height += amount;
        result
    }

    /// Sets the area below which [`shrink`](Self::shrink) treats the polygon
    /// as collapsed.
    #[must_use]
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    fn empty_like(&self) -> Self {
        Self {
            points: Vec::new(),
            window: self.window,
            tolerances: self.tolerances,
            frustum_height: self.frustum_height,
            state: self.state,
            min_area: self.min_area,
            intersection_points: Vec::new(),
            clockwise: self.clockwise,
            hole: self.hole,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[ShrinkablePoint] {
        &self.points
    }

    /// Point positions in order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point2> {
        self.points.iter().map(|p| p.position).collect()
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.window.aspect()
    }

    /// Accumulated erosion.
    #[must_use]
    pub fn frustum_height(&self) -> f64 {
        self.frustum_height
    }

    #[must_use]
    pub fn state(&self) -> StateId {
        self.state
    }

    #[must_use]
    pub fn min_area(&self) -> f64 {
        self.min_area
    }

    /// Points where this polygon was cut off a parent.
    #[must_use]
    pub fn intersection_points(&self) -> &[Point2] {
        &self.intersection_points
    }

    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    #[must_use]
    pub fn is_hole(&self) -> bool {
        self.hole
    }

    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.positions())
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Average of the point positions.
    #[must_use]
    pub fn centroid(&self) -> Point2 {
        vertex_centroid(&self.positions())
    }

    /// Whether any point still has a non-zero shrink direction.
    #[must_use]
    pub fn is_shrinkable(&self) -> bool {
        self.points
            .iter()
            .any(|p| p.shrink_direction != Vector2::zeros())
    }

    /// Whether the winding flipped relative to the input contour.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        let area = self.signed_area();
        area.abs() > EPSILON && (area < 0.0) != self.clockwise
    }

    /// Whether two non-adjacent edges cross.
    #[must_use]
    pub fn has_intersections(&self) -> bool {
        self.first_crossing().is_some()
    }

    /// Squared distance from `p` to the nearest point of the polygon.
    #[must_use]
    pub fn sqr_distance_to(&self, p: &Point2) -> f64 {
        self.points
            .iter()
            .map(|q| (q.position - p).norm_squared())
            .fold(f64::MAX, f64::min)
    }

    /// The polygon point nearest to `p`.
    #[must_use]
    pub fn closest_vertex(&self, p: &Point2) -> Point2 {
        let mut best = *p;
        let mut best_dist = f64::MAX;
        for q in &self.points {
            let d = (q.position - p).norm_squared();
            if d < best_dist {
                best_dist = d;
                best = q.position;
            }
        }
        best
    }

    /// The polygon point nearest to `p`, preferring points that lie along
    /// `p`'s shrink direction axis.
    #[must_use]
    pub fn closest_polygon_point(&self, p: &ShrinkablePoint) -> Point2 {
        let limit = self.tolerances.alignment_angle;
        let mut best = None;
        let mut best_dist = f64::MAX;
        for q in &self.points {
            let diff = q.position - p.position;
            let angle = angle_deg(p.shrink_direction, diff);
            if angle < limit || 180.0 - limit < angle {
                let d = diff.norm_squared();
                if d < best_dist {
                    best_dist = d;
                    best = Some(q.position);
                }
            }
        }
        best.unwrap_or_else(|| self.closest_vertex(&p.position))
    }

    /// Recomputes shrink directions from the current geometry. Advances the
    /// state if the point count or any direction changed.
    pub fn compute_aspect_based_shrink_directions(&mut self) {
        if self.assign_aspect_directions() {
            self.state.bump();
        }
    }

    fn assign_aspect_directions(&mut self) -> bool {
        let previous: Vec<Vector2> = self.points.iter().map(|p| p.shrink_direction).collect();
        self.compute_normals(false);
        let n = self.points.len();
        let clockwise = self.solid_clockwise();
        let directions: Vec<Vector2> = (0..n)
            .map(|i| {
                let mut prev = self.points[(i + n - 1) % n].position;
                let mut next = self.points[(i + 1) % n].position;
                // the window table expects the solid on the left of prev -> next
                if clockwise {
                    std::mem::swap(&mut prev, &mut next);
                }
                let this = self.points[i];
                self.window
                    .shrink_direction(this.shrink_direction, &prev, &this.position, &next)
            })
            .collect();
        for (point, direction) in self.points.iter_mut().zip(directions) {
            point.shrink_direction = direction;
        }
        self.directions_differ(&previous)
    }

    fn directions_differ(&self, previous: &[Vector2]) -> bool {
        let eps = self.tolerances.direction_epsilon;
        previous.len() != self.points.len()
            || previous.iter().zip(&self.points).any(|(old, p)| {
                (old.x - p.shrink_direction.x).abs() > eps
                    || (old.y - p.shrink_direction.y).abs() > eps
            })
    }

    /// Winding of the side the polygon erodes into.
    fn solid_clockwise(&self) -> bool {
        self.clockwise != self.hole
    }

    /// Sets every shrink direction to the normalized average of the adjacent
    /// inward edge normals. With `fix_reflex_corners`, each reflex corner is
    /// bracketed by two synthetic points.
    fn compute_normals(&mut self, fix_reflex_corners: bool) {
        let n = self.points.len();
        let clockwise = self.solid_clockwise();
        let edge_normals: Vec<Vector2> = (0..n)
            .map(|i| {
                let edge = self.points[(i + 1) % n].position - self.points[i].position;
                let normal = if clockwise {
                    Vector2::new(edge.y, -edge.x)
                } else {
                    Vector2::new(-edge.y, edge.x)
                };
                normalize_or_zero(normal)
            })
            .collect();

        for i in 0..n {
            let prev_edge = (i + n - 1) % n;
            self.points[i].shrink_direction = normalize_or_zero(edge_normals[i] + edge_normals[prev_edge]);
        }

        if !fix_reflex_corners {
            return;
        }

        let threshold = self.tolerances.reflex_corner_angle;
        let fraction = self.tolerances.corner_split_fraction;
        let mut extended = Vec::with_capacity(n * 3);
        for i in 0..n {
            let prev_edge = (i + n - 1) % n;
            let angle = signed_angle_deg(edge_normals[i], edge_normals[prev_edge]);
            let reflex = if clockwise {
                angle < -threshold
            } else {
                angle > threshold
            };
            let point = self.points[i];
            if !reflex {
                extended.push(point);
                continue;
            }
            let prev = self.points[(i + n - 1) % n].position;
            let next = self.points[(i + 1) % n].position;
            let bracket = |towards: Point2| ShrinkablePoint {
                position: point.position + (towards - point.position) * fraction,
                original_position: None,
                shrink_direction: point.shrink_direction,
                cant_intersect: true,
            };
            extended.push(bracket(prev));
            extended.push(ShrinkablePoint {
                original_position: None,
                ..point
            });
            extended.push(bracket(next));
        }
        self.points = extended;
    }

    /// Indices `(i, j)` of the first pair of non-adjacent edges that cross,
    /// with the crossing point.
    fn first_crossing(&self) -> Option<(usize, usize, Point2)> {
        let n = self.points.len();
        let eps = self.tolerances.parallel_epsilon;
        for i in 0..n {
            let next_i = (i + 1) % n;
            for j in i + 2..n {
                let next_j = (j + 1) % n;
                if i == next_j {
                    continue;
                }
                if let SegmentIntersection::Segments(p) = find_intersection(
                    &self.points[i].position,
                    &self.points[next_i].position,
                    &self.points[j].position,
                    &self.points[next_j].position,
                    eps,
                ) {
                    return Some((i, j, p));
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ConfinerError;
    use approx::assert_relative_eq;

    pub(crate) fn square(min: f64, max: f64) -> Vec<Point2> {
        vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    /// Counter-clockwise L shape with one reflex corner at (2, 2).
    pub(crate) fn l_shape() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn square_directions_point_to_window_corners() {
        let polygon = ShrinkablePolygon::new(&square(0.0, 10.0), 1.0, &Tolerances::default()).unwrap();
        assert_eq!(polygon.points().len(), 4);
        let expected = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];
        for (p, (x, y)) in polygon.points().iter().zip(expected) {
            assert_relative_eq!(p.shrink_direction.x, x, epsilon = 1e-9);
            assert_relative_eq!(p.shrink_direction.y, y, epsilon = 1e-9);
            assert_eq!(p.original_position, Some(p.position));
        }
        assert!(!polygon.is_clockwise());
        assert!(polygon.is_shrinkable());
    }

    #[test]
    fn clockwise_input_gets_inward_directions() {
        let mut points = square(0.0, 10.0);
        points.reverse();
        let polygon = ShrinkablePolygon::new(&points, 1.0, &Tolerances::default()).unwrap();
        assert!(polygon.is_clockwise());
        let centre = Point2::new(5.0, 5.0);
        for p in polygon.points() {
            assert!(p.shrink_direction.dot(&(centre - p.position)) > 0.0);
        }
    }

    #[test]
    fn hole_directions_point_outwards() {
        let polygon = ShrinkablePolygon::new_hole(&square(0.0, 10.0), 1.0, &Tolerances::default()).unwrap();
        let centre = Point2::new(5.0, 5.0);
        for p in polygon.points() {
            assert!(p.shrink_direction.dot(&(centre - p.position)) < 0.0);
        }
    }

    #[test]
    fn reflex_corner_becomes_three_points() {
        let polygon = ShrinkablePolygon::new(&l_shape(), 1.0, &Tolerances::default()).unwrap();
        assert_eq!(polygon.points().len(), 8);
        let synthetic: Vec<_> = polygon.points().iter().filter(|p| p.cant_intersect).collect();
        assert_eq!(synthetic.len(), 2);
        let corner = polygon
            .points()
            .iter()
            .find(|p| (p.position - Point2::new(2.0, 2.0)).norm() < 1e-12)
            .unwrap();
        assert!(corner.original_position.is_none());
        assert!(synthetic.iter().all(|p| p.original_position.is_none()));
        assert_relative_eq!(synthetic[0].position.x, 2.02, epsilon = 1e-12);
    }

    #[test]
    fn rejects_degenerate_input() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(matches!(
            ShrinkablePolygon::new(&line, 1.0, &Tolerances::default()),
            Err(ConfinerError::Geometry(GeometryError::UndeterminedWinding { .. }))
        ));
        assert!(matches!(
            ShrinkablePolygon::new(&line[..2], 1.0, &Tolerances::default()),
            Err(ConfinerError::Geometry(GeometryError::TooFewPoints { count: 2, .. }))
        ));
        assert!(matches!(
            ShrinkablePolygon::new(&square(0.0, 1.0), 0.0, &Tolerances::default()),
            Err(ConfinerError::Bake(BakeError::InvalidAspectRatio(_)))
        ));
        let mut broken = square(0.0, 1.0);
        broken[2].x = f64::NAN;
        assert!(matches!(
            ShrinkablePolygon::new(&broken, 1.0, &Tolerances::default()),
            Err(ConfinerError::Geometry(GeometryError::Degenerate(_)))
        ));
    }

    #[test]
    fn recomputing_unchanged_directions_keeps_state() {
        let mut polygon = ShrinkablePolygon::new(&square(0.0, 10.0), 2.0, &Tolerances::default()).unwrap();
        let before = polygon.state();
        polygon.compute_aspect_based_shrink_directions();
        assert_eq!(polygon.state(), before);
    }

    #[test]
    fn closest_point_prefers_shrink_axis() {
        let polygon = ShrinkablePolygon::new(&square(0.0, 10.0), 1.0, &Tolerances::default()).unwrap();
        let corner_point = ShrinkablePoint {
            position: Point2::new(-1.0, -1.0),
            original_position: None,
            shrink_direction: Vector2::new(1.0, 1.0),
            cant_intersect: false,
        };
        let p = polygon.closest_polygon_point(&corner_point);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);

        let sideways = ShrinkablePoint {
            position: Point2::new(11.0, 9.0),
            shrink_direction: Vector2::new(0.0, 1.0),
            ..corner_point
        };
        let p = polygon.closest_polygon_point(&sideways);
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 10.0);
        assert_relative_eq!(polygon.sqr_distance_to(&Point2::new(11.0, 9.0)), 2.0);
    }

    #[test]
    fn area_and_centroid() {
        let polygon = ShrinkablePolygon::new(&square(2.0, 6.0), 1.0, &Tolerances::default()).unwrap();
        assert_relative_eq!(polygon.area(), 16.0);
        assert_relative_eq!(polygon.centroid().x, 4.0);
        assert!(!polygon.is_inverted());
        assert!(!polygon.has_intersections());
    }
}
