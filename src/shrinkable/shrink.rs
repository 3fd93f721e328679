use tracing::trace;

use super::ShrinkablePolygon;
use crate::math::Vector2;

impl ShrinkablePolygon {
    /// Moves every point along its shrink direction by `amount`.
    ///
    /// Once the polygon's area falls below its minimum area, the directions
    /// are redirected towards the centroid when `shrink_to_point` is set
    /// (points already within one window of it stop). Otherwise every
    /// direction is zeroed and the polygon is left untouched.
    ///
    /// Returns `false` if the polygon stopped shrinking.
    pub fn shrink(&mut self, amount: f64, shrink_to_point: bool) -> bool {
        self.frustum_height += amount;
        if self.area() < self.min_area {
            let previous: Vec<Vector2> = self.points.iter().map(|p| p.shrink_direction).collect();
            if shrink_to_point {
                let centre = self.centroid();
                let aspect = self.window.aspect();
                for point in &mut self.points {
                    let direction = centre - point.position;
                    point.shrink_direction = if direction.x.abs() > aspect || direction.y.abs() > 1.0 {
                        self.window.fit(direction)
                    } else {
                        Vector2::zeros()
                    };
                }
            } else {
                for point in &mut self.points {
                    point.shrink_direction = Vector2::zeros();
                }
            }
            if self.directions_differ(&previous) {
                self.state.bump();
            }
            if !shrink_to_point {
                return false;
            }
        }

        for point in &mut self.points {
            point.position += point.shrink_direction * amount;
        }
        true
    }

    /// Removes synthetic corner points that came within `2 * shrink_amount`
    /// (squared distance) of a neighbour. Never reduces the polygon below 4
    /// points.
    pub fn simplify(&mut self, shrink_amount: f64) {
        let limit = shrink_amount * 2.0;
        let mut removed = false;
        while self.points.len() > 4 {
            let n = self.points.len();
            let pair = (0..n).map(|i| (i, (i + 1) % n)).find(|&(i, j)| {
                let (a, b) = (&self.points[i], &self.points[j]);
                (a.cant_intersect || b.cant_intersect)
                    && (a.position - b.position).norm_squared() <= limit
            });
            let Some((i, j)) = pair else {
                break;
            };
            match (self.points[i].cant_intersect, self.points[j].cant_intersect) {
                (true, true) => {
                    self.points.remove(i.max(j));
                    self.points.remove(i.min(j));
                }
                (true, false) => {
                    self.points.remove(i);
                }
                _ => {
                    self.points.remove(j);
                }
            }
            removed = true;
        }
        if removed {
            trace!(points = self.points.len(), "simplified polygon");
            self.state.bump();
        }
    }
}
