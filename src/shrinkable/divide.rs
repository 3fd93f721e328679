use tracing::{trace, warn};

use super::{ShrinkablePoint, ShrinkablePolygon};
use crate::math::polygon_2d::{closest_index, leftmost_index};

impl ShrinkablePolygon {
    /// Splits the polygon at its self-intersections.
    ///
    /// At most `max_divisions` cuts are made; any crossings left after that
    /// stay in the last piece. No piece is ever dropped.
    #[must_use]
    pub fn divide_along_intersections(self, max_divisions: usize) -> Vec<ShrinkablePolygon> {
        let mut pieces = Vec::new();
        let mut rest = self;
        for _ in 0..max_divisions {
            match rest.split_at_first_crossing() {
                Ok((cut_off, remainder)) => {
                    pieces.push(cut_off);
                    rest = remainder;
                }
                Err(unchanged) => {
                    rest = unchanged;
                    break;
                }
            }
        }
        if pieces.len() == max_divisions && rest.has_intersections() {
            warn!(max_divisions, "division limit reached, keeping remaining intersections");
        }
        pieces.push(rest);
        pieces
    }

    /// Cuts at the first crossing into the piece left of it and the
    /// remainder, which may still intersect itself. Returns the polygon
    /// unchanged if it has no crossing.
    fn split_at_first_crossing(self) -> Result<(Self, Self), Self> {
        let Some((i, j, cut)) = self.first_crossing() else {
            return Err(self);
        };
        let n = self.points.len();
        trace!(i, j, x = cut.x, y = cut.y, "dividing polygon");

        let run = |from: usize, to: usize| {
            let mut points = vec![ShrinkablePoint::cut(cut)];
            let mut k = from % n;
            while k != to % n {
                points.push(self.points[k]);
                k = (k + 1) % n;
            }
            points
        };

        let mut g1 = self.empty_like();
        g1.points = rotated(run(j + 1, i + 1), |points| leftmost_index(points, |p| p.position));
        g1.state.bump();

        let mut g2 = self.empty_like();
        g2.points = rotated(run(i + 1, j + 1), |points| {
            closest_index(points, &cut, |p| p.position)
        });
        g2.state.bump();

        for p in &self.intersection_points {
            if g1.sqr_distance_to(p) < g2.sqr_distance_to(p) {
                g1.intersection_points.push(*p);
            } else {
                g2.intersection_points.push(*p);
            }
        }
        g1.intersection_points.push(cut);
        g2.intersection_points.push(cut);

        Ok((g1, g2))
    }
}

fn rotated(
    mut points: Vec<ShrinkablePoint>,
    start: impl Fn(&[ShrinkablePoint]) -> usize,
) -> Vec<ShrinkablePoint> {
    let first = start(&points);
    points.rotate_left(first);
    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn positions(points: &[ShrinkablePoint]) -> Vec<Point2> {
        points.iter().map(|p| p.position).collect()
    }

    /// A strip twisted three times, crossing itself at (1, 1), (3, 1) and
    /// (5, 1).
    fn twisted_strip() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(4.0, 0.0),
            Point2::new(6.0, 2.0),
            Point2::new(6.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ]
    }

    /// A figure-eight: a bow tie whose two lobes cross at (1, 1).
    fn bow_tie() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ]
    }

    fn polygon_from(points: &[Point2]) -> ShrinkablePolygon {
        let tolerances = Tolerances::default();
        let mut polygon = ShrinkablePolygon::new(&crate::shrinkable::tests::square(0.0, 10.0), 1.0, &tolerances)
            .unwrap();
        polygon.points = points.iter().copied().map(ShrinkablePoint::original).collect();
        polygon
    }

    #[test]
    fn bow_tie_splits_into_two_triangles() {
        let polygon = polygon_from(&bow_tie());
        let state = polygon.state();
        let pieces = polygon.divide_along_intersections(10);
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            assert_eq!(piece.points().len(), 3);
            assert!(!piece.has_intersections());
            assert!(piece.state() > state);
            assert_eq!(piece.intersection_points().len(), 1);
            assert_relative_eq!(piece.intersection_points()[0].x, 1.0, epsilon = 1e-9);
            assert_relative_eq!(piece.intersection_points()[0].y, 1.0, epsilon = 1e-9);
            assert!(piece.points().iter().any(|p| p.original_position.is_none()));
        }
        // the cut-off piece starts at its leftmost point
        let first = &pieces[0];
        let min_x = first.points().iter().map(|p| p.position.x).fold(f64::MAX, f64::min);
        assert_relative_eq!(first.points()[0].position.x, min_x);
        // the remainder starts at the cut
        assert_relative_eq!(pieces[1].points()[0].position.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn repeated_crossings_split_repeatedly() {
        let pieces = polygon_from(&twisted_strip()).divide_along_intersections(10);
        assert_eq!(pieces.len(), 4);
        assert!(pieces.iter().all(|p| !p.has_intersections()));
        let sizes: Vec<usize> = pieces.iter().map(|p| p.points().len()).collect();
        assert_eq!(sizes, vec![3, 4, 4, 3]);
        // older cuts go to the piece that touches them
        assert_eq!(pieces[1].intersection_points().len(), 2);
        assert_eq!(pieces[3].intersection_points().len(), 1);
        assert_relative_eq!(pieces[3].intersection_points()[0].x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn division_limit_keeps_crossing_remainder() {
        let pieces = polygon_from(&twisted_strip()).divide_along_intersections(2);
        assert_eq!(pieces.len(), 3);
        assert!(pieces[2].has_intersections());
        assert_eq!(pieces[2].points().len(), 5);
    }

    #[test]
    fn simple_polygon_is_one_piece() {
        let polygon = polygon_from(&crate::shrinkable::tests::square(0.0, 1.0));
        let pieces = polygon.clone().divide_along_intersections(10);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0], polygon);
    }

    #[test]
    fn division_limit_keeps_remainder() {
        let polygon = polygon_from(&bow_tie());
        let pieces = polygon.divide_along_intersections(0);
        assert_eq!(pieces.len(), 1);
        assert!(pieces[0].has_intersections());
        assert_eq!(positions(pieces[0].points()), bow_tie());
    }
}
