//! Confiner states: baked polygon sets at increasing frustum heights.

use crate::config::Tolerances;
use crate::math::polygon_2d::vertex_centroid;
use crate::math::{Point2, Vector2};
use crate::shrinkable::{ShrinkablePolygon, StateId};

/// How one confiner state turns into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same topology; points correspond one-to-one and can be blended.
    Interpolatable(StateId),
    /// Loops were split, merged, lost, or changed point count.
    TopologyChanged,
}

/// A baked set of polygons at one frustum height.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfinerState {
    pub polygons: Vec<ShrinkablePolygon>,
    pub frustum_height: f64,
    /// Topology interval this state belongs to.
    pub state: StateId,
}

impl ConfinerState {
    /// How this state relates to `next`.
    #[must_use]
    pub fn transition_to(&self, next: &ConfinerState) -> Transition {
        let same_shape = self.polygons.len() == next.polygons.len()
            && self
                .polygons
                .iter()
                .zip(&next.polygons)
                .all(|(a, b)| a.points().len() == b.points().len());
        if self.state == next.state && same_shape {
            Transition::Interpolatable(self.state)
        } else {
            Transition::TopologyChanged
        }
    }

    /// Blend towards `next` to reach `frustum_height`. Only meaningful for an
    /// interpolatable pair.
    #[must_use]
    pub fn lerp(&self, next: &ConfinerState, frustum_height: f64) -> ConfinerState {
        let span = next.frustum_height - self.frustum_height;
        let t = if span > 0.0 {
            ((frustum_height - self.frustum_height) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ConfinerState {
            polygons: self
                .polygons
                .iter()
                .zip(&next.polygons)
                .map(|(a, b)| a.lerp(b, t))
                .collect(),
            frustum_height,
            state: self.state,
        }
    }

    /// Extrapolate along the shrink directions to `frustum_height`.
    #[must_use]
    pub fn advance(&self, frustum_height: f64) -> ConfinerState {
        let amount = frustum_height - self.frustum_height;
        ConfinerState {
            polygons: self.polygons.iter().map(|p| p.advanced(amount)).collect(),
            frustum_height,
            state: self.state,
        }
    }
}

/// Checkpoint loops in world space, with the topology interval they belong
/// to.
pub(crate) struct WorldCheckpoint {
    pub loops: Vec<Vec<Point2>>,
    pub frustum_height: f64,
    pub interval: StateId,
}

/// Turns checkpoints into confiner states.
///
/// Within an interval, loops are reordered and rotated to line up with the
/// previous checkpoint, and each point's shrink direction is its velocity
/// towards the next checkpoint. The last checkpoint of an interval keeps the
/// velocity it arrived with; a checkpoint alone in its interval does not
/// move.
pub(crate) fn states_from_checkpoints(
    checkpoints: Vec<WorldCheckpoint>,
    aspect_ratio: f64,
    tolerances: &Tolerances,
) -> Vec<ConfinerState> {
    let mut aligned: Vec<WorldCheckpoint> = Vec::with_capacity(checkpoints.len());
    for mut checkpoint in checkpoints {
        if let Some(prev) = aligned.last() {
            if prev.interval == checkpoint.interval {
                checkpoint.loops = align_loops(&prev.loops, checkpoint.loops);
            }
        }
        aligned.push(checkpoint);
    }

    let velocities: Vec<Option<Vec<Vec<Vector2>>>> = aligned
        .windows(2)
        .map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            let dh = b.frustum_height - a.frustum_height;
            (a.interval == b.interval && dh > 0.0 && same_shape(&a.loops, &b.loops)).then(|| {
                a.loops
                    .iter()
                    .zip(&b.loops)
                    .map(|(la, lb)| la.iter().zip(lb).map(|(pa, pb)| (pb - pa) / dh).collect())
                    .collect()
            })
        })
        .collect();

    aligned
        .iter()
        .enumerate()
        .map(|(k, checkpoint)| {
            let outgoing = velocities.get(k).and_then(Option::as_ref);
            let incoming = k
                .checked_sub(1)
                .and_then(|i| velocities.get(i))
                .and_then(Option::as_ref);
            let directions = outgoing.or(incoming);
            let polygons = checkpoint
                .loops
                .iter()
                .enumerate()
                .map(|(i, l)| {
                    let dirs = directions.map_or(&[][..], |d| d[i].as_slice());
                    ShrinkablePolygon::from_loop(l, dirs, aspect_ratio, tolerances, checkpoint.interval)
                        .at_frustum_height(checkpoint.frustum_height)
                })
                .collect();
            ConfinerState {
                polygons,
                frustum_height: checkpoint.frustum_height,
                state: checkpoint.interval,
            }
        })
        .collect()
}

fn same_shape(a: &[Vec<Point2>], b: &[Vec<Point2>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.len() == y.len())
}

/// Reorders `next` to follow `prev` loop by loop, and rotates each loop so
/// its points line up with the matching loop of `prev`.
///
/// Loops are matched by point count and then by nearest vertex centroid.
fn align_loops(prev: &[Vec<Point2>], next: Vec<Vec<Point2>>) -> Vec<Vec<Point2>> {
    let mut remaining: Vec<Option<Vec<Point2>>> = next.into_iter().map(Some).collect();
    let mut result = Vec::with_capacity(remaining.len());
    for target in prev {
        let centre = vertex_centroid(target);
        let best = remaining
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.as_ref().map(|l| (i, l)))
            .filter(|(_, l)| l.len() == target.len())
            .map(|(i, l)| (i, (vertex_centroid(l) - centre).norm_squared()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);
        if let Some(mut l) = best.and_then(|i| remaining[i].take()) {
            let shift = best_rotation(target, &l);
            l.rotate_left(shift);
            result.push(l);
        }
    }
    result.extend(remaining.into_iter().flatten());
    result
}

/// Rotation of `l` minimizing the summed squared distance to `target`.
fn best_rotation(target: &[Point2], l: &[Point2]) -> usize {
    let n = l.len();
    (0..n)
        .map(|shift| {
            let cost: f64 = target
                .iter()
                .enumerate()
                .map(|(i, p)| (l[(i + shift) % n] - p).norm_squared())
                .sum();
            (shift, cost)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(shift, _)| shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f64, max: f64) -> Vec<Point2> {
        vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    fn checkpoint(loops: Vec<Vec<Point2>>, frustum_height: f64, interval: u32) -> WorldCheckpoint {
        let mut id = StateId::default();
        for _ in 0..interval {
            id = id.next();
        }
        WorldCheckpoint {
            loops,
            frustum_height,
            interval: id,
        }
    }

    #[test]
    fn rotation_lines_up_points() {
        let target = square(0.0, 10.0);
        let mut shifted = square(1.0, 9.0);
        shifted.rotate_left(2);
        let aligned = align_loops(&[target], vec![shifted]);
        assert_relative_eq!(aligned[0][0].x, 1.0);
        assert_relative_eq!(aligned[0][0].y, 1.0);
    }

    #[test]
    fn loops_are_matched_by_position() {
        let prev = vec![square(0.0, 2.0), square(10.0, 12.0)];
        let next = vec![square(10.5, 11.5), square(0.5, 1.5)];
        let aligned = align_loops(&prev, next);
        assert_relative_eq!(aligned[0][0].x, 0.5);
        assert_relative_eq!(aligned[1][0].x, 10.5);
    }

    #[test]
    fn velocities_become_shrink_directions() {
        let mut rotated = square(2.0, 8.0);
        rotated.rotate_left(1);
        let states = states_from_checkpoints(
            vec![
                checkpoint(vec![square(0.0, 10.0)], 0.0, 0),
                checkpoint(vec![rotated], 2.0, 0),
            ],
            1.0,
            &Tolerances::default(),
        );
        assert_eq!(states.len(), 2);
        for state in &states {
            let d = state.polygons[0].points()[0].shrink_direction;
            assert_relative_eq!(d.x, 1.0);
            assert_relative_eq!(d.y, 1.0);
        }
        assert!(matches!(states[0].transition_to(&states[1]), Transition::Interpolatable(_)));

        let halfway = states[0].lerp(&states[1], 1.0);
        let p = halfway.polygons[0].points()[0].position;
        assert_relative_eq!(p.x, 1.0);
        let advanced = states[0].advance(1.0);
        assert_relative_eq!(advanced.polygons[0].points()[0].position.x, 1.0);
    }

    #[test]
    fn interval_change_is_a_topology_change() {
        let states = states_from_checkpoints(
            vec![
                checkpoint(vec![square(0.0, 10.0)], 0.0, 0),
                checkpoint(vec![square(4.0, 6.0)], 4.0, 0),
                checkpoint(vec![], 5.0, 1),
            ],
            1.0,
            &Tolerances::default(),
        );
        assert_eq!(states[1].transition_to(&states[2]), Transition::TopologyChanged);
        // the last state of an interval keeps moving the way it arrived
        let d = states[1].polygons[0].points()[0].shrink_direction;
        assert_relative_eq!(d.x, 1.0);
        assert!(states[2].polygons.is_empty());
    }

    #[test]
    fn lone_checkpoint_does_not_move() {
        let states = states_from_checkpoints(
            vec![checkpoint(vec![square(0.0, 10.0)], 0.0, 0)],
            1.0,
            &Tolerances::default(),
        );
        assert!(!states[0].polygons[0].is_shrinkable());
    }
}
