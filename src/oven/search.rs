//! Binary search over offset space for topology changes.

use tracing::{debug, trace, warn};

use crate::clip::PathClipper;
use crate::math::fixed_2d::IntPath;

/// Clipper output at one offset.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PolygonSolution {
    pub polygons: Vec<IntPath>,
    pub frustum_height: f64,
}

impl PolygonSolution {
    /// Whether `paths` differs in loop count or in any loop's point count.
    pub fn state_changed(&self, paths: &[IntPath]) -> bool {
        paths.len() != self.polygons.len()
            || paths
                .iter()
                .zip(&self.polygons)
                .any(|(a, b)| a.len() != b.len())
    }
}

/// Committed checkpoints in increasing height, plus the index of the lower
/// checkpoint of every topology change (the upper one follows it).
#[derive(Debug, Clone, Default)]
pub(crate) struct Checkpoints {
    pub solutions: Vec<PolygonSolution>,
    pub transitions: Vec<usize>,
}

/// Search parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchLimits {
    pub max_frustum_height: f64,
    pub max_step: f64,
    pub resolution: f64,
    pub max_states: usize,
}

impl Checkpoints {
    pub fn clear(&mut self) {
        self.solutions.clear();
        self.transitions.clear();
    }

    fn last_height(&self) -> f64 {
        self.solutions.last().map_or(f64::NEG_INFINITY, |s| s.frustum_height)
    }

    fn commit(&mut self, solution: PolygonSolution) {
        if solution.frustum_height > self.last_height() {
            self.solutions.push(solution);
        }
    }

    fn commit_transition(&mut self, left: PolygonSolution, right: PolygonSolution) {
        self.commit(left);
        let lower = self.solutions.len() - 1;
        self.solutions.push(right);
        self.transitions.push(lower);
    }

    /// Finds every offset at which the topology of `initial` changes, up to
    /// `limits.max_frustum_height`.
    ///
    /// The step doubles as a bisection interval: once a changed offset (right
    /// bound) is known, every trial halves the step, and when the step is
    /// down to the resolution both bounds are committed.
    pub fn search(
        &mut self,
        clipper: &PathClipper,
        input: &[IntPath],
        initial: Vec<IntPath>,
        limits: SearchLimits,
    ) {
        self.clear();
        let mut left = PolygonSolution {
            polygons: initial,
            frustum_height: 0.0,
        };
        self.solutions.push(left.clone());

        let mut right: Option<PolygonSolution> = None;
        let mut step = limits.max_step;
        loop {
            if self.solutions.len() >= limits.max_states {
                warn!(
                    max_states = limits.max_states,
                    frustum_height = left.frustum_height,
                    "confiner state limit reached"
                );
                break;
            }

            step = step.min(limits.max_frustum_height - left.frustum_height);
            let frustum_height = left.frustum_height + step;
            let candidate = clipper.offset(input, -frustum_height);
            trace!(frustum_height, step, loops = candidate.len(), "offset trial");

            let candidate = PolygonSolution {
                polygons: candidate,
                frustum_height,
            };
            if left.state_changed(&candidate.polygons) {
                right = Some(candidate);
                step = (step / 2.0).max(limits.resolution);
            } else {
                left = candidate;
                if right.is_some() {
                    step = (step / 2.0).max(limits.resolution);
                }
            }

            match right.take() {
                Some(found) if step <= limits.resolution => {
                    debug!(
                        left = left.frustum_height,
                        right = found.frustum_height,
                        "topology change"
                    );
                    self.commit_transition(left, found.clone());
                    left = found;
                    step = limits.max_step;
                }
                Some(found) => right = Some(found),
                None if left.frustum_height >= limits.max_frustum_height => {
                    self.commit(left);
                    break;
                }
                None => {}
            }
        }
    }
}

/// Geometry lost across each topology change, inflated so thin regions
/// survive.
///
/// For a change between heights `l` and `r`, the lower checkpoint is grown by
/// `padding * (r - l)` and the upper by twice that; what the upper one does
/// not cover is kept.
pub(crate) fn compute_skeleton(
    clipper: &PathClipper,
    checkpoints: &Checkpoints,
    padding: f64,
) -> Vec<IntPath> {
    let mut skeleton = Vec::new();
    for &lower in &checkpoints.transitions {
        let prev = &checkpoints.solutions[lower];
        let next = &checkpoints.solutions[lower + 1];
        let step = padding * (next.frustum_height - prev.frustum_height);
        let expanded_prev = clipper.offset(&prev.polygons, step);
        let expanded_next = clipper.offset(&next.polygons, step * 2.0);
        skeleton.extend(clipper.difference(&expanded_prev, &expanded_next));
    }
    debug!(loops = skeleton.len(), "skeleton computed");
    skeleton
}
