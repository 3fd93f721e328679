//! Per-frame confinement against a cached bake.

mod lens;

pub use lens::{half_frustum_height, Lens};

use tracing::{debug, trace};

use crate::config::BakeConfig;
use crate::error::{BakeError, Result};
use crate::math::polygon_2d::point_in_loops;
use crate::math::{Point2, Vector2};
use crate::oven::{BakedConfiner, ConfinerOven, ConfinerSolution, ConfinerState, Transition};
use crate::shrinkable::{convert_to_path, StateId};

/// The confiner boundary for one frustum height.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryQuery {
    pub path: ConfinerSolution,
    /// Whether the boundary comes from a different topology interval than
    /// the previous query. Always set on the first query after a bake.
    pub topology_changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct BakeKey {
    contours: Vec<Vec<Point2>>,
    aspect_ratio: f64,
    max_frustum_height: f64,
}

#[derive(Debug, Clone)]
struct CachedPath {
    frustum_height: f64,
    path: ConfinerSolution,
}

/// Owns a bake and answers boundary queries against it.
///
/// The bake is redone only when the shape, aspect ratio or height limit
/// passed to [`prepare`](Self::prepare) changes, or after
/// [`invalidate`](Self::invalidate).
#[derive(Debug, Clone, Default)]
pub struct ConfinerRuntime {
    oven: ConfinerOven,
    key: Option<BakeKey>,
    baked: Option<BakedConfiner>,
    cached: Option<CachedPath>,
    interval: Option<StateId>,
}

impl ConfinerRuntime {
    #[must_use]
    pub fn new(config: BakeConfig) -> Self {
        Self {
            oven: ConfinerOven::new(config),
            ..Self::default()
        }
    }

    /// Bakes `contours` unless the current bake already matches. Returns
    /// whether a bake ran.
    ///
    /// # Errors
    ///
    /// Propagates bake errors; the previous bake is dropped in that case.
    pub fn prepare(
        &mut self,
        contours: &[Vec<Point2>],
        aspect_ratio: f64,
        max_frustum_height: f64,
    ) -> Result<bool> {
        let key = BakeKey {
            contours: contours.to_vec(),
            aspect_ratio,
            max_frustum_height,
        };
        if self.baked.is_some() && self.key.as_ref() == Some(&key) {
            return Ok(false);
        }
        self.invalidate();
        let baked = self.oven.bake(contours, aspect_ratio, max_frustum_height)?;
        debug!(states = baked.states().len(), "confiner cache rebuilt");
        self.baked = Some(baked);
        self.key = Some(key);
        Ok(true)
    }

    /// Drops the bake and every cached query.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.baked = None;
        self.cached = None;
        self.interval = None;
    }

    #[must_use]
    pub fn baked(&self) -> Option<&BakedConfiner> {
        self.baked.as_ref()
    }

    /// The confiner boundary for a window of half height `frustum_height`,
    /// clamped to the baked range.
    ///
    /// Between two states of one topology interval the boundary is blended
    /// point for point; across a topology change the lower state is carried
    /// along its shrink directions instead. A query within the bake
    /// resolution of the previous one reuses its boundary.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::NotBaked`] before a successful
    /// [`prepare`](Self::prepare).
    pub fn query_boundary(&mut self, frustum_height: f64) -> Result<BoundaryQuery> {
        let baked = self.baked.as_ref().ok_or(BakeError::NotBaked)?;
        let frustum_height = frustum_height.clamp(0.0, baked.max_frustum_height());

        if let Some(cached) = &self.cached {
            if (cached.frustum_height - frustum_height).abs() < baked.resolution() {
                trace!(frustum_height, "confiner path cache hit");
                return Ok(BoundaryQuery {
                    path: cached.path.clone(),
                    topology_changed: false,
                });
            }
        }

        let (state, interval) = state_at(baked.states(), frustum_height).ok_or(BakeError::Empty)?;
        let conversion = convert_to_path(&state.polygons, frustum_height, baked.skeleton(), baked.clipper());
        let path = baked.solution_from_paths(&conversion.paths, frustum_height);

        let topology_changed = self.interval != Some(interval);
        if topology_changed {
            debug!(frustum_height, interval = interval.value(), "confiner topology changed");
        }
        self.interval = Some(interval);
        self.cached = Some(CachedPath {
            frustum_height,
            path: path.clone(),
        });
        Ok(BoundaryQuery {
            path,
            topology_changed,
        })
    }

    /// Displacement that brings `point` into `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::NotBaked`] before a successful
    /// [`prepare`](Self::prepare).
    pub fn confine_point(&self, path: &ConfinerSolution, point: &Point2) -> Result<Vector2> {
        let baked = self.baked.as_ref().ok_or(BakeError::NotBaked)?;
        Ok(baked.confine_point(path, point))
    }

    /// Ray-crossing parity test of `point` against `path`.
    #[must_use]
    pub fn is_inside(path: &ConfinerSolution, point: &Point2) -> bool {
        point_in_loops(&path.paths(), point)
    }
}

/// The state at `frustum_height` and the interval it belongs to.
fn state_at(states: &[ConfinerState], frustum_height: f64) -> Option<(ConfinerState, StateId)> {
    let upper = states.partition_point(|s| s.frustum_height <= frustum_height);
    let lower = states.get(upper.checked_sub(1)?)?;
    let state = match states.get(upper) {
        Some(next) => match lower.transition_to(next) {
            Transition::Interpolatable(_) => lower.lerp(next, frustum_height),
            Transition::TopologyChanged => lower.advance(frustum_height),
        },
        None => lower.advance(frustum_height),
    };
    Some((state, lower.state))
}
