//! Offline baking of confiner states.
//!
//! [`ConfinerOven`] erodes the input shape by a rectangular window using the
//! clipping backend. To turn the rectangle into a square it first squeezes x
//! by the aspect ratio, so a plain mitered offset by `h` is the same as
//! eroding by an `aspect * h` by `h` window. A binary search over `h` then
//! finds every offset at which the shape's topology changes.

mod confine;
mod erosion;
mod search;
mod state;

pub use confine::ConfinerSolution;
pub use erosion::ErosionOven;
pub use state::{ConfinerState, Transition};

use tracing::debug;

use crate::clip::PathClipper;
use crate::config::{BakeConfig, Tolerances};
use crate::error::{BakeError, Result};
use crate::math::fixed_2d::{path_from_points, IntPath, IntPoint};
use crate::math::polygon_2d::{bounding_rect, Rect};
use crate::math::Point2;
use crate::shrinkable::{validate_aspect_ratio, validate_contour, StateId};

use search::{compute_skeleton, Checkpoints, SearchLimits};
use state::{states_from_checkpoints, WorldCheckpoint};

/// Maps between world space and the aspect-neutral space the search runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AspectSpace {
    center_x: f64,
    aspect_ratio: f64,
}

impl AspectSpace {
    fn to_neutral(self, p: &Point2) -> Point2 {
        Point2::new((p.x - self.center_x) / self.aspect_ratio + self.center_x, p.y)
    }

    fn to_world(self, p: &Point2) -> Point2 {
        Point2::new((p.x - self.center_x) * self.aspect_ratio + self.center_x, p.y)
    }

    fn path_to_world(self, path: &[IntPoint]) -> Vec<Point2> {
        path.iter().map(|p| self.to_world(&p.to_point())).collect()
    }
}

/// Checks the shared bake inputs and returns the shape's bounding rectangle.
pub(crate) fn validate_input(
    contours: &[Vec<Point2>],
    aspect_ratio: f64,
    max_frustum_height: f64,
) -> Result<Rect> {
    validate_aspect_ratio(aspect_ratio)?;
    if !max_frustum_height.is_finite() || max_frustum_height < 0.0 {
        return Err(BakeError::InvalidInput(format!(
            "max frustum height must be finite and non-negative, got {max_frustum_height}"
        ))
        .into());
    }
    for (index, contour) in contours.iter().enumerate() {
        validate_contour(index, contour)?;
    }
    bounding_rect(contours).ok_or_else(|| BakeError::InvalidInput("no contours".into()).into())
}

/// Upper bound of the bake: half the shape's height, or the user limit if
/// smaller. A user limit of zero means none.
pub(crate) fn effective_max_height(bounds: &Rect, max_frustum_height: f64) -> f64 {
    let half_height = bounds.height() * 0.5;
    if max_frustum_height <= 0.0 || max_frustum_height > half_height {
        half_height
    } else {
        max_frustum_height
    }
}

/// Bakes confiners with the clipping backend.
///
/// The oven keeps its search buffers between bakes.
#[derive(Debug, Clone)]
pub struct ConfinerOven {
    config: BakeConfig,
    clipper: PathClipper,
    checkpoints: Checkpoints,
}

impl Default for ConfinerOven {
    fn default() -> Self {
        Self::new(BakeConfig::default())
    }
}

impl ConfinerOven {
    #[must_use]
    pub fn new(config: BakeConfig) -> Self {
        Self {
            clipper: PathClipper::new(config.miter_limit),
            config,
            checkpoints: Checkpoints::default(),
        }
    }

    /// Bakes confiner states for `contours` as seen by a window of
    /// `aspect_ratio`, up to `max_frustum_height` (0 for no limit).
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid aspect ratio or height limit, for
    /// degenerate contours, or if the shape vanishes at zero offset.
    pub fn bake(
        &mut self,
        contours: &[Vec<Point2>],
        aspect_ratio: f64,
        max_frustum_height: f64,
    ) -> Result<BakedConfiner> {
        let bounds = validate_input(contours, aspect_ratio, max_frustum_height)?;
        let space = AspectSpace {
            center_x: bounds.center().x,
            aspect_ratio,
        };
        let max_height = effective_max_height(&bounds, max_frustum_height);

        let input: Vec<IntPath> = contours
            .iter()
            .map(|c| {
                let neutral: Vec<Point2> = c.iter().map(|p| space.to_neutral(p)).collect();
                path_from_points(&neutral)
            })
            .collect();
        let original: Vec<IntPath> = contours.iter().map(|c| path_from_points(c)).collect();

        let initial = self.clipper.offset(&input, 0.0);
        if initial.is_empty() {
            return Err(BakeError::Empty.into());
        }

        let limits = SearchLimits {
            max_frustum_height: max_height,
            max_step: (bounds.height() * 0.5 / 4.0).max(self.config.resolution),
            resolution: self.config.resolution,
            max_states: self.config.max_states,
        };
        self.checkpoints.search(&self.clipper, &input, initial, limits);
        let skeleton = compute_skeleton(&self.clipper, &self.checkpoints, self.config.skeleton_padding);

        let solutions = &self.checkpoints.solutions;
        let transitions = &self.checkpoints.transitions;
        let baked_max = solutions.last().map_or(0.0, |s| s.frustum_height);
        let min_with_bones = transitions
            .first()
            .map_or(f64::INFINITY, |&i| solutions[i].frustum_height);
        debug!(
            checkpoints = solutions.len(),
            transitions = transitions.len(),
            max_frustum_height = baked_max,
            "confiner baked"
        );

        let mut interval = StateId::default();
        let mut world = Vec::with_capacity(solutions.len());
        for (k, solution) in solutions.iter().enumerate() {
            if k > 0 && transitions.contains(&(k - 1)) {
                interval = interval.next();
            }
            world.push(WorldCheckpoint {
                loops: solution.polygons.iter().map(|p| space.path_to_world(p)).collect(),
                frustum_height: solution.frustum_height,
                interval,
            });
        }
        let states = states_from_checkpoints(world, aspect_ratio, &self.config.tolerances);

        let world_skeleton = skeleton
            .iter()
            .map(|p| path_from_points(&space.path_to_world(p)))
            .collect();

        Ok(BakedConfiner {
            space,
            clipper: self.clipper,
            tolerances: self.config.tolerances,
            resolution: self.config.resolution,
            input,
            original,
            sqr_polygon_diagonal: bounds.width() * bounds.width() + bounds.height() * bounds.height(),
            bounds,
            max_frustum_height: baked_max,
            min_frustum_height_with_bones: min_with_bones,
            skeleton,
            world_skeleton,
            states,
        })
    }
}

/// Result of a bake.
#[derive(Debug, Clone)]
pub struct BakedConfiner {
    space: AspectSpace,
    clipper: PathClipper,
    tolerances: Tolerances,
    resolution: f64,
    /// Input in aspect-neutral space.
    input: Vec<IntPath>,
    /// Input in world space.
    original: Vec<IntPath>,
    bounds: Rect,
    sqr_polygon_diagonal: f64,
    max_frustum_height: f64,
    min_frustum_height_with_bones: f64,
    /// Skeleton in aspect-neutral space.
    skeleton: Vec<IntPath>,
    world_skeleton: Vec<IntPath>,
    states: Vec<ConfinerState>,
}

impl BakedConfiner {
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.space.aspect_ratio
    }

    /// Largest frustum height that was baked.
    #[must_use]
    pub fn max_frustum_height(&self) -> f64 {
        self.max_frustum_height
    }

    /// Frustum height of the first topology change, or infinity if the
    /// shape never changes.
    #[must_use]
    pub fn min_frustum_height_with_bones(&self) -> f64 {
        self.min_frustum_height_with_bones
    }

    /// World-space bounding rectangle of the input.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub fn sqr_polygon_diagonal(&self) -> f64 {
        self.sqr_polygon_diagonal
    }

    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[must_use]
    pub fn clipper(&self) -> &PathClipper {
        &self.clipper
    }

    /// Baked states in increasing frustum height.
    #[must_use]
    pub fn states(&self) -> &[ConfinerState] {
        &self.states
    }

    /// Skeleton loops in world space.
    #[must_use]
    pub fn skeleton(&self) -> &[IntPath] {
        &self.world_skeleton
    }

    /// The confiner outline for a window of `frustum_height`: the input
    /// eroded by the window, joined with the skeleton.
    #[must_use]
    pub fn calculate_confiner_at_frustum_height(&self, frustum_height: f64) -> ConfinerSolution {
        let eroded = self.clipper.offset(&self.input, -frustum_height);
        let merged = self.clipper.union(&eroded, &self.skeleton);
        let world = merged
            .iter()
            .map(|p| path_from_points(&self.space.path_to_world(p)))
            .collect();
        ConfinerSolution::new(world, frustum_height)
    }

    /// Wraps world-space loops computed elsewhere (for example from
    /// interpolated states) so points can be confined against them.
    #[must_use]
    pub fn solution_from_paths(&self, paths: &[Vec<Point2>], frustum_height: f64) -> ConfinerSolution {
        ConfinerSolution::new(paths.iter().map(|p| path_from_points(p)).collect(), frustum_height)
    }
}
