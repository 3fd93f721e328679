//! Confiner states baked by eroding shrinkable polygons directly.

use tracing::{debug, trace, warn};

use crate::config::BakeConfig;
use crate::error::Result;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;
use crate::shrinkable::{ShrinkablePolygon, StateId};

use super::state::ConfinerState;
use super::{effective_max_height, validate_input};

/// Bakes confiner states by repeatedly shrinking the input polygons.
///
/// Each step is tried on a copy. A step that makes a polygon cross itself or
/// flip its winding is rolled back and retried at half the size, down to the
/// resolution; a crossing that survives at the resolution is cut apart.
/// A new topology interval starts whenever the polygon count, a point count
/// or a polygon's shrink directions change.
#[derive(Debug, Clone, Default)]
pub struct ErosionOven {
    config: BakeConfig,
}

impl ErosionOven {
    #[must_use]
    pub fn new(config: BakeConfig) -> Self {
        Self { config }
    }

    /// Bakes states for `contours` up to `max_frustum_height` (0 for half
    /// the shape's height). Contours wound against the largest one are holes.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid aspect ratio or height limit, or for
    /// degenerate contours.
    pub fn bake(
        &self,
        contours: &[Vec<Point2>],
        aspect_ratio: f64,
        max_frustum_height: f64,
    ) -> Result<Vec<ConfinerState>> {
        let bounds = validate_input(contours, aspect_ratio, max_frustum_height)?;
        let config = &self.config;
        let max_height = effective_max_height(&bounds, max_frustum_height);
        let max_step = (max_height * config.erosion_step_fraction).max(config.resolution);

        let mut polygons = self.input_polygons(contours, aspect_ratio)?;
        let mut interval = StateId::default();
        let mut states = vec![snapshot(&polygons, 0.0, interval)];
        let mut frustum_height = 0.0;
        let mut step = max_step;

        while frustum_height < max_height {
            if states.len() >= config.max_states {
                warn!(max_states = config.max_states, frustum_height, "confiner state limit reached");
                break;
            }
            if !polygons.iter().any(ShrinkablePolygon::is_shrinkable) {
                debug!(frustum_height, "nothing left to erode");
                break;
            }

            step = step.min(max_height - frustum_height);
            let trial: Vec<ShrinkablePolygon> = polygons
                .iter()
                .map(|p| {
                    let mut p = p.clone();
                    p.shrink(step, config.shrink_to_point);
                    p
                })
                .collect();
            if step > config.resolution && trial.iter().any(|p| p.has_intersections() || p.is_inverted()) {
                step = (step * 0.5).max(config.resolution);
                trace!(frustum_height, step, "erosion step rolled back");
                continue;
            }

            let previous_height = frustum_height;
            frustum_height += step;
            let next = self.repair(trial, step);
            if fingerprint(&next) != fingerprint(&polygons) {
                if states.last().is_some_and(|s| s.frustum_height < previous_height) {
                    states.push(snapshot(&polygons, previous_height, interval));
                }
                interval = interval.next();
                states.push(snapshot(&next, frustum_height, interval));
                debug!(frustum_height, polygons = next.len(), "erosion topology change");
            }
            polygons = next;
            step = (step * 2.0).min(max_step);
        }

        if states.last().is_some_and(|s| s.frustum_height < frustum_height) {
            states.push(snapshot(&polygons, frustum_height, interval));
        }
        states.truncate(config.max_states);
        debug!(states = states.len(), max_frustum_height = frustum_height, "erosion bake finished");
        Ok(states)
    }

    fn input_polygons(&self, contours: &[Vec<Point2>], aspect_ratio: f64) -> Result<Vec<ShrinkablePolygon>> {
        let tolerances = &self.config.tolerances;
        let areas: Vec<f64> = contours.iter().map(|c| signed_area_2d(c)).collect();
        let solid_positive = areas
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .map_or(true, |a| a > 0.0);
        contours
            .iter()
            .zip(&areas)
            .map(|(contour, area)| {
                let polygon = if (*area > 0.0) == solid_positive {
                    ShrinkablePolygon::new(contour, aspect_ratio, tolerances)?
                } else {
                    ShrinkablePolygon::new_hole(contour, aspect_ratio, tolerances)?
                };
                Ok(polygon.with_min_area(self.config.min_area))
            })
            .collect()
    }

    /// Cuts crossing polygons apart, drops collapsed pieces, and refreshes
    /// the rest after a step of `step`.
    fn repair(&self, trial: Vec<ShrinkablePolygon>, step: f64) -> Vec<ShrinkablePolygon> {
        let mut next = Vec::with_capacity(trial.len());
        for polygon in trial {
            let pieces = if polygon.has_intersections() {
                polygon.divide_along_intersections(self.config.max_divisions)
            } else {
                vec![polygon]
            };
            for mut piece in pieces {
                if piece.points().len() < 3 || piece.is_inverted() {
                    trace!(points = piece.points().len(), "dropped collapsed piece");
                    continue;
                }
                piece.simplify(step);
                // collapsing polygons keep the directions towards their centre
                if piece.area() >= piece.min_area() {
                    piece.compute_aspect_based_shrink_directions();
                }
                next.push(piece);
            }
        }
        next
    }
}

fn snapshot(polygons: &[ShrinkablePolygon], frustum_height: f64, state: StateId) -> ConfinerState {
    ConfinerState {
        polygons: polygons.to_vec(),
        frustum_height,
        state,
    }
}

fn fingerprint(polygons: &[ShrinkablePolygon]) -> Vec<(StateId, usize)> {
    polygons.iter().map(|p| (p.state(), p.points().len())).collect()
}
