//! Bake configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters controlling a bake.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BakeConfig {
    /// Smallest offset step of the topology search. The two checkpoints of a
    /// topology change are less than twice this far apart.
    pub resolution: f64,

    /// Upper bound on recorded confiner states.
    pub max_states: usize,

    /// Upper bound on intersection splits of one polygon per erosion step.
    pub max_divisions: usize,

    /// Inflation applied around a transition when collecting the skeleton,
    /// as a multiple of the transition width.
    pub skeleton_padding: f64,

    /// Miter limit of the clipping backend's offset joins.
    pub miter_limit: f64,

    /// Whether eroded polygons below `min_area` collapse towards their centre
    /// instead of stopping.
    pub shrink_to_point: bool,

    /// Area below which an eroded polygon is considered collapsed.
    pub min_area: f64,

    /// Largest single erosion step of the erosion oven, as a fraction of the
    /// maximum frustum height.
    pub erosion_step_fraction: f64,

    /// Empirical geometric tolerances.
    pub tolerances: Tolerances,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            resolution: 0.005,
            max_states: 1000,
            max_divisions: 10,
            skeleton_padding: 5.0,
            miter_limit: 2.0,
            shrink_to_point: true,
            min_area: 0.01,
            erosion_step_fraction: 0.05,
            tolerances: Tolerances::default(),
        }
    }
}

impl BakeConfig {
    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    #[must_use]
    pub fn with_shrink_to_point(mut self, shrink_to_point: bool) -> Self {
        self.shrink_to_point = shrink_to_point;
        self
    }

    #[must_use]
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }
}

/// Tuned tolerances. The defaults reproduce the behaviour the confiner was
/// calibrated with; none of them is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tolerances {
    /// Signed angle (degrees) between adjacent edge normals past which a
    /// corner counts as reflex and is split into three points.
    pub reflex_corner_angle: f64,

    /// Distance of the synthetic corner points along the adjacent edges, as a
    /// fraction of the edge length.
    pub corner_split_fraction: f64,

    /// Angle (degrees) below which a triangle is too thin to solve when
    /// placing the camera window into a corner.
    pub narrow_angle: f64,

    /// Angle slack (degrees) of the single-corner window contact case.
    pub corner_slack: f64,

    /// Relative cross-product magnitude below which segments are parallel.
    pub parallel_epsilon: f64,

    /// Endpoint distance (world units) under which parallel segments count as
    /// the same line.
    pub coincident_distance: f64,

    /// Component difference under which two shrink directions are equal.
    pub direction_epsilon: f64,

    /// Half width (world units) of the thin bridges stitching cut pieces and
    /// corners into converted paths.
    pub bridge_half_width: f64,

    /// Angle (degrees) within which a vertex counts as lying along a point's
    /// shrink direction.
    pub alignment_angle: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            reflex_corner_angle: 0.0,
            corner_split_fraction: 0.01,
            narrow_angle: 0.05,
            corner_slack: 1.0,
            parallel_epsilon: 1e-9,
            coincident_distance: 0.01,
            direction_epsilon: 1e-4,
            bridge_half_width: 0.01,
            alignment_angle: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let config = BakeConfig::default();
        assert!((config.resolution - 0.005).abs() < f64::EPSILON);
        assert_eq!(config.max_states, 1000);
        assert_eq!(config.max_divisions, 10);
        assert!(config.shrink_to_point);
    }

    #[test]
    fn builder_overrides() {
        let config = BakeConfig::default()
            .with_resolution(0.01)
            .with_max_states(12)
            .with_shrink_to_point(false)
            .with_tolerances(Tolerances {
                bridge_half_width: 0.02,
                ..Tolerances::default()
            });
        assert!((config.resolution - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.max_states, 12);
        assert!(!config.shrink_to_point);
        assert!((config.tolerances.bridge_half_width - 0.02).abs() < f64::EPSILON);
    }
}
