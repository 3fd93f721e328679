//! Camera lens to frustum height conversion.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A camera lens, as far as confinement cares.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Lens {
    /// Orthographic projection; `size` is half the visible height.
    Orthographic { size: f64 },
    /// Perspective projection with a vertical field of view in degrees,
    /// seen at `distance` from the confining plane.
    Perspective { field_of_view: f64, distance: f64 },
}

/// Half the height of the visible window on the confining plane.
#[must_use]
pub fn half_frustum_height(lens: Lens) -> f64 {
    match lens {
        Lens::Orthographic { size } => size,
        Lens::Perspective {
            field_of_view,
            distance,
        } => distance * (field_of_view.to_radians() * 0.5).tan(),
    }
}
