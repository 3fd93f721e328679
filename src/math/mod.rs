pub mod angle_2d;
pub mod direction_2d;
pub mod fixed_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Coarser tolerance for quantities derived from user-scale coordinates
/// (squared lengths, areas).
pub const EPSILON: f64 = 1e-5;
