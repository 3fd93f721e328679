pub mod clip;
pub mod config;
pub mod error;
pub mod math;
pub mod oven;
pub mod runtime;
pub mod shrinkable;

pub use config::{BakeConfig, Tolerances};
pub use error::{BakeError, ConfinerError, GeometryError, Result};
pub use oven::{BakedConfiner, ConfinerOven, ConfinerSolution, ConfinerState, ErosionOven, Transition};
pub use runtime::{half_frustum_height, BoundaryQuery, ConfinerRuntime, Lens};
pub use shrinkable::{ShrinkablePoint, ShrinkablePolygon, StateId};
