use thiserror::Error;

/// Top-level error type for confiner baking and queries.
#[derive(Debug, Error)]
pub enum ConfinerError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Bake(#[from] BakeError),
}

/// Errors related to input geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("contour {index} has {count} points, at least 3 are required")]
    TooFewPoints { index: usize, count: usize },

    #[error("contour {index} has no determinable winding (area {area})")]
    UndeterminedWinding { index: usize, area: f64 },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the bake process.
#[derive(Debug, Error)]
pub enum BakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("aspect ratio must be finite and positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("bake produced no confiner states")]
    Empty,

    #[error("no confiner has been baked")]
    NotBaked,
}

/// Convenience type alias for results using [`ConfinerError`].
pub type Result<T> = std::result::Result<T, ConfinerError>;
