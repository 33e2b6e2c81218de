use thiserror::Error;

use crate::geometry::RoomId;

/// Top-level error type for the Crypta dungeon kernel.
#[derive(Debug, Error)]
pub enum CryptaError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to grid construction and cell access.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid grid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("cell ({row}, {col}) is outside the grid")]
    CellOutOfRange { row: usize, col: usize },

    #[error("corner not found in grid")]
    CornerNotFound,
}

/// Errors related to the connectivity graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown element: {0}")]
    UnknownElement(String),

    #[error("extra loop fraction {0} is outside [0, 1]")]
    InvalidLoopFraction(f64),

    #[error("room {0} appears more than once")]
    DuplicateRoom(RoomId),
}

/// Errors raised by the stepwise generation driver.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation already finished")]
    AlreadyFinished,

    #[error("candidate triangulation failed: {0}")]
    Triangulation(String),
}

/// Convenience type alias for results using [`CryptaError`].
pub type Result<T> = std::result::Result<T, CryptaError>;
