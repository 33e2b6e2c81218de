pub mod error;
pub mod generation;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod math;
pub mod raster;
pub mod tessellation;

pub use error::{CryptaError, Result};
