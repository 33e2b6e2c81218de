use crate::error::Result;
use crate::geometry::Shape;
use crate::grid::ContourGrid;

use super::touched_cells;

/// Reserves every cell with a lattice corner inside a shape, keeping it
/// open against later fills (a corridor mouth, a stairwell).
#[derive(Debug)]
pub struct ReserveShape {
    shape: Shape,
}

impl ReserveShape {
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    /// Executes the reservation, returning how many cells were reserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid refers to a missing corner.
    pub fn execute(&self, grid: &mut ContourGrid) -> Result<usize> {
        let touched = touched_cells(grid, &self.shape)?;
        for &index in &touched {
            grid.cell_mut_at(index)?.reserve();
        }
        Ok(touched.len())
    }
}

/// Marks every cell with a lattice corner inside a shape for retention
/// when layers are stitched.
#[derive(Debug)]
pub struct MarkShape {
    shape: Shape,
}

impl MarkShape {
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    /// Executes the marking, returning how many cells were marked.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid refers to a missing corner.
    pub fn execute(&self, grid: &mut ContourGrid) -> Result<usize> {
        let touched = touched_cells(grid, &self.shape)?;
        for &index in &touched {
            grid.cell_mut_at(index)?.mark();
        }
        Ok(touched.len())
    }
}
