use tracing::debug;

use crate::error::Result;
use crate::geometry::Shape;
use crate::grid::ContourGrid;

use super::{rasterize_cell, FillReport};

/// Rasterizes a circle or box onto a [`ContourGrid`].
///
/// Walks every cell under the shape's bounding box, fills the cells with a
/// lattice corner inside the shape and moves their edge corners onto the
/// shape boundary.
#[derive(Debug)]
pub struct FillShape {
    shape: Shape,
}

impl FillShape {
    /// Creates a fill for a new, independent shape.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    /// Executes the fill.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid refers to a missing corner.
    pub fn execute(&self, grid: &mut ContourGrid) -> Result<FillReport> {
        let owner = grid.allocate_shape();
        let (min, max) = self.shape.bounds();
        let range = grid.layout().range(&min, &max);

        let mut report = FillReport::default();
        for global in range.iter() {
            let Some(address) = grid.layout().to_local(global) else {
                continue;
            };
            let index = grid.layout().index(&address);
            rasterize_cell(
                grid,
                index,
                std::slice::from_ref(&self.shape),
                owner,
                &mut report,
            )?;
        }
        debug!(?owner, ?report, "filled shape");
        Ok(report)
    }
}
