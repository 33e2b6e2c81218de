use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{Circle, Corridor, Quad, Shape};
use crate::grid::{ContourGrid, GlobalCell};
use crate::math::intersect_2d::point_at;
use crate::math::polygon_2d::{left_normal, segment_direction};

use super::{rasterize_cell, touched_cells, FillReport};

/// Rasterizes a corridor by sweeping its centreline.
///
/// Samples the corridor one cell apart along the centreline and across its
/// width, offering each sample's cell and its eight neighbours to the
/// corridor exactly once. Tail ends get a half-width round cap; body and
/// caps form a single footprint, so boundary crossings follow their union.
#[derive(Debug)]
pub struct FillCorridor {
    corridor: Corridor,
}

impl FillCorridor {
    /// Creates a new corridor fill.
    #[must_use]
    pub fn new(corridor: Corridor) -> Self {
        Self { corridor }
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the centreline has zero length.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    pub fn execute(&self, grid: &mut ContourGrid) -> Result<FillReport> {
        let start = self.corridor.start().point;
        let end = self.corridor.end().point;
        let width = self.corridor.width();
        let dir = segment_direction(&start, &end).inspect_err(|e| {
            warn!(error = %e, "skipping degenerate corridor");
        })?;
        let across = left_normal(dir);
        let mut parts: Vec<Shape> = vec![Quad::from_segment(&start, &end, width)?.into()];
        for endpoint in [self.corridor.start(), self.corridor.end()] {
            if endpoint.is_tail() {
                parts.push(Circle::new(endpoint.point, width * 0.5)?.into());
            }
        }
        let owner = grid.allocate_shape();

        let cell_size = grid.layout().cell_size();
        let last = grid.layout().cells_per_side() as isize - 1;
        let length = self.corridor.length();
        let t_step = cell_size / length;
        let w_step = cell_size / width;
        let along_samples = (length / cell_size).ceil() as usize;
        let across_samples = (width / cell_size).ceil() as usize;

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for i in 0..=along_samples {
            let t = (i as f64 * t_step).min(1.0) * length;
            let on_line = point_at(&start, &dir, t);
            for j in 0..=across_samples {
                let u = ((j as f64 * w_step).min(1.0) - 0.5) * width;
                let sample = point_at(&on_line, &across, u);
                let centre = grid.layout().locate_global(&sample);
                for dr in -1..=1_isize {
                    for dc in -1..=1_isize {
                        let row = centre.row as isize + dr;
                        let col = centre.col as isize + dc;
                        if row < 0 || col < 0 || row > last || col > last {
                            continue;
                        }
                        let global = GlobalCell {
                            row: row as usize,
                            col: col as usize,
                        };
                        let Some(address) = grid.layout().to_local(global) else {
                            continue;
                        };
                        let index = grid.layout().index(&address);
                        if visited.insert(index) {
                            order.push(index);
                        }
                    }
                }
            }
        }
        for cap in &parts[1..] {
            for index in touched_cells(grid, cap)? {
                if visited.insert(index) {
                    order.push(index);
                }
            }
        }

        // Body and caps go down as one footprint, each cell once.
        let mut report = FillReport::default();
        for index in order {
            rasterize_cell(grid, index, &parts, owner, &mut report)?;
        }
        debug!(?owner, cells = visited.len(), ?report, "filled corridor");
        Ok(report)
    }
}
