mod fill_corridor;
mod fill_shape;
mod occupancy;

pub use fill_corridor::FillCorridor;
pub use fill_shape::FillShape;
pub use occupancy::{MarkShape, ReserveShape};

use std::cmp::Ordering;

use crate::error::Result;
use crate::geometry::Shape;
use crate::grid::{ContourGrid, ContourState, Node, ShapeId, Side, Transition};
use crate::math::intersect_2d::point_at;
use crate::math::{distance_xy, Point3, Vector3, EDGE_TOLERANCE_FACTOR, TOLERANCE};

const CORNER_NODES: [Node; 4] = [
    Node::TopLeft,
    Node::TopRight,
    Node::BottomLeft,
    Node::BottomRight,
];

/// Tally of what a rasterization pass did to the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Cells that took the shape with boundary detail.
    pub filled: usize,
    /// Cells demoted to full occupancy by a second shape.
    pub demoted: usize,
    /// Reserved cells that refused the shape.
    pub rejected: usize,
}

impl FillReport {
    /// Adds another report's counts to this one.
    pub fn merge(&mut self, other: &Self) {
        self.filled += other.filled;
        self.demoted += other.demoted;
        self.rejected += other.rejected;
    }
}

/// Slack for boundary crossings that land just outside a cell edge.
fn edge_tolerance(grid: &ContourGrid) -> f64 {
    grid.layout().cell_size() * EDGE_TOLERANCE_FACTOR
}

/// Which of the cell's lattice corners lie inside any of `parts`.
fn corners_inside(grid: &ContourGrid, index: usize, parts: &[Shape]) -> Result<ContourState> {
    let cell = &grid.cells()[index];
    let mut inside = [false; 4];
    for (flag, node) in inside.iter_mut().zip(CORNER_NODES) {
        let p = grid.node_position(cell, node)?;
        *flag = parts.iter().any(|shape| shape.contains(&p));
    }
    Ok(ContourState::from_corners(inside))
}

/// Where the union of `parts` stops covering the side `a → b`, walking
/// from its inside endpoint towards its outside one.
///
/// The result depends only on the side's two lattice positions, so both
/// cells sharing the side get the same point.
fn union_crossing(parts: &[Shape], a: &Point3, b: &Point3, tolerance: f64) -> Option<Point3> {
    let (from, to) = if parts.iter().any(|shape| shape.contains(a)) {
        (a, b)
    } else {
        (b, a)
    };
    let length = distance_xy(from, to);
    if length < TOLERANCE {
        return None;
    }
    let slack = tolerance / length;

    let mut spans: Vec<(f64, f64)> = parts
        .iter()
        .filter_map(|shape| shape.span(from, to, tolerance))
        .collect();
    spans.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(Ordering::Equal));

    let mut reach: Option<f64> = None;
    for (start, end) in spans {
        let limit = reach.unwrap_or(0.0) + slack;
        if start > limit {
            break;
        }
        reach = Some(reach.map_or(end, |r| r.max(end)));
    }
    let dir = Vector3::new(to.x - from.x, to.y - from.y, 0.0);
    reach.map(|t| point_at(from, &dir, t.clamp(0.0, 1.0)))
}

/// Offers one cell to the footprint `parts` on behalf of `owner` and
/// records the outcome.
fn rasterize_cell(
    grid: &mut ContourGrid,
    index: usize,
    parts: &[Shape],
    owner: ShapeId,
    report: &mut FillReport,
) -> Result<()> {
    let Some(first) = parts.first() else {
        return Ok(());
    };
    let z = first.elevation();
    let inside = corners_inside(grid, index, parts)?;
    let transition = grid.cell_mut_at(index)?.apply(inside, owner);
    let cell = grid.cells()[index].clone();

    match transition {
        Transition::Rejected => {
            report.rejected += 1;
            return Ok(());
        }
        Transition::Untouched => return Ok(()),
        Transition::Demoted => report.demoted += 1,
        Transition::Detailed => report.filled += 1,
    }

    for node in CORNER_NODES {
        let corner = grid.corner_mut(cell.node(node))?;
        if inside.contains(node) {
            corner.fill();
            corner.set_height(z);
        } else if transition == Transition::Demoted {
            // A demoted cell emits all four corners.
            corner.fill();
        }
    }

    let state = cell.state();
    if transition == Transition::Detailed && !state.is_pure() {
        let tolerance = edge_tolerance(grid);
        for side in Side::ALL {
            let (a, b) = side.endpoints();
            if state.contains(a) == state.contains(b) {
                continue;
            }
            let a = grid.node_position(&cell, a)?;
            let b = grid.node_position(&cell, b)?;
            if let Some(hit) = union_crossing(parts, &a, &b, tolerance) {
                let edge = grid.corner_mut(cell.edge(side))?;
                edge.set_position(Point3::new(hit.x, hit.y, z));
                edge.fill();
            }
        }
    }
    Ok(())
}

/// Storage indices of cells with at least one lattice corner inside `shape`.
fn touched_cells(grid: &ContourGrid, shape: &Shape) -> Result<Vec<usize>> {
    let layout = grid.layout();
    let (min, max) = shape.bounds();
    let mut touched = Vec::new();
    for global in layout.range(&min, &max).iter() {
        let Some(address) = layout.to_local(global) else {
            continue;
        };
        let index = layout.index(&address);
        if corners_inside(grid, index, std::slice::from_ref(shape))? != ContourState::EMPTY {
            touched.push(index);
        }
    }
    Ok(touched)
}
