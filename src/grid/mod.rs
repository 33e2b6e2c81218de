mod cell;
mod corner;
mod layout;

pub use cell::{ContourCell, ContourKind, ContourState, Node, ShapeId, Side, Transition};
pub use corner::{Corner, CornerId, Surface};
pub use layout::{CellAddress, CellRange, GlobalCell, GridConfig, SectorAddress, SpatialGrid};

use slotmap::SlotMap;

use crate::error::{GridError, Result};
use crate::math::Point3;

/// The occupancy grid: addressing, every corner, and every contour cell.
///
/// Corners live in an arena and cells refer to them by [`CornerId`]. Cells
/// touching the same lattice point (including across a sector seam) hold
/// the same id, so a position refined once is seen by all of them.
#[derive(Debug, Clone)]
pub struct ContourGrid {
    layout: SpatialGrid,
    corners: SlotMap<CornerId, Corner>,
    lattice: Vec<CornerId>,
    cells: Vec<ContourCell>,
    next_shape: u32,
}

impl ContourGrid {
    /// Builds every corner and cell for `layout`.
    #[must_use]
    pub fn new(layout: SpatialGrid) -> Self {
        let n = layout.cells_per_side();
        let mut corners = SlotMap::with_capacity_and_key((n + 1) * (n + 1) + 4 * n * n);

        let mut lattice = Vec::with_capacity((n + 1) * (n + 1));
        for i in 0..=n {
            for j in 0..=n {
                lattice.push(corners.insert(Corner::new(layout.lattice_position(i, j))));
            }
        }
        let node = |i: usize, j: usize| lattice[i * (n + 1) + j];

        let mut cells = Vec::with_capacity(layout.cell_count());
        for address in layout.cell_addresses() {
            let g = layout.to_global(&address);
            let ids = [
                node(g.row, g.col),
                node(g.row + 1, g.col),
                node(g.row, g.col + 1),
                node(g.row + 1, g.col + 1),
            ];
            let mut edge = |a: usize, b: usize| {
                let mid = midpoint(corners[ids[a]].position(), corners[ids[b]].position());
                corners.insert(Corner::new(mid))
            };
            // Top, Bottom, Left, Right.
            let edges = [edge(0, 1), edge(2, 3), edge(0, 2), edge(1, 3)];
            cells.push(ContourCell::new(ids, edges));
        }

        Self {
            layout,
            corners,
            lattice,
            cells,
            next_shape: 0,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &SpatialGrid {
        &self.layout
    }

    /// All cells in `[sector_row][sector_col][row][col]` storage order.
    #[must_use]
    pub fn cells(&self) -> &[ContourCell] {
        &self.cells
    }

    /// Returns the cell at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address lies outside the grid.
    pub fn cell(&self, address: &CellAddress) -> Result<&ContourCell> {
        let index = self.checked_index(address)?;
        Ok(&self.cells[index])
    }

    /// Returns the cell at a flattened address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address lies outside the grid.
    pub fn cell_at(&self, cell: GlobalCell) -> Result<&ContourCell> {
        let address = self
            .layout
            .to_local(cell)
            .ok_or(GridError::CellOutOfRange {
                row: cell.row,
                col: cell.col,
            })?;
        self.cell(&address)
    }

    pub(crate) fn cell_mut_at(&mut self, index: usize) -> Result<&mut ContourCell> {
        self.cells.get_mut(index).ok_or_else(|| {
            GridError::InvalidDimensions(format!("cell index {index} out of bounds")).into()
        })
    }

    /// Returns the corner behind `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this grid.
    pub fn corner(&self, id: CornerId) -> Result<&Corner> {
        self.corners
            .get(id)
            .ok_or_else(|| GridError::CornerNotFound.into())
    }

    /// Returns the corner behind `id` mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this grid.
    pub fn corner_mut(&mut self, id: CornerId) -> Result<&mut Corner> {
        self.corners
            .get_mut(id)
            .ok_or_else(|| GridError::CornerNotFound.into())
    }

    /// The shared lattice corner at node `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node lies outside the lattice.
    pub fn lattice_corner(&self, i: usize, j: usize) -> Result<CornerId> {
        let n = self.layout.cells_per_side();
        if i > n || j > n {
            return Err(GridError::CellOutOfRange { row: i, col: j }.into());
        }
        Ok(self.lattice[i * (n + 1) + j])
    }

    /// Position of `node` in `cell`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell refers to a missing corner.
    pub fn node_position(&self, cell: &ContourCell, node: Node) -> Result<Point3> {
        Ok(*self.corner(cell.node(node))?.position())
    }

    /// Hands out a fresh identity for the next rasterized shape.
    pub fn allocate_shape(&mut self) -> ShapeId {
        let id = ShapeId(self.next_shape);
        self.next_shape += 1;
        id
    }

    /// Addresses of cells that carry occupancy.
    pub fn filled_cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.addresses_where(ContourCell::is_filled)
    }

    /// Addresses of cells excluded from filling.
    pub fn reserved_cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.addresses_where(ContourCell::is_reserved)
    }

    /// Addresses of cells flagged for retention.
    pub fn marked_cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.addresses_where(ContourCell::is_marked)
    }

    /// Clears every cell that is not marked, returning how many were cleared.
    ///
    /// Corner fill flags are rebuilt from the surviving cells and edge
    /// corners of cleared cells go back to their edge midpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if a cell refers to a missing corner.
    pub fn retain_marked(&mut self) -> Result<usize> {
        let mut cleared = 0;
        for index in 0..self.cells.len() {
            let cell = &self.cells[index];
            if cell.is_marked() || !cell.is_filled() {
                continue;
            }
            let cell = cell.clone();
            for side in Side::ALL {
                let (a, b) = side.endpoints();
                let mid = midpoint(
                    &self.node_position(&cell, a)?,
                    &self.node_position(&cell, b)?,
                );
                let edge = self.corner_mut(cell.edge(side))?;
                edge.set_position(mid);
                edge.clear();
            }
            self.cells[index].clear();
            cleared += 1;
        }

        for corner in self.corners.values_mut() {
            corner.clear();
        }
        for index in 0..self.cells.len() {
            let cell = self.cells[index].clone();
            if !cell.is_filled() {
                continue;
            }
            let state = cell.state();
            for node in [Node::TopLeft, Node::TopRight, Node::BottomLeft, Node::BottomRight] {
                if state.contains(node) {
                    self.corner_mut(cell.node(node))?.fill();
                }
            }
            if !state.is_pure() {
                for side in Side::ALL {
                    let (a, b) = side.endpoints();
                    if state.contains(a) != state.contains(b) {
                        self.corner_mut(cell.edge(side))?.fill();
                    }
                }
            }
        }
        Ok(cleared)
    }

    /// A fresh grid with the same layout for the next floor. Cells that were
    /// reserved or marked here start out reserved there.
    #[must_use]
    pub fn next_layer(&self) -> Self {
        let mut next = Self::new(self.layout.clone());
        for (mine, theirs) in self.cells.iter().zip(next.cells.iter_mut()) {
            if mine.is_reserved() || mine.is_marked() {
                theirs.reserve();
            }
        }
        next
    }

    fn checked_index(&self, address: &CellAddress) -> Result<usize> {
        let c = self.layout.cells_per_sector();
        let s = self.layout.sectors();
        if address.sector.row >= s
            || address.sector.col >= s
            || address.row >= c
            || address.col >= c
        {
            let g = self.layout.to_global(address);
            return Err(GridError::CellOutOfRange {
                row: g.row,
                col: g.col,
            }
            .into());
        }
        Ok(self.layout.index(address))
    }

    fn addresses_where(
        &self,
        keep: fn(&ContourCell) -> bool,
    ) -> impl Iterator<Item = CellAddress> + '_ {
        self.layout
            .cell_addresses()
            .zip(self.cells.iter())
            .filter(move |(_, cell)| keep(cell))
            .map(|(address, _)| address)
    }
}

fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    Point3::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5, (a.z + b.z) * 0.5)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid() -> ContourGrid {
        ContourGrid::new(
            SpatialGrid::new(&GridConfig {
                anchor: Point3::new(-3.0, 3.0, 0.0),
                cell_size: 1.0,
                sectors: 2,
                cells_per_sector: 3,
            })
            .unwrap(),
        )
    }

    fn at(grid: &ContourGrid, row: usize, col: usize) -> &ContourCell {
        grid.cell_at(GlobalCell { row, col }).unwrap()
    }

    #[test]
    fn horizontal_neighbours_share_corners() {
        let g = grid();
        let a = at(&g, 1, 1);
        let b = at(&g, 2, 1);
        assert_eq!(a.node(Node::TopRight), b.node(Node::TopLeft));
        assert_eq!(a.node(Node::BottomRight), b.node(Node::BottomLeft));
    }

    #[test]
    fn vertical_neighbours_share_corners() {
        let g = grid();
        let a = at(&g, 4, 0);
        let b = at(&g, 4, 1);
        assert_eq!(a.node(Node::BottomLeft), b.node(Node::TopLeft));
        assert_eq!(a.node(Node::BottomRight), b.node(Node::TopRight));
    }

    #[test]
    fn corners_shared_across_sector_seam() {
        let g = grid();
        // Global rows 2 and 3 sit in different sectors.
        let a = at(&g, 2, 4);
        let b = at(&g, 3, 4);
        assert_eq!(a.node(Node::TopRight), b.node(Node::TopLeft));
        assert_eq!(
            g.layout().to_local(GlobalCell { row: 2, col: 4 }).unwrap().sector,
            SectorAddress { row: 0, col: 1 }
        );
        assert_eq!(
            g.layout().to_local(GlobalCell { row: 3, col: 4 }).unwrap().sector,
            SectorAddress { row: 1, col: 1 }
        );
    }

    #[test]
    fn edge_corners_are_private_midpoints() {
        let g = grid();
        let a = at(&g, 1, 1);
        let b = at(&g, 2, 1);
        assert_ne!(a.edge(Side::Right), b.edge(Side::Left));
        let p = g.node_position(a, Node::Right).unwrap();
        let q = g.node_position(b, Node::Left).unwrap();
        assert!((p - q).norm() < 1e-12);
        let tr = g.node_position(a, Node::TopRight).unwrap();
        assert!((p.y - (tr.y - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn lattice_lookup_matches_cells() {
        let g = grid();
        let a = at(&g, 4, 2);
        assert_eq!(g.lattice_corner(4, 2).unwrap(), a.node(Node::TopLeft));
        assert_eq!(g.lattice_corner(5, 3).unwrap(), a.node(Node::BottomRight));
        assert!(g.lattice_corner(7, 0).is_err());
    }

    #[test]
    fn out_of_range_cell_is_error() {
        let g = grid();
        assert!(g.cell_at(GlobalCell { row: 6, col: 0 }).is_err());
        let bad = CellAddress {
            sector: SectorAddress { row: 0, col: 0 },
            row: 3,
            col: 0,
        };
        assert!(g.cell(&bad).is_err());
    }

    #[test]
    fn shape_ids_are_unique() {
        let mut g = grid();
        let a = g.allocate_shape();
        let b = g.allocate_shape();
        assert_ne!(a, b);
    }

    #[test]
    fn next_layer_reserves_marked_and_reserved() {
        let mut g = grid();
        g.cells[0].reserve();
        g.cells[5].mark();
        let next = g.next_layer();
        let reserved: Vec<_> = next.reserved_cells().collect();
        assert_eq!(reserved.len(), 2);
        assert!(next.cells[0].is_reserved());
        assert!(next.cells[5].is_reserved());
        assert_eq!(next.filled_cells().count(), 0);
    }
}
