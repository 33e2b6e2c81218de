use std::ops::RangeInclusive;

use crate::error::{GridError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Side;

/// Dimensions and placement of a two-tier grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// World position of the grid's top-left corner. Its Z is the floor height.
    pub anchor: Point3,
    /// Edge length of one contour cell.
    pub cell_size: f64,
    /// Sectors per side.
    pub sectors: usize,
    /// Cells per side within one sector.
    pub cells_per_sector: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            anchor: Point3::new(-32.0, 32.0, 0.0),
            cell_size: 1.0,
            sectors: 4,
            cells_per_sector: 16,
        }
    }
}

/// Address of a sector within the coarse grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectorAddress {
    pub row: usize,
    pub col: usize,
}

/// Address of a cell: its sector plus its local row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub sector: SectorAddress,
    pub row: usize,
    pub col: usize,
}

/// Address of a cell flattened across sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalCell {
    pub row: usize,
    pub col: usize,
}

/// An inclusive block of global cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub rows: RangeInclusive<usize>,
    pub cols: RangeInclusive<usize>,
}

impl CellRange {
    /// Iterates the block row by row.
    pub fn iter(&self) -> impl Iterator<Item = GlobalCell> + '_ {
        self.rows
            .clone()
            .flat_map(move |row| self.cols.clone().map(move |col| GlobalCell { row, col }))
    }
}

/// Pure addressing for a grid of `sectors × sectors` sectors, each holding
/// `cells_per_sector × cells_per_sector` cells.
///
/// `row` runs along +X and `col` runs along −Y (downward on screen). Cell
/// lookups never fail: positions outside the grid saturate to the nearest
/// edge cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGrid {
    anchor: Point3,
    cell_size: f64,
    sectors: usize,
    cells_per_sector: usize,
}

#[allow(clippy::cast_precision_loss)]
impl SpatialGrid {
    /// Creates the addressing scheme for a grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell size is not positive or either count is zero.
    pub fn new(config: &GridConfig) -> Result<Self> {
        if !config.cell_size.is_finite() || config.cell_size < TOLERANCE {
            return Err(GridError::InvalidDimensions(format!(
                "cell size must be positive, got {}",
                config.cell_size
            ))
            .into());
        }
        if config.sectors == 0 || config.cells_per_sector == 0 {
            return Err(GridError::InvalidDimensions(format!(
                "need at least one sector and one cell per sector, got {} x {}",
                config.sectors, config.cells_per_sector
            ))
            .into());
        }
        Ok(Self {
            anchor: config.anchor,
            cell_size: config.cell_size,
            sectors: config.sectors,
            cells_per_sector: config.cells_per_sector,
        })
    }

    #[must_use]
    pub fn anchor(&self) -> &Point3 {
        &self.anchor
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[must_use]
    pub fn sectors(&self) -> usize {
        self.sectors
    }

    #[must_use]
    pub fn cells_per_sector(&self) -> usize {
        self.cells_per_sector
    }

    /// Cells along one side of the whole grid.
    #[must_use]
    pub fn cells_per_side(&self) -> usize {
        self.sectors * self.cells_per_sector
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells_per_side() * self.cells_per_side()
    }

    /// Total number of sectors.
    #[must_use]
    pub fn sector_count(&self) -> usize {
        self.sectors * self.sectors
    }

    /// Centre of the top-left cell; the reference point for lookups.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        let half = self.cell_size * 0.5;
        self.anchor + Vector3::new(half, -half, 0.0)
    }

    /// Centre of the top-left cell of `sector`.
    #[must_use]
    pub fn sector_origin(&self, sector: SectorAddress) -> Point3 {
        let span = self.sector_span();
        self.origin() + Vector3::new(sector.row as f64 * span, -(sector.col as f64) * span, 0.0)
    }

    /// The sector containing `p`, saturated into range.
    #[must_use]
    pub fn locate_sector(&self, p: &Point3) -> SectorAddress {
        let o = self.origin();
        let half = self.cell_size * 0.5;
        let span = self.sector_span();
        SectorAddress {
            row: saturate((p.x - o.x + half) / span, self.sectors),
            col: saturate((o.y - p.y + half) / span, self.sectors),
        }
    }

    /// The cell containing `p`: sector lookup, then a local lookup relative
    /// to that sector's own top-left cell. Saturates into range.
    #[must_use]
    pub fn locate(&self, p: &Point3) -> CellAddress {
        let sector = self.locate_sector(p);
        let o = self.sector_origin(sector);
        let half = self.cell_size * 0.5;
        CellAddress {
            sector,
            row: saturate((p.x - o.x + half) / self.cell_size, self.cells_per_sector),
            col: saturate((o.y - p.y + half) / self.cell_size, self.cells_per_sector),
        }
    }

    /// Same as [`locate`](Self::locate), flattened across sectors.
    #[must_use]
    pub fn locate_global(&self, p: &Point3) -> GlobalCell {
        self.to_global(&self.locate(p))
    }

    /// Flattens a sector-relative address.
    #[must_use]
    pub fn to_global(&self, cell: &CellAddress) -> GlobalCell {
        GlobalCell {
            row: cell.sector.row * self.cells_per_sector + cell.row,
            col: cell.sector.col * self.cells_per_sector + cell.col,
        }
    }

    /// Splits a global address into sector and local parts, or `None` if
    /// it lies outside the grid.
    #[must_use]
    pub fn to_local(&self, cell: GlobalCell) -> Option<CellAddress> {
        let n = self.cells_per_side();
        if cell.row >= n || cell.col >= n {
            return None;
        }
        let c = self.cells_per_sector;
        Some(CellAddress {
            sector: SectorAddress {
                row: cell.row / c,
                col: cell.col / c,
            },
            row: cell.row % c,
            col: cell.col % c,
        })
    }

    /// Position of the cell's centre.
    #[must_use]
    pub fn cell_center(&self, cell: &CellAddress) -> Point3 {
        let g = self.to_global(cell);
        self.origin()
            + Vector3::new(
                g.row as f64 * self.cell_size,
                -(g.col as f64) * self.cell_size,
                0.0,
            )
    }

    /// Position of lattice node `(i, j)`; `i` runs along +X, `j` along −Y.
    #[must_use]
    pub fn lattice_position(&self, i: usize, j: usize) -> Point3 {
        self.anchor + Vector3::new(i as f64 * self.cell_size, -(j as f64) * self.cell_size, 0.0)
    }

    /// Storage index of a cell in `[sector_row][sector_col][row][col]` order.
    #[must_use]
    pub fn index(&self, cell: &CellAddress) -> usize {
        let c = self.cells_per_sector;
        ((cell.sector.row * self.sectors + cell.sector.col) * c + cell.row) * c + cell.col
    }

    /// Ordinal of `sector` in storage order.
    #[must_use]
    pub fn sector_index(&self, sector: SectorAddress) -> usize {
        sector.row * self.sectors + sector.col
    }

    /// The cell across `side`, crossing into the neighbouring sector when
    /// needed. `None` past the grid border.
    #[must_use]
    pub fn neighbor(&self, cell: &CellAddress, side: Side) -> Option<CellAddress> {
        let g = self.to_global(cell);
        let (row, col) = match side {
            Side::Left => (g.row.checked_sub(1)?, g.col),
            Side::Right => (g.row + 1, g.col),
            Side::Top => (g.row, g.col.checked_sub(1)?),
            Side::Bottom => (g.row, g.col + 1),
        };
        self.to_local(GlobalCell { row, col })
    }

    /// Global cells overlapping the axis-aligned box `min..max`, grown by
    /// one cell on every side so cells touching the box only at a corner
    /// are included. Saturates into range.
    #[must_use]
    pub fn range(&self, min: &Point3, max: &Point3) -> CellRange {
        let top_left = self.locate_global(&Point3::new(min.x, max.y, min.z));
        let bottom_right = self.locate_global(&Point3::new(max.x, min.y, min.z));
        let last = self.cells_per_side() - 1;
        CellRange {
            rows: top_left.row.saturating_sub(1)..=(bottom_right.row + 1).min(last),
            cols: top_left.col.saturating_sub(1)..=(bottom_right.col + 1).min(last),
        }
    }

    /// All sectors in storage order.
    pub fn sector_addresses(&self) -> impl Iterator<Item = SectorAddress> {
        let n = self.sectors;
        (0..n).flat_map(move |row| (0..n).map(move |col| SectorAddress { row, col }))
    }

    /// All cells of `sector` in storage order.
    pub fn cells_of(&self, sector: SectorAddress) -> impl Iterator<Item = CellAddress> {
        let n = self.cells_per_sector;
        (0..n).flat_map(move |row| (0..n).map(move |col| CellAddress { sector, row, col }))
    }

    /// All cells in storage order.
    pub fn cell_addresses(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.sector_addresses()
            .flat_map(move |sector| self.cells_of(sector))
    }

    fn sector_span(&self) -> f64 {
        self.cells_per_sector as f64 * self.cell_size
    }
}

/// `clamp(floor(v), 0, n - 1)`; NaN lands on 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturate(v: f64, n: usize) -> usize {
    let floor = v.floor();
    if floor <= 0.0 || floor.is_nan() {
        0
    } else {
        (floor as usize).min(n - 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 6 × 6 unit cells spanning [-3, 3]², as 2 × 2 sectors of 3 × 3 cells.
    fn six_by_six() -> SpatialGrid {
        SpatialGrid::new(&GridConfig {
            anchor: Point3::new(-3.0, 3.0, 0.0),
            cell_size: 1.0,
            sectors: 2,
            cells_per_sector: 3,
        })
        .unwrap()
    }

    #[test]
    fn rejects_bad_dimensions() {
        let bad_size = GridConfig {
            cell_size: 0.0,
            ..GridConfig::default()
        };
        assert!(SpatialGrid::new(&bad_size).is_err());
        let no_sectors = GridConfig {
            sectors: 0,
            ..GridConfig::default()
        };
        assert!(SpatialGrid::new(&no_sectors).is_err());
    }

    #[test]
    fn locate_inside_grid() {
        let g = six_by_six();
        let cell = g.locate(&Point3::new(-2.5, 2.5, 0.0));
        assert_eq!(cell.sector, SectorAddress { row: 0, col: 0 });
        assert_eq!((cell.row, cell.col), (0, 0));

        // x = 1.2 falls in the 5th cell along X, y = -0.4 in the 4th cell down.
        let cell = g.locate(&Point3::new(1.2, -0.4, 0.0));
        assert_eq!(cell.sector, SectorAddress { row: 1, col: 1 });
        assert_eq!((cell.row, cell.col), (1, 0));
        assert_eq!(g.to_global(&cell), GlobalCell { row: 4, col: 3 });
    }

    #[test]
    fn locate_saturates_out_of_range() {
        let g = six_by_six();
        let far = g.locate_global(&Point3::new(100.0, -100.0, 0.0));
        assert_eq!(far, GlobalCell { row: 5, col: 5 });
        let before = g.locate_global(&Point3::new(-100.0, 100.0, 0.0));
        assert_eq!(before, GlobalCell { row: 0, col: 0 });
        let nan = g.locate_global(&Point3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(nan.row, 0);
    }

    #[test]
    fn center_round_trips_through_locate() {
        let g = six_by_six();
        for cell in g.cell_addresses() {
            assert_eq!(g.locate(&g.cell_center(&cell)), cell);
        }
    }

    #[test]
    fn lattice_matches_cell_corners() {
        let g = six_by_six();
        let cell = g.to_local(GlobalCell { row: 2, col: 4 }).unwrap();
        let c = g.cell_center(&cell);
        let tl = g.lattice_position(2, 4);
        assert!((tl.x - (c.x - 0.5)).abs() < TOLERANCE);
        assert!((tl.y - (c.y + 0.5)).abs() < TOLERANCE);
    }

    #[test]
    fn neighbor_crosses_sector_seam() {
        let g = six_by_six();
        let edge = CellAddress {
            sector: SectorAddress { row: 0, col: 0 },
            row: 2,
            col: 1,
        };
        let right = g.neighbor(&edge, Side::Right).unwrap();
        assert_eq!(right.sector, SectorAddress { row: 1, col: 0 });
        assert_eq!((right.row, right.col), (0, 1));
        assert!(g
            .neighbor(
                &CellAddress {
                    sector: SectorAddress { row: 0, col: 0 },
                    row: 0,
                    col: 0,
                },
                Side::Top,
            )
            .is_none());
    }

    #[test]
    fn storage_index_is_dense() {
        let g = six_by_six();
        let indices: Vec<usize> = g.cell_addresses().map(|c| g.index(&c)).collect();
        assert_eq!(indices, (0..g.cell_count()).collect::<Vec<_>>());
    }

    #[test]
    fn range_grows_and_clamps() {
        let g = six_by_six();
        let r = g.range(&Point3::new(-0.5, -0.5, 0.0), &Point3::new(0.5, 0.5, 0.0));
        assert_eq!(r.rows, 1..=4);
        assert_eq!(r.cols, 1..=4);
        let all = g.range(&Point3::new(-10.0, -10.0, 0.0), &Point3::new(10.0, 10.0, 0.0));
        assert_eq!(all.iter().count(), 36);
    }
}
