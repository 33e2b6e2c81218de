use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::grid::{
    CellAddress, ContourCell, ContourGrid, CornerId, Node, SectorAddress, Side, Surface,
};

use super::{SectorMesh, TriangleMesh};

/// Extracts per-sector triangle buffers from a rasterized [`ContourGrid`].
///
/// Every solid cell emits the polygons of its contour state as triangle
/// fans. Floors wind counter-clockwise seen from +Z. With walls enabled the
/// same polygons are lifted into a ceiling with the opposite winding and
/// vertical quads close every open side, facing the filled interior.
/// `invert` flips the winding of all three.
#[derive(Debug, Clone, Copy)]
pub struct ExtractMesh {
    invert: bool,
    wall_height: Option<f64>,
}

impl ExtractMesh {
    /// Creates a floor-only extraction.
    #[must_use]
    pub fn new(invert: bool) -> Self {
        Self {
            invert,
            wall_height: None,
        }
    }

    /// Adds a ceiling `height` above the floor and the walls between them.
    #[must_use]
    pub fn with_walls(mut self, height: f64) -> Self {
        self.wall_height = Some(height);
        self
    }

    /// Extracts every sector in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall height is not positive or the grid
    /// refers to a missing corner.
    pub fn execute(&self, grid: &mut ContourGrid) -> Result<Vec<SectorMesh>> {
        let sectors: Vec<SectorAddress> = grid.layout().sector_addresses().collect();
        sectors
            .into_iter()
            .map(|sector| self.execute_sector(grid, sector))
            .collect()
    }

    /// Extracts one sector. Vertices on the sector border are shared with
    /// the neighbouring sectors by position, not by buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall height is not positive or the grid
    /// refers to a missing corner.
    pub fn execute_sector(
        &self,
        grid: &mut ContourGrid,
        sector: SectorAddress,
    ) -> Result<SectorMesh> {
        if let Some(height) = self.wall_height {
            if !height.is_finite() || height <= 0.0 {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter: "wall height",
                    value: height,
                    min: 0.0,
                    max: f64::INFINITY,
                }
                .into());
            }
        }

        let addresses: Vec<CellAddress> = grid.layout().cells_of(sector).collect();
        let mut solid = Vec::with_capacity(addresses.len());
        for address in &addresses {
            let cell = grid.cell(address)?.clone();
            for id in node_ids(&cell) {
                grid.corner_mut(id)?.reset_vertices();
            }
            if cell.is_solid() {
                solid.push((*address, cell));
            }
        }

        let mut emitter = Emitter {
            sector: grid.layout().sector_index(sector),
            grid,
            mesh: TriangleMesh::default(),
        };

        for (_, cell) in &solid {
            emitter.polygons(cell, Surface::Floor, 0.0, self.invert)?;
        }
        let floor = 0..emitter.mesh.indices.len();

        let mut ceiling = floor.end..floor.end;
        let mut walls = floor.end..floor.end;
        if let Some(height) = self.wall_height {
            for (_, cell) in &solid {
                emitter.polygons(cell, Surface::Ceiling, height, !self.invert)?;
            }
            ceiling.end = emitter.mesh.indices.len();

            walls = ceiling.end..ceiling.end;
            for (address, cell) in &solid {
                for (a, b) in wall_segments(emitter.grid, address, cell)? {
                    emitter.wall(cell.node(a), cell.node(b), height, self.invert)?;
                }
            }
            walls.end = emitter.mesh.indices.len();
        }

        debug!(
            ?sector,
            cells = solid.len(),
            vertices = emitter.mesh.vertices.len(),
            triangles = emitter.mesh.indices.len(),
            "extracted sector mesh"
        );
        Ok(SectorMesh {
            sector,
            mesh: emitter.mesh,
            floor,
            ceiling,
            walls,
        })
    }
}

/// Writes triangles for one sector buffer.
struct Emitter<'a> {
    grid: &'a mut ContourGrid,
    sector: usize,
    mesh: TriangleMesh,
}

impl Emitter<'_> {
    fn vertex(&mut self, id: CornerId, surface: Surface, lift: f64) -> Result<u32> {
        let corner = self.grid.corner_mut(id)?;
        Ok(corner.assign_vertex(surface, self.sector, lift, &mut self.mesh.vertices))
    }

    fn triangle(&mut self, [a, b, c]: [u32; 3], flip: bool) {
        self.mesh.indices.push(if flip { [a, c, b] } else { [a, b, c] });
    }

    /// Fans every contour polygon of `cell`.
    fn polygons(
        &mut self,
        cell: &ContourCell,
        surface: Surface,
        lift: f64,
        flip: bool,
    ) -> Result<()> {
        for polygon in cell.state().polygons() {
            let ids = polygon
                .iter()
                .map(|&node| self.vertex(cell.node(node), surface, lift))
                .collect::<Result<Vec<u32>>>()?;
            for k in 1..ids.len() - 1 {
                self.triangle([ids[0], ids[k], ids[k + 1]], flip);
            }
        }
        Ok(())
    }

    /// A vertical quad over the floor segment `a → b`, which has the
    /// interior on its left.
    fn wall(&mut self, a: CornerId, b: CornerId, height: f64, flip: bool) -> Result<()> {
        let a_floor = self.vertex(a, Surface::Floor, 0.0)?;
        let b_floor = self.vertex(b, Surface::Floor, 0.0)?;
        let a_ceiling = self.vertex(a, Surface::Ceiling, height)?;
        let b_ceiling = self.vertex(b, Surface::Ceiling, height)?;
        self.triangle([a_floor, b_ceiling, b_floor], flip);
        self.triangle([a_floor, a_ceiling, b_ceiling], flip);
        Ok(())
    }
}

fn node_ids(cell: &ContourCell) -> impl Iterator<Item = CornerId> + '_ {
    cell.corners()
        .into_iter()
        .chain(Side::ALL.into_iter().map(|side| cell.edge(side)))
}

/// Floor segments of `cell` that need a wall, each directed with the
/// cell's filled part on its left.
///
/// A side facing an open neighbour (past the border, unfilled or reserved)
/// is walled where the cell is filled along it: the whole side when both
/// its corners are inside, up to the crossing when one is. The contour of a
/// mixed cell always bounds the floor, so it is always walled.
fn wall_segments(
    grid: &ContourGrid,
    address: &CellAddress,
    cell: &ContourCell,
) -> Result<Vec<(Node, Node)>> {
    let state = cell.state();
    let mut segments = Vec::new();
    for side in Side::ALL {
        let open = match grid.layout().neighbor(address, side) {
            None => true,
            Some(neighbor) => !grid.cell(&neighbor)?.is_solid(),
        };
        if !open {
            continue;
        }
        let (a, b) = side.ccw_endpoints();
        match (state.contains(a), state.contains(b)) {
            (true, true) => segments.push((a, b)),
            (true, false) => segments.push((a, side.node())),
            (false, true) => segments.push((side.node(), b)),
            (false, false) => {}
        }
    }

    if !state.is_pure() {
        for polygon in state.polygons() {
            for (k, &p) in polygon.iter().enumerate() {
                let q = polygon[(k + 1) % polygon.len()];
                if p.is_edge() && q.is_edge() {
                    segments.push((p, q));
                }
            }
        }
    }
    Ok(segments)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::f64::consts::PI;

    use super::*;
    use crate::geometry::{Circle, Quad, Shape};
    use crate::grid::{GlobalCell, GridConfig, SpatialGrid};
    use crate::math::polygon_2d::signed_area_2d;
    use crate::math::{Point3, Vector3};
    use crate::raster::FillShape;

    /// 2 × 2 sectors of 2 × 2 unit cells spanning [-2, 2]².
    fn grid() -> ContourGrid {
        ContourGrid::new(
            SpatialGrid::new(&GridConfig {
                anchor: Point3::new(-2.0, 2.0, 0.0),
                cell_size: 1.0,
                sectors: 2,
                cells_per_sector: 2,
            })
            .unwrap(),
        )
    }

    fn fill_everything(g: &mut ContourGrid) {
        let cover: Shape = Quad::from_rectangle(Point3::origin(), 10.0, 10.0, 0.0).unwrap().into();
        FillShape::new(cover).execute(g).unwrap();
    }

    fn area(t: &[Point3; 3]) -> f64 {
        signed_area_2d(t)
    }

    fn normal(t: &[Point3; 3]) -> Vector3 {
        (t[1] - t[0]).cross(&(t[2] - t[0]))
    }

    fn key(p: &Point3) -> (u64, u64, u64) {
        (p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
    }

    #[test]
    fn full_sector_shares_every_vertex() {
        let mut g = grid();
        fill_everything(&mut g);
        let meshes = ExtractMesh::new(false).execute(&mut g).unwrap();
        assert_eq!(meshes.len(), 4);
        for sector in &meshes {
            assert_eq!(sector.mesh.vertices.len(), 9);
            assert_eq!(sector.floor.len(), 8);
            let unique: HashSet<_> = sector.mesh.vertices.iter().map(key).collect();
            assert_eq!(unique.len(), 9);
            assert!(sector.ceiling.is_empty() && sector.walls.is_empty());
        }
    }

    #[test]
    fn floors_wind_counter_clockwise() {
        let mut g = grid();
        FillShape::new(Circle::new(Point3::new(0.2, -0.1, 0.0), 1.7).unwrap().into())
            .execute(&mut g)
            .unwrap();
        let meshes = ExtractMesh::new(false).execute(&mut g).unwrap();
        let mut count = 0;
        for t in meshes.iter().flat_map(SectorMesh::floor_triangles) {
            assert!(area(&t) > 0.0);
            count += 1;
        }
        assert!(count > 0);
    }

    #[test]
    fn invert_flips_the_floor() {
        let mut g = grid();
        fill_everything(&mut g);
        let meshes = ExtractMesh::new(true).execute(&mut g).unwrap();
        assert!(meshes
            .iter()
            .flat_map(SectorMesh::floor_triangles)
            .all(|t| area(&t) < 0.0));
    }

    #[test]
    fn extraction_can_run_twice() {
        let mut g = grid();
        fill_everything(&mut g);
        let first = ExtractMesh::new(false).execute(&mut g).unwrap();
        let second = ExtractMesh::new(false).execute(&mut g).unwrap();
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.mesh.vertices, b.mesh.vertices);
            assert_eq!(a.mesh.indices, b.mesh.indices);
        }
    }

    #[test]
    fn seam_vertices_match_across_sectors() {
        let mut g = grid();
        FillShape::new(Circle::new(Point3::new(0.1, 0.3, 0.0), 1.6).unwrap().into())
            .execute(&mut g)
            .unwrap();
        let meshes = ExtractMesh::new(false).execute(&mut g).unwrap();
        let left = meshes
            .iter()
            .find(|m| m.sector == SectorAddress { row: 0, col: 0 })
            .unwrap();
        let right = meshes
            .iter()
            .find(|m| m.sector == SectorAddress { row: 1, col: 0 })
            .unwrap();
        let on_seam = |m: &SectorMesh| -> HashSet<_> {
            m.mesh
                .vertices
                .iter()
                .filter(|p| p.x.abs() < 1e-12)
                .map(key)
                .collect()
        };
        let seam = on_seam(left);
        assert!(!seam.is_empty());
        assert_eq!(seam, on_seam(right));
    }

    #[test]
    fn walls_close_the_grid_border() {
        let mut g = grid();
        fill_everything(&mut g);
        let meshes = ExtractMesh::new(false).with_walls(2.0).execute(&mut g).unwrap();
        for sector in &meshes {
            // Floor and ceiling lattices; walls reuse their vertices.
            assert_eq!(sector.mesh.vertices.len(), 18);
            assert_eq!(sector.ceiling.len(), 8);
            // Each corner sector has two border cells on each of two sides.
            assert_eq!(sector.walls.len(), 8);
            for t in sector.ceiling_triangles() {
                assert!(area(&t) < 0.0);
                assert!(t.iter().all(|p| (p.z - 2.0).abs() < 1e-12));
            }
        }
    }

    #[test]
    fn walls_face_the_interior() {
        let mut g = grid();
        fill_everything(&mut g);
        let meshes = ExtractMesh::new(false).with_walls(1.5).execute(&mut g).unwrap();
        let mut count = 0;
        for t in meshes.iter().flat_map(SectorMesh::wall_triangles) {
            let n = normal(&t);
            assert!(n.z.abs() < 1e-12);
            let centroid = (t[0].coords + t[1].coords + t[2].coords) / 3.0;
            let inward = Vector3::new(-centroid.x, -centroid.y, 0.0);
            assert!(n.dot(&inward) > 0.0);
            count += 1;
        }
        assert_eq!(count, 32);
    }

    #[test]
    fn inverted_walls_face_outward() {
        let mut g = grid();
        fill_everything(&mut g);
        let meshes = ExtractMesh::new(true).with_walls(1.0).execute(&mut g).unwrap();
        for t in meshes.iter().flat_map(SectorMesh::wall_triangles) {
            let centroid = (t[0].coords + t[1].coords + t[2].coords) / 3.0;
            let inward = Vector3::new(-centroid.x, -centroid.y, 0.0);
            assert!(normal(&t).dot(&inward) < 0.0);
        }
    }

    #[test]
    fn reserved_cells_stay_open_and_walled() {
        let mut g = grid();
        let hole = g.layout().to_local(GlobalCell { row: 1, col: 1 }).unwrap();
        let index = g.layout().index(&hole);
        g.cell_mut_at(index).unwrap().reserve();
        fill_everything(&mut g);

        let sector = ExtractMesh::new(false)
            .with_walls(1.0)
            .execute_sector(&mut g, hole.sector)
            .unwrap();
        // Three of four cells emit floor.
        assert_eq!(sector.floor.len(), 6);
        // Four border segments plus the two sides facing the hole.
        assert_eq!(sector.walls.len(), 12);
    }

    #[test]
    fn circle_floor_area_is_close() {
        let mut g = ContourGrid::new(
            SpatialGrid::new(&GridConfig {
                anchor: Point3::new(-2.0, 2.0, 0.0),
                cell_size: 0.5,
                sectors: 2,
                cells_per_sector: 4,
            })
            .unwrap(),
        );
        let r = 1.5;
        FillShape::new(Circle::new(Point3::origin(), r).unwrap().into())
            .execute(&mut g)
            .unwrap();
        let meshes = ExtractMesh::new(false).with_walls(1.0).execute(&mut g).unwrap();
        let total: f64 = meshes
            .iter()
            .flat_map(SectorMesh::floor_triangles)
            .map(|t| area(&t))
            .sum();
        let exact = PI * r * r;
        assert!(total <= exact + 1e-9);
        assert!(total > 0.9 * exact);
        // The contour is walled all the way round.
        assert!(meshes.iter().map(|m| m.walls.len()).sum::<usize>() > 0);
    }

    #[test]
    fn non_positive_wall_height_is_error() {
        let mut g = grid();
        assert!(ExtractMesh::new(false).with_walls(0.0).execute(&mut g).is_err());
    }
}
