mod extract_mesh;

pub use extract_mesh::ExtractMesh;

use std::ops::Range;

use crate::grid::SectorAddress;
use crate::math::Point3;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Corner positions of triangle `i`, or `None` if `i` or one of its
    /// indices is out of range.
    #[must_use]
    pub fn triangle(&self, i: usize) -> Option<[Point3; 3]> {
        let [a, b, c] = *self.indices.get(i)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Appends `other`, re-basing its indices past this mesh's vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|t| t.map(|v| v + offset)));
    }
}

/// The buffers of one grid sector, ready for upload.
///
/// Triangles are grouped by surface; the ranges index into `mesh.indices`.
#[derive(Debug, Clone)]
pub struct SectorMesh {
    pub sector: SectorAddress,
    pub mesh: TriangleMesh,
    pub floor: Range<usize>,
    pub ceiling: Range<usize>,
    pub walls: Range<usize>,
}

impl SectorMesh {
    /// Floor triangles as corner positions.
    pub fn floor_triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.floor.clone().filter_map(|i| self.mesh.triangle(i))
    }

    /// Ceiling triangles as corner positions.
    pub fn ceiling_triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.ceiling.clone().filter_map(|i| self.mesh.triangle(i))
    }

    /// Wall triangles as corner positions.
    pub fn wall_triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.walls.clone().filter_map(|i| self.mesh.triangle(i))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn merge_rebases_indices() {
        let mut a = TriangleMesh {
            vertices: vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            indices: vec![[0, 1, 2]],
        };
        let b = a.clone();
        a.merge(&b);
        assert_eq!(a.vertices.len(), 6);
        assert_eq!(a.indices, vec![[0, 1, 2], [3, 4, 5]]);
        assert_eq!(a.triangle(1), b.triangle(0));
    }

    #[test]
    fn triangle_out_of_range_is_none() {
        let mesh = TriangleMesh {
            vertices: vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            indices: vec![[0, 1, 2]],
        };
        assert!(mesh.triangle(1).is_none());
        // Index 2 names a vertex that does not exist.
        assert!(mesh.triangle(0).is_none());
    }
}
