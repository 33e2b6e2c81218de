use crate::math::{Point3, Vector3};

slotmap::new_key_type! {
    /// Unique identifier for a corner in a [`ContourGrid`](super::ContourGrid).
    pub struct CornerId;
}

/// Which extruded surface a vertex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Floor,
    Ceiling,
}

impl Surface {
    fn slot(self) -> usize {
        match self {
            Self::Floor => 0,
            Self::Ceiling => 1,
        }
    }
}

/// A cached vertex index together with the sector buffer it points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VertexSlot {
    sector: usize,
    index: u32,
}

/// A boundary point of one or more contour cells.
///
/// Lattice corners are shared by every cell (and sector) that touches
/// them; edge corners belong to a single cell.
#[derive(Debug, Clone)]
pub struct Corner {
    position: Point3,
    filled: bool,
    vertices: [Option<VertexSlot>; 2],
}

impl Corner {
    /// Creates an unfilled corner at `position`.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            filled: false,
            vertices: [None; 2],
        }
    }

    #[must_use]
    pub fn position(&self) -> &Point3 {
        &self.position
    }

    /// Moves the corner, e.g. onto a shape boundary.
    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
    }

    /// Sets the corner's floor height.
    pub fn set_height(&mut self, z: f64) {
        self.position.z = z;
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn fill(&mut self) {
        self.filled = true;
    }

    pub(crate) fn clear(&mut self) {
        self.filled = false;
    }

    /// Returns this corner's vertex index in the `sector` buffer for
    /// `surface`, appending the position (raised by `lift`) on first use.
    ///
    /// Repeated calls for the same surface and sector return the cached
    /// index without touching `vertices`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn assign_vertex(
        &mut self,
        surface: Surface,
        sector: usize,
        lift: f64,
        vertices: &mut Vec<Point3>,
    ) -> u32 {
        let slot = &mut self.vertices[surface.slot()];
        if let Some(cached) = *slot {
            if cached.sector == sector {
                return cached.index;
            }
        }
        let index = vertices.len() as u32;
        vertices.push(self.position + Vector3::new(0.0, 0.0, lift));
        *slot = Some(VertexSlot { sector, index });
        index
    }

    /// The cached vertex index for `surface` in `sector`, if assigned.
    #[must_use]
    pub fn vertex_index(&self, surface: Surface, sector: usize) -> Option<u32> {
        self.vertices[surface.slot()]
            .filter(|s| s.sector == sector)
            .map(|s| s.index)
    }

    /// Forgets all cached vertex indices.
    pub fn reset_vertices(&mut self) {
        self.vertices = [None; 2];
    }
}
