mod config;
mod generator;

pub use config::GenerationConfig;
pub use generator::Generator;

use crate::geometry::Corridor;
use crate::graph::SpanningForest;
use crate::grid::ContourGrid;
use crate::tessellation::{SectorMesh, TriangleMesh};

/// Stages of a generation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Obstruction queries, one room's row of pairs per step.
    Candidates,
    /// Kruskal and loop selection, in a single step.
    SpanningTree,
    /// One room footprint per step.
    Rooms,
    /// One corridor per step.
    Corridors,
    /// One sector mesh per step.
    Mesh,
}

/// Outcome of one [`Generator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Progress {
        phase: Phase,
        completed: usize,
        total: usize,
    },
    Finished,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct Level {
    /// The occupancy grid, queryable by a follow-up layer pass.
    pub grid: ContourGrid,
    pub forest: SpanningForest,
    /// Tree corridors followed by the extra loops.
    pub corridors: Vec<Corridor>,
    pub meshes: Vec<SectorMesh>,
}

impl Level {
    /// All sector buffers folded into one mesh.
    #[must_use]
    pub fn combined_mesh(&self) -> TriangleMesh {
        let mut combined = TriangleMesh::default();
        for sector in &self.meshes {
            combined.merge(&sector.mesh);
        }
        combined
    }
}
