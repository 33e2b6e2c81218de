use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::{GenerationError, GraphError, Result};
use crate::geometry::{Corridor, Room, RoomId};
use crate::graph::{CandidateGraph, ObstructionQuery, SpanningForest};
use crate::grid::{ContourGrid, SectorAddress, SpatialGrid};
use crate::raster::{FillCorridor, FillShape};
use crate::tessellation::{ExtractMesh, SectorMesh};

use super::{GenerationConfig, Level, Phase, Step};

/// Drives one generation run in small increments.
///
/// Each [`step`](Self::step) does one unit of work and hands control back,
/// so a host can spread a run over frames. Dropping the generator between
/// steps abandons the run.
#[derive(Debug)]
pub struct Generator<Q> {
    config: GenerationConfig,
    query: Q,
    phase: Option<Phase>,
    candidates: CandidateGraph,
    connected: bool,
    forest: SpanningForest,
    corridors: Vec<Corridor>,
    grid: ContourGrid,
    rooms_done: usize,
    corridors_done: usize,
    sectors: Vec<SectorAddress>,
    meshes: Vec<SectorMesh>,
}

impl<Q: ObstructionQuery> Generator<Q> {
    /// Prepares a run over `rooms`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or two rooms share an id.
    pub fn new(config: GenerationConfig, rooms: &[Room], query: Q) -> Result<Self> {
        config.validate()?;
        let layout = SpatialGrid::new(&config.grid)?;
        let sectors = layout.sector_addresses().collect();
        let candidates = CandidateGraph::plan(rooms, config.corridor_width, config.candidate_mode)?;
        info!(rooms = rooms.len(), cells = layout.cell_count(), "starting generation");
        Ok(Self {
            config,
            query,
            phase: Some(Phase::Candidates),
            candidates,
            connected: false,
            forest: SpanningForest::default(),
            corridors: Vec::new(),
            grid: ContourGrid::new(layout),
            rooms_done: 0,
            corridors_done: 0,
            sectors,
            meshes: Vec::new(),
        })
    }

    /// The phase being worked on, or `None` once finished.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// The grid as rasterized so far.
    #[must_use]
    pub fn grid(&self) -> &ContourGrid {
        &self.grid
    }

    /// Advances by one increment.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::AlreadyFinished`] once [`Step::Finished`]
    /// has been returned, or any error from the increment itself.
    pub fn step(&mut self) -> Result<Step> {
        loop {
            let Some(phase) = self.phase else {
                return Err(GenerationError::AlreadyFinished.into());
            };
            if let Some((completed, total)) = self.advance(phase)? {
                debug!(?phase, completed, total, "generation step");
                return Ok(Step::Progress {
                    phase,
                    completed,
                    total,
                });
            }
            self.phase = next_phase(phase);
            match self.phase {
                Some(next) => info!(?next, "entering phase"),
                None => {
                    let triangles: usize =
                        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum();
                    info!(
                        corridors = self.corridors.len(),
                        filled = self.grid.filled_cells().count(),
                        triangles,
                        "generation finished"
                    );
                    return Ok(Step::Finished);
                }
            }
        }
    }

    /// Drives the run to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any step.
    pub fn run(mut self) -> Result<Level> {
        while self.phase.is_some() {
            self.step()?;
        }
        Ok(Level {
            grid: self.grid,
            forest: self.forest,
            corridors: self.corridors,
            meshes: self.meshes,
        })
    }

    /// Does one unit of `phase`, returning `(completed, total)`, or `None`
    /// when the phase has no work left.
    fn advance(&mut self, phase: Phase) -> Result<Option<(usize, usize)>> {
        match phase {
            Phase::Candidates => {
                let total = self.candidates.row_count();
                Ok(self
                    .candidates
                    .evaluate_next(&self.query)
                    .map(|_| (self.candidates.evaluated_rows(), total)))
            }
            Phase::SpanningTree => {
                if self.connected {
                    return Ok(None);
                }
                self.connect()?;
                self.connected = true;
                Ok(Some((1, 1)))
            }
            Phase::Rooms => {
                let total = self.candidates.rooms().len();
                let Some(room) = self.candidates.rooms().get(self.rooms_done) else {
                    return Ok(None);
                };
                FillShape::new(room.footprint().clone()).execute(&mut self.grid)?;
                self.rooms_done += 1;
                Ok(Some((self.rooms_done, total)))
            }
            Phase::Corridors => {
                let total = self.corridors.len();
                let Some(corridor) = self.corridors.get(self.corridors_done) else {
                    return Ok(None);
                };
                FillCorridor::new(corridor.clone()).execute(&mut self.grid)?;
                self.corridors_done += 1;
                Ok(Some((self.corridors_done, total)))
            }
            Phase::Mesh => {
                let total = self.sectors.len();
                let Some(&sector) = self.sectors.get(self.meshes.len()) else {
                    return Ok(None);
                };
                let mut extract = ExtractMesh::new(self.config.invert_triangles);
                if self.config.extrude_walls {
                    extract = extract.with_walls(self.config.wall_height);
                }
                let mesh = extract.execute_sector(&mut self.grid, sector)?;
                self.meshes.push(mesh);
                Ok(Some((self.meshes.len(), total)))
            }
        }
    }

    /// Builds the spanning forest and turns its edges, plus the extra loops,
    /// into corridors.
    fn connect(&mut self) -> Result<()> {
        let mut forest = SpanningForest::kruskal(&self.candidates)?;
        if let Some(seed) = self.config.shuffle_seed {
            forest.shuffle_rejected(&mut ChaCha8Rng::seed_from_u64(seed));
        }
        let edges = forest.with_loops(self.config.extra_loop_fraction)?;

        let rooms: HashMap<RoomId, &Room> =
            self.candidates.rooms().iter().map(|r| (r.id(), r)).collect();
        let lookup = |id: RoomId| {
            rooms
                .get(&id)
                .copied()
                .ok_or_else(|| GraphError::UnknownElement(format!("{id:?}")))
        };
        let mut corridors = Vec::with_capacity(edges.len());
        for edge in &edges {
            corridors.push(Corridor::between(
                lookup(edge.a)?,
                lookup(edge.b)?,
                self.config.corridor_width,
            )?);
        }
        debug!(
            tree = forest.edges().len(),
            loops = edges.len() - forest.edges().len(),
            "selected corridors"
        );
        self.forest = forest;
        self.corridors = corridors;
        Ok(())
    }
}

fn next_phase(phase: Phase) -> Option<Phase> {
    match phase {
        Phase::Candidates => Some(Phase::SpanningTree),
        Phase::SpanningTree => Some(Phase::Rooms),
        Phase::Rooms => Some(Phase::Corridors),
        Phase::Corridors => Some(Phase::Mesh),
        Phase::Mesh => None,
    }
}
