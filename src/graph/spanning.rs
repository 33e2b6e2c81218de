use std::cmp::Ordering;
use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::geometry::RoomId;

use super::{CandidateGraph, DisjointSet, Edge};

/// Result of Kruskal's algorithm over a candidate graph: the accepted tree
/// edges plus every candidate that would have closed a loop.
#[derive(Debug, Clone, Default)]
pub struct SpanningForest {
    rooms: Vec<RoomId>,
    edges: Vec<Edge>,
    rejected: Vec<Edge>,
}

impl SpanningForest {
    /// Runs Kruskal's algorithm over the candidates found so far.
    ///
    /// Candidates are taken in ascending weight order, ties kept in
    /// evaluation order. A disconnected candidate graph yields a forest
    /// with fewer than `rooms - 1` edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a candidate names a room outside the graph.
    pub fn kruskal(graph: &CandidateGraph) -> Result<Self> {
        let rooms: Vec<RoomId> = graph.rooms().iter().map(|r| r.id()).collect();
        let mut sorted = graph.edges().to_vec();
        sorted.sort_by(|x, y| x.weight.partial_cmp(&y.weight).unwrap_or(Ordering::Equal));

        let mut sets = DisjointSet::with_elements(rooms.iter().copied());
        let mut edges = Vec::with_capacity(rooms.len().saturating_sub(1));
        let mut rejected = Vec::new();
        for edge in sorted {
            if sets.merge(&edge.a, &edge.b)? {
                edges.push(edge);
            } else {
                rejected.push(edge);
            }
        }

        let forest = Self {
            rooms,
            edges,
            rejected,
        };
        if forest.is_connected() {
            debug!(
                edges = forest.edges.len(),
                rejected = forest.rejected.len(),
                weight = forest.total_weight(),
                "built spanning tree"
            );
        } else {
            warn!(
                components = sets.set_count(),
                edges = forest.edges.len(),
                "candidate graph is disconnected"
            );
        }
        Ok(forest)
    }

    /// Accepted tree edges in ascending weight order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Candidates that would have closed a loop, ascending by weight unless
    /// shuffled.
    #[must_use]
    pub fn rejected(&self) -> &[Edge] {
        &self.rejected
    }

    #[must_use]
    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Sum of accepted edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Whether the tree reaches every room.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.edges.len() + 1 >= self.rooms.len()
    }

    /// Reorders the rejected list so extra loops are drawn at random rather
    /// than shortest first.
    pub fn shuffle_rejected<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.rejected.shuffle(rng);
    }

    /// Tree edges plus the first `floor(fraction × rejected)` rejected
    /// edges, which become redundant loops.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidLoopFraction`] if `fraction` is outside `[0, 1]`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn with_loops(&self, fraction: f64) -> Result<Vec<Edge>> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(GraphError::InvalidLoopFraction(fraction).into());
        }
        let extra = (fraction * self.rejected.len() as f64).floor() as usize;
        let mut all = self.edges.clone();
        all.extend_from_slice(&self.rejected[..extra]);
        Ok(all)
    }

    /// Rooms grouped by tree connectivity, each group in room order and the
    /// groups ordered by their first room.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge names an unknown room.
    pub fn components(&self) -> Result<Vec<Vec<RoomId>>> {
        let mut sets = DisjointSet::with_elements(self.rooms.iter().copied());
        for edge in &self.edges {
            sets.merge(&edge.a, &edge.b)?;
        }
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<RoomId>> = Vec::new();
        for &room in &self.rooms {
            let root = sets.find(&room)?;
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(room);
        }
        Ok(groups)
    }

    /// Rooms the tree does not connect to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownElement`] if `root` is not in the graph.
    pub fn unreachable_from(&self, root: RoomId) -> Result<Vec<RoomId>> {
        let components = self.components()?;
        let home = components
            .iter()
            .position(|group| group.contains(&root))
            .ok_or_else(|| GraphError::UnknownElement(format!("{root:?}")))?;
        Ok(components
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != home)
            .flat_map(|(_, group)| group)
            .collect())
    }
}
