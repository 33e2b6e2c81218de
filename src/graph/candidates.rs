use std::collections::{HashMap, HashSet};

use spade::{DelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};
use tracing::debug;

use crate::error::{GenerationError, GraphError, Result};
use crate::geometry::{Room, RoomId};

use super::obstruction::{is_clear, ObstructionQuery};

/// A potential corridor between two rooms, weighted by the gap between
/// their walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: RoomId,
    pub b: RoomId,
    pub weight: f64,
}

/// Which room pairs are offered to the obstruction query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateMode {
    /// Every unordered pair.
    #[default]
    Complete,
    /// Only pairs adjacent in the Delaunay triangulation of room centres.
    Delaunay,
}

/// Obstruction-pruned candidate edges between rooms.
///
/// Pairs are grouped into rows by their lower room index and evaluated one
/// row at a time, so a driver can interleave the queries with other work.
#[derive(Debug, Clone)]
pub struct CandidateGraph {
    rooms: Vec<Room>,
    rows: Vec<Vec<usize>>,
    width: f64,
    evaluated: usize,
    edges: Vec<Edge>,
}

impl CandidateGraph {
    /// Plans which pairs to test for a corridor of `width`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateRoom`] if two rooms share an id, or a
    /// triangulation error in [`CandidateMode::Delaunay`].
    pub fn plan(rooms: &[Room], width: f64, mode: CandidateMode) -> Result<Self> {
        let mut seen = HashSet::new();
        for room in rooms {
            if !seen.insert(room.id()) {
                return Err(GraphError::DuplicateRoom(room.id()).into());
            }
        }
        let rows = match mode {
            CandidateMode::Delaunay if rooms.len() >= 3 => delaunay_rows(rooms)?,
            _ => complete_rows(rooms.len()),
        };
        let pairs: usize = rows.iter().map(Vec::len).sum();
        debug!(rooms = rooms.len(), pairs, ?mode, "planned candidate pairs");
        Ok(Self {
            rooms: rooms.to_vec(),
            rows,
            width,
            evaluated: 0,
            edges: Vec::new(),
        })
    }

    /// Plans and evaluates every pair in one go.
    ///
    /// # Errors
    ///
    /// See [`CandidateGraph::plan`].
    pub fn build<Q: ObstructionQuery + ?Sized>(
        rooms: &[Room],
        query: &Q,
        width: f64,
        mode: CandidateMode,
    ) -> Result<Self> {
        let mut graph = Self::plan(rooms, width, mode)?;
        while graph.evaluate_next(query).is_some() {}
        Ok(graph)
    }

    /// Evaluates the next row of pairs. Returns the number of candidates it
    /// added, or `None` once every row is done.
    pub fn evaluate_next<Q: ObstructionQuery + ?Sized>(&mut self, query: &Q) -> Option<usize> {
        let row = self.rows.get(self.evaluated)?;
        let a = &self.rooms[self.evaluated];
        let before = self.edges.len();
        for &j in row {
            let b = &self.rooms[j];
            if is_clear(query, a, b, self.width) {
                self.edges.push(Edge {
                    a: a.id(),
                    b: b.id(),
                    weight: a.gap_to(b),
                });
            }
        }
        self.evaluated += 1;
        Some(self.edges.len() - before)
    }

    /// Number of rows, one per room.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows evaluated so far.
    #[must_use]
    pub fn evaluated_rows(&self) -> usize {
        self.evaluated
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.evaluated == self.rows.len()
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Candidates found so far, in evaluation order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

fn complete_rows(n: usize) -> Vec<Vec<usize>> {
    (0..n).map(|i| (i + 1..n).collect()).collect()
}

/// Pairs from the Delaunay triangulation of room centres. Rooms sharing a
/// centre collapse onto one vertex; each of them inherits its neighbours.
fn delaunay_rows(rooms: &[Room]) -> Result<Vec<Vec<usize>>> {
    let mut dt = DelaunayTriangulation::<SpadePoint2<f64>>::new();
    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, room) in rooms.iter().enumerate() {
        let p = room.position();
        let handle = dt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| GenerationError::Triangulation(format!("{e}")))?;
        members.entry(handle.index()).or_default().push(i);
    }

    let mut pairs = HashSet::new();
    for group in members.values() {
        for (k, &i) in group.iter().enumerate() {
            for &j in &group[k + 1..] {
                pairs.insert((i.min(j), i.max(j)));
            }
        }
    }
    for edge in dt.undirected_edges() {
        let [u, v] = edge.vertices();
        let (Some(us), Some(vs)) = (members.get(&u.fix().index()), members.get(&v.fix().index()))
        else {
            continue;
        };
        for &i in us {
            for &j in vs {
                pairs.insert((i.min(j), i.max(j)));
            }
        }
    }

    let mut rows = vec![Vec::new(); rooms.len()];
    for (i, j) in pairs {
        rows[i].push(j);
    }
    for row in &mut rows {
        row.sort_unstable();
    }
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::ShapeObstruction;
    use crate::math::Point3;

    fn square() -> Vec<Room> {
        [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Room::circle(i, Point3::new(x, y, 0.0), 1.0).unwrap())
            .collect()
    }

    #[test]
    fn square_has_six_candidates() {
        let rooms = square();
        let graph = CandidateGraph::build(
            &rooms,
            &ShapeObstruction::new(&rooms),
            1.0,
            CandidateMode::Complete,
        )
        .unwrap();
        assert_eq!(graph.edges().len(), 6);
        let sides = graph.edges().iter().filter(|e| (e.weight - 8.0).abs() < 1e-9).count();
        assert_eq!(sides, 4);
        let diagonal = 200.0_f64.sqrt() - 2.0;
        let diagonals = graph
            .edges()
            .iter()
            .filter(|e| (e.weight - diagonal).abs() < 1e-9)
            .count();
        assert_eq!(diagonals, 2);
    }

    #[test]
    fn blocked_pair_is_not_a_candidate() {
        let rooms: Vec<Room> = [0.0, 5.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &x)| Room::circle(i, Point3::new(x, 0.0, 0.0), 1.0).unwrap())
            .collect();
        let graph = CandidateGraph::build(
            &rooms,
            &ShapeObstruction::new(&rooms),
            1.0,
            CandidateMode::Complete,
        )
        .unwrap();
        let pairs: Vec<_> = graph.edges().iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(pairs, vec![(RoomId(0), RoomId(1)), (RoomId(1), RoomId(2))]);
    }

    #[test]
    fn rows_evaluate_one_at_a_time() {
        let rooms = square();
        let query = ShapeObstruction::new(&rooms);
        let mut graph = CandidateGraph::plan(&rooms, 1.0, CandidateMode::Complete).unwrap();
        assert_eq!(graph.row_count(), 4);
        assert_eq!(graph.evaluate_next(&query), Some(3));
        assert_eq!(graph.evaluate_next(&query), Some(2));
        assert_eq!(graph.evaluate_next(&query), Some(1));
        assert_eq!(graph.evaluate_next(&query), Some(0));
        assert!(graph.is_complete());
        assert_eq!(graph.evaluate_next(&query), None);
    }

    #[test]
    fn delaunay_drops_long_pairs() {
        // A 3 × 3 lattice: the triangulation never links opposite corners.
        let rooms: Vec<Room> = (0..9)
            .map(|i| {
                let x = f64::from(u8::try_from(i % 3).unwrap()) * 10.0;
                let y = f64::from(u8::try_from(i / 3).unwrap()) * 10.0;
                Room::circle(i, Point3::new(x, y, 0.0), 1.0).unwrap()
            })
            .collect();
        let never_blocked = |_: &Point3, _: &Point3, _: RoomId, _: RoomId| -> usize { 0 };
        let complete =
            CandidateGraph::build(&rooms, &never_blocked, 1.0, CandidateMode::Complete).unwrap();
        let delaunay =
            CandidateGraph::build(&rooms, &never_blocked, 1.0, CandidateMode::Delaunay).unwrap();
        assert_eq!(complete.edges().len(), 36);
        assert!(delaunay.edges().len() < complete.edges().len());
        assert!(!delaunay
            .edges()
            .iter()
            .any(|e| (e.a, e.b) == (RoomId(0), RoomId(8))));
        // Every lattice neighbour is still offered.
        assert!(delaunay
            .edges()
            .iter()
            .any(|e| (e.a, e.b) == (RoomId(0), RoomId(1))));
    }

    #[test]
    fn small_delaunay_falls_back_to_complete() {
        let rooms = &square()[..2];
        let never_blocked = |_: &Point3, _: &Point3, _: RoomId, _: RoomId| -> usize { 0 };
        let graph =
            CandidateGraph::build(rooms, &never_blocked, 1.0, CandidateMode::Delaunay).unwrap();
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut rooms = square();
        rooms.push(Room::circle(2, Point3::new(20.0, 0.0, 0.0), 1.0).unwrap());
        assert!(CandidateGraph::plan(&rooms, 1.0, CandidateMode::Complete).is_err());
    }
}
