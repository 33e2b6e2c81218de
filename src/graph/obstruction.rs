use crate::geometry::{Room, RoomId};
use crate::math::intersect_2d::point_at;
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::Point3;

/// Counts what blocks a straight segment.
///
/// Stands in for whatever collision backend the host has. The two rooms in
/// `exclude` are the segment's own endpoints and never count as hits.
pub trait ObstructionQuery {
    /// Number of obstacles the segment `start → end` passes through.
    fn hit_count(&self, start: &Point3, end: &Point3, exclude: (RoomId, RoomId)) -> usize;
}

impl<F> ObstructionQuery for F
where
    F: Fn(&Point3, &Point3, RoomId, RoomId) -> usize,
{
    fn hit_count(&self, start: &Point3, end: &Point3, exclude: (RoomId, RoomId)) -> usize {
        self(start, end, exclude.0, exclude.1)
    }
}

/// Literal segment-versus-footprint tests over a room list.
#[derive(Debug, Clone, Copy)]
pub struct ShapeObstruction<'a> {
    rooms: &'a [Room],
}

impl<'a> ShapeObstruction<'a> {
    #[must_use]
    pub fn new(rooms: &'a [Room]) -> Self {
        Self { rooms }
    }
}

impl ObstructionQuery for ShapeObstruction<'_> {
    fn hit_count(&self, start: &Point3, end: &Point3, exclude: (RoomId, RoomId)) -> usize {
        self.rooms
            .iter()
            .filter(|room| room.id() != exclude.0 && room.id() != exclude.1)
            .filter(|room| room.footprint().touches_segment(start, end))
            .count()
    }
}

/// Whether a corridor of `width` fits between two rooms.
///
/// Casts the centreline offset half the width to either side; both rays must
/// come back clean. Coincident rooms never have a clear line.
pub fn is_clear<Q: ObstructionQuery + ?Sized>(query: &Q, a: &Room, b: &Room, width: f64) -> bool {
    let Ok(dir) = segment_direction(a.position(), b.position()) else {
        return false;
    };
    let offset = left_normal(dir);
    let exclude = (a.id(), b.id());
    [0.5 * width, -0.5 * width].iter().all(|&side| {
        let start = point_at(a.position(), &offset, side);
        let end = point_at(b.position(), &offset, side);
        query.hit_count(&start, &end, exclude) == 0
    })
}
