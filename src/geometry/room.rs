use std::fmt;

use crate::error::Result;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Circle, Quad, Shape};

/// Identity of a room as assigned by the placement collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub usize);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape parameters of a room, relative to its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoomShape {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64, rotation: f64 },
}

/// A placed room. Read-only input to layout and rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: RoomId,
    position: Point3,
    shape: RoomShape,
    footprint: Shape,
}

impl Room {
    /// Creates a room and resolves its footprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape parameters are degenerate.
    pub fn new(id: RoomId, position: Point3, shape: RoomShape) -> Result<Self> {
        let footprint: Shape = match shape {
            RoomShape::Circle { radius } => Circle::new(position, radius)?.into(),
            RoomShape::Rectangle {
                width,
                height,
                rotation,
            } => Quad::from_rectangle(position, width, height, rotation)?.into(),
        };
        Ok(Self {
            id,
            position,
            shape,
            footprint,
        })
    }

    /// Shorthand for a circular room.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn circle(id: usize, position: Point3, radius: f64) -> Result<Self> {
        Self::new(RoomId(id), position, RoomShape::Circle { radius })
    }

    /// Shorthand for a rectangular room.
    ///
    /// # Errors
    ///
    /// Returns an error if either extent is not positive.
    pub fn rectangle(
        id: usize,
        position: Point3,
        width: f64,
        height: f64,
        rotation: f64,
    ) -> Result<Self> {
        Self::new(
            RoomId(id),
            position,
            RoomShape::Rectangle {
                width,
                height,
                rotation,
            },
        )
    }

    #[must_use]
    pub fn id(&self) -> RoomId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> &Point3 {
        &self.position
    }

    #[must_use]
    pub fn shape(&self) -> RoomShape {
        self.shape
    }

    /// The room's footprint as a rasterizable shape.
    #[must_use]
    pub fn footprint(&self) -> &Shape {
        &self.footprint
    }

    /// Distance from the room's centre to its wall along the unit direction `dir`.
    #[must_use]
    pub fn extent_along(&self, dir: &Vector3) -> f64 {
        self.footprint.extent_along(dir)
    }

    /// Wall-to-wall gap between two rooms along the line joining their
    /// centres. Negative when the footprints overlap.
    #[must_use]
    pub fn gap_to(&self, other: &Self) -> f64 {
        let delta = Vector3::new(
            other.position.x - self.position.x,
            other.position.y - self.position.y,
            0.0,
        );
        let distance = delta.norm();
        if distance < TOLERANCE {
            return -(self.extent_along(&Vector3::x()) + other.extent_along(&Vector3::x()));
        }
        let dir = delta / distance;
        distance - self.extent_along(&dir) - other.extent_along(&-dir)
    }
}
