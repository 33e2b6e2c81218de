use crate::error::{GeometryError, Result};
use crate::math::{distance_xy, Point3, TOLERANCE};

use super::{Room, RoomId};

/// One end of a corridor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub point: Point3,
    /// The room this end opens into, if any.
    pub room: Option<RoomId>,
}

impl Endpoint {
    /// An end that opens into `room` at `point`.
    #[must_use]
    pub fn room(point: Point3, room: RoomId) -> Self {
        Self {
            point,
            room: Some(room),
        }
    }

    /// A dangling end that opens into nothing.
    #[must_use]
    pub fn open(point: Point3) -> Self {
        Self { point, room: None }
    }

    /// A tail end does not enter a room and needs a rounded cap.
    #[must_use]
    pub fn is_tail(&self) -> bool {
        self.room.is_none()
    }
}

/// A straight corridor of constant width.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    start: Endpoint,
    end: Endpoint,
    width: f64,
    weight: f64,
}

impl Corridor {
    /// Creates a corridor between two endpoints. Its weight is the
    /// centreline length.
    ///
    /// # Errors
    ///
    /// Returns an error if the width is not positive.
    pub fn new(start: Endpoint, end: Endpoint, width: f64) -> Result<Self> {
        check_width(width)?;
        Ok(Self {
            start,
            end,
            width,
            weight: distance_xy(&start.point, &end.point),
        })
    }

    /// Creates a corridor running centre to centre between two rooms. Both
    /// ends are terminal; its weight is the wall-to-wall gap.
    ///
    /// # Errors
    ///
    /// Returns an error if the width is not positive.
    pub fn between(a: &Room, b: &Room, width: f64) -> Result<Self> {
        check_width(width)?;
        Ok(Self {
            start: Endpoint::room(*a.position(), a.id()),
            end: Endpoint::room(*b.position(), b.id()),
            width,
            weight: a.gap_to(b),
        })
    }

    #[must_use]
    pub fn start(&self) -> &Endpoint {
        &self.start
    }

    #[must_use]
    pub fn end(&self) -> &Endpoint {
        &self.end
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Centreline length on the XY plane.
    #[must_use]
    pub fn length(&self) -> f64 {
        distance_xy(&self.start.point, &self.end.point)
    }
}

fn check_width(width: f64) -> Result<()> {
    if !width.is_finite() || width < TOLERANCE {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "corridor width",
            value: width,
            min: TOLERANCE,
            max: f64::INFINITY,
        }
        .into());
    }
    Ok(())
}
