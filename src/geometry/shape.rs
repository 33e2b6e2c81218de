use crate::math::{Point3, Vector3};

use super::{Circle, Quad};

/// A fillable footprint: every rasterization, obstruction and extent query
/// goes through this one tagged variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Box(Quad),
}

impl Shape {
    /// Point-in-shape test on the XY plane.
    #[must_use]
    pub fn contains(&self, p: &Point3) -> bool {
        match self {
            Self::Circle(c) => c.contains(p),
            Self::Box(q) => q.contains(p),
        }
    }

    /// Parameter interval of segment `a0 → a1` covered by the shape.
    #[must_use]
    pub fn span(&self, a0: &Point3, a1: &Point3, tolerance: f64) -> Option<(f64, f64)> {
        match self {
            Self::Circle(c) => c.span(a0, a1),
            Self::Box(q) => q.span(a0, a1, tolerance),
        }
    }

    /// Whether any part of segment `a0 → a1` overlaps the shape.
    #[must_use]
    pub fn touches_segment(&self, a0: &Point3, a1: &Point3) -> bool {
        match self {
            Self::Circle(c) => c.touches_segment(a0, a1),
            Self::Box(q) => q.touches_segment(a0, a1),
        }
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (Point3, Point3) {
        match self {
            Self::Circle(c) => c.bounds(),
            Self::Box(q) => q.bounds(),
        }
    }

    /// Centre of the footprint.
    #[must_use]
    pub fn center(&self) -> Point3 {
        match self {
            Self::Circle(c) => *c.center(),
            Self::Box(q) => q.center(),
        }
    }

    /// Floor height the shape is laid at.
    #[must_use]
    pub fn elevation(&self) -> f64 {
        self.center().z
    }

    /// Distance from the centre to the boundary along the unit direction `dir`.
    #[must_use]
    pub fn extent_along(&self, dir: &Vector3) -> f64 {
        match self {
            Self::Circle(c) => c.radius(),
            Self::Box(q) => q.extent_along(dir),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Quad> for Shape {
    fn from(q: Quad) -> Self {
        Self::Box(q)
    }
}
