use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::segment_point_distance_sq_2d;
use crate::math::{distance_xy, Point3, Vector3, TOLERANCE};

/// A filled disc lying in the horizontal plane at `center.z`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: Point3,
    radius: f64,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive or not finite.
    pub fn new(center: Point3, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("circle radius must be positive".into()).into(),
            );
        }
        Ok(Self { center, radius })
    }

    /// Returns the center of the circle.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the circle.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Point-in-circle test on the XY plane; the boundary counts as inside.
    #[must_use]
    pub fn contains(&self, p: &Point3) -> bool {
        distance_xy(&self.center, p) <= self.radius
    }

    /// Whether any part of segment `a0 → a1` lies within the disc.
    #[must_use]
    pub fn touches_segment(&self, a0: &Point3, a1: &Point3) -> bool {
        segment_point_distance_sq_2d(a0, a1, &self.center) <= self.radius * self.radius
    }

    /// Parameter interval of segment `a0 → a1` that lies within the disc.
    #[must_use]
    pub fn span(&self, a0: &Point3, a1: &Point3) -> Option<(f64, f64)> {
        let dx = a1.x - a0.x;
        let dy = a1.y - a0.y;
        let a = dx * dx + dy * dy;
        if a < TOLERANCE * TOLERANCE {
            return None;
        }
        let fx = a0.x - self.center.x;
        let fy = a0.y - self.center.y;
        let b = 2.0 * (fx * dx + fy * dy);
        let c = fx * fx + fy * fy - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let t0 = (-b - root) / (2.0 * a);
        let t1 = (-b + root) / (2.0 * a);
        (t1 >= 0.0 && t0 <= 1.0).then_some((t0.max(0.0), t1.min(1.0)))
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (Point3, Point3) {
        let r = Vector3::new(self.radius, self.radius, 0.0);
        (self.center - r, self.center + r)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn contains_boundary_point() {
        let c = Circle::new(Point3::origin(), 2.0).unwrap();
        assert!(c.contains(&Point3::new(2.0, 0.0, 0.0)));
        assert!(c.contains(&Point3::new(1.0, 1.0, 0.0)));
        assert!(!c.contains(&Point3::new(1.5, 1.5, 0.0)));
    }

    #[test]
    fn contains_ignores_height() {
        let c = Circle::new(Point3::new(0.0, 0.0, 5.0), 1.0).unwrap();
        assert!(c.contains(&Point3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn touches_segment_passing_nearby() {
        let c = Circle::new(Point3::origin(), 1.0).unwrap();
        assert!(c.touches_segment(&Point3::new(-5.0, 0.9, 0.0), &Point3::new(5.0, 0.9, 0.0)));
        assert!(!c.touches_segment(&Point3::new(-5.0, 1.1, 0.0), &Point3::new(5.0, 1.1, 0.0)));
    }

    #[test]
    fn span_of_chord_and_of_inner_start() {
        let c = Circle::new(Point3::origin(), 1.0).unwrap();
        let (t0, t1) = c
            .span(&Point3::new(-2.0, 0.0, 0.0), &Point3::new(2.0, 0.0, 0.0))
            .unwrap();
        assert!((t0 - 0.25).abs() < TOLERANCE);
        assert!((t1 - 0.75).abs() < TOLERANCE);

        let (t0, t1) = c
            .span(&Point3::origin(), &Point3::new(0.0, -2.0, 0.0))
            .unwrap();
        assert!(t0.abs() < TOLERANCE);
        assert!((t1 - 0.5).abs() < TOLERANCE);

        assert!(c
            .span(&Point3::new(2.0, 0.0, 0.0), &Point3::new(3.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn bounds_square_around_center() {
        let c = Circle::new(Point3::new(1.0, -1.0, 0.0), 0.5).unwrap();
        let (min, max) = c.bounds();
        assert!((min.x - 0.5).abs() < TOLERANCE);
        assert!((min.y + 1.5).abs() < TOLERANCE);
        assert!((max.x - 1.5).abs() < TOLERANCE);
        assert!((max.y + 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn invalid_radius() {
        assert!(Circle::new(Point3::origin(), 0.0).is_err());
        assert!(Circle::new(Point3::origin(), -1.0).is_err());
        assert!(Circle::new(Point3::origin(), f64::NAN).is_err());
    }
}
