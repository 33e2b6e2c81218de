use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::{left_normal, orient_2d, segment_direction};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A convex four-cornered box in the horizontal plane.
///
/// Corners are explicit so the box may carry any rotation. Edges are
/// named after the corners they join: top (`TL–TR`), bottom (`BL–BR`),
/// left (`TL–BL`) and right (`TR–BR`).
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    top_left: Point3,
    top_right: Point3,
    bottom_left: Point3,
    bottom_right: Point3,
}

impl Quad {
    /// Creates a box from its four corners.
    #[must_use]
    pub fn new(
        top_left: Point3,
        top_right: Point3,
        bottom_left: Point3,
        bottom_right: Point3,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Builds a rectangle of `width × height` centred on `center`, rotated
    /// counter-clockwise by `rotation` radians.
    ///
    /// # Errors
    ///
    /// Returns an error if either extent is not positive.
    pub fn from_rectangle(center: Point3, width: f64, height: f64, rotation: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width < TOLERANCE || height < TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "rectangle extents must be positive, got {width} x {height}"
            ))
            .into());
        }
        let (sin, cos) = rotation.sin_cos();
        let hw = width * 0.5;
        let hh = height * 0.5;
        let place = |lx: f64, ly: f64| {
            Point3::new(
                center.x + lx * cos - ly * sin,
                center.y + lx * sin + ly * cos,
                center.z,
            )
        };
        Ok(Self::new(
            place(-hw, hh),
            place(hw, hh),
            place(-hw, -hh),
            place(hw, -hh),
        ))
    }

    /// Builds the box swept by a centerline `start → end` of the given width.
    ///
    /// The top edge runs along the left-hand side of the centerline.
    ///
    /// # Errors
    ///
    /// Returns an error if the centerline has zero length or the width is not positive.
    pub fn from_segment(start: &Point3, end: &Point3, width: f64) -> Result<Self> {
        if !width.is_finite() || width < TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "width",
                value: width,
                min: TOLERANCE,
                max: f64::INFINITY,
            }
            .into());
        }
        let dir = segment_direction(start, end)?;
        let offset = left_normal(dir) * (width * 0.5);
        Ok(Self::new(
            start + offset,
            end + offset,
            start - offset,
            end - offset,
        ))
    }

    /// Corners in `[TL, TR, BL, BR]` order.
    #[must_use]
    pub fn corners(&self) -> [Point3; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Average of the four corners.
    #[must_use]
    pub fn center(&self) -> Point3 {
        let sum = self.top_left.coords
            + self.top_right.coords
            + self.bottom_left.coords
            + self.bottom_right.coords;
        Point3::from(sum * 0.25)
    }

    /// Edges in the fixed search order: top, bottom, left, right.
    #[must_use]
    pub fn edges(&self) -> [(Point3, Point3); 4] {
        [
            (self.top_left, self.top_right),
            (self.bottom_left, self.bottom_right),
            (self.top_left, self.bottom_left),
            (self.top_right, self.bottom_right),
        ]
    }

    /// Closed boundary ring `TL → TR → BR → BL`.
    fn ring(&self) -> [(Point3, Point3); 4] {
        [
            (self.top_left, self.top_right),
            (self.top_right, self.bottom_right),
            (self.bottom_right, self.bottom_left),
            (self.bottom_left, self.top_left),
        ]
    }

    /// Convex half-plane test: `p` is inside when it lies on the same side
    /// of all four boundary edges. Points on the boundary count as inside.
    #[must_use]
    pub fn contains(&self, p: &Point3) -> bool {
        let mut positive = false;
        let mut negative = false;
        for (a, b) in self.ring() {
            let side = orient_2d(&a, &b, p);
            if side > TOLERANCE {
                positive = true;
            } else if side < -TOLERANCE {
                negative = true;
            }
        }
        !(positive && negative)
    }

    /// First crossing of segment `a0 → a1` with the box edges, trying
    /// top, bottom, left, right in that order.
    #[must_use]
    pub fn crossing(&self, a0: &Point3, a1: &Point3, tolerance: f64) -> Option<Point3> {
        self.edges().iter().find_map(|(b0, b1)| {
            segment_segment_intersect_2d(a0, a1, b0, b1, tolerance).map(|(p, _, _)| p)
        })
    }

    /// Whether any part of segment `a0 → a1` lies within the box.
    #[must_use]
    pub fn touches_segment(&self, a0: &Point3, a1: &Point3) -> bool {
        self.contains(a0) || self.contains(a1) || self.crossing(a0, a1, 0.0).is_some()
    }

    /// Parameter interval of segment `a0 → a1` that lies within the box.
    #[must_use]
    pub fn span(&self, a0: &Point3, a1: &Point3, tolerance: f64) -> Option<(f64, f64)> {
        let mut ts = Vec::with_capacity(4);
        if self.contains(a0) {
            ts.push(0.0);
        }
        if self.contains(a1) {
            ts.push(1.0);
        }
        for (b0, b1) in self.ring() {
            if let Some((_, t, _)) = segment_segment_intersect_2d(a0, a1, &b0, &b1, tolerance) {
                ts.push(t);
            }
        }
        let lo = ts.iter().copied().reduce(f64::min)?;
        let hi = ts.iter().copied().reduce(f64::max)?;
        Some((lo, hi))
    }

    /// Distance from the box centre to its boundary along `dir`.
    #[must_use]
    pub fn extent_along(&self, dir: &Vector3) -> f64 {
        let c = self.center();
        self.ring()
            .iter()
            .filter_map(|(p, q)| {
                let ex = q.x - p.x;
                let ey = q.y - p.y;
                let cross = dir.x * ey - dir.y * ex;
                if cross.abs() < TOLERANCE {
                    return None;
                }
                let dx = p.x - c.x;
                let dy = p.y - c.y;
                let s = (dx * ey - dy * ex) / cross;
                let u = (dx * dir.y - dy * dir.x) / cross;
                (s >= 0.0 && (-TOLERANCE..=1.0 + TOLERANCE).contains(&u)).then_some(s)
            })
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.min(s))))
            .unwrap_or(0.0)
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (Point3, Point3) {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for p in &corners[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}
