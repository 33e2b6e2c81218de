pub mod intersect_2d;
pub mod polygon_2d;

/// 3D point type. Dungeon geometry lives in the XY plane with a flat Z.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Fraction of the cell size by which an intersection may fall outside
/// its segment and still count as a crossing.
pub const EDGE_TOLERANCE_FACTOR: f64 = 1e-4;

/// Planar (XY) distance between two points, ignoring Z.
#[must_use]
pub fn distance_xy(a: &Point3, b: &Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}
