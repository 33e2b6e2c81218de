use super::{Point3, Vector3, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// `tolerance` is a world-space slack: a hit whose parameter lies outside
/// `[0, 1]` by less than `tolerance / segment_length` is accepted and
/// clamped onto the segment. Parallel or zero-length segments report no hit.
///
/// Returns `(intersection_point, t, u)` where the point lies on segment `a`
/// at parameter `t` (Z taken from `a0`).
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    tolerance: f64,
) -> Option<(Point3, f64, f64)> {
    let da = Vector3::new(a1.x - a0.x, a1.y - a0.y, 0.0);
    let db = Vector3::new(b1.x - b0.x, b1.y - b0.y, 0.0);

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    let eps_a = slack(tolerance, da.norm());
    let eps_b = slack(tolerance, db.norm());
    if t < -eps_a || t > 1.0 + eps_a || u < -eps_b || u > 1.0 + eps_b {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    Some((point_at(a0, &da, t), t, u.clamp(0.0, 1.0)))
}

/// Squared distance from `p` to the closest point of segment `a0 → a1` in 2D.
#[must_use]
pub fn segment_point_distance_sq_2d(a0: &Point3, a1: &Point3, p: &Point3) -> f64 {
    let dx = a1.x - a0.x;
    let dy = a1.y - a0.y;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq < TOLERANCE * TOLERANCE {
        0.0
    } else {
        (((p.x - a0.x) * dx + (p.y - a0.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = a0.x + dx * t - p.x;
    let cy = a0.y + dy * t - p.y;
    cx * cx + cy * cy
}

/// Linear interpolation: `origin + dir * t`, keeping the origin's Z.
#[must_use]
pub fn point_at(origin: &Point3, dir: &Vector3, t: f64) -> Point3 {
    Point3::new(origin.x + dir.x * t, origin.y + dir.y * t, origin.z)
}

/// Converts a world-space tolerance into a parameter-space one.
fn slack(tolerance: f64, length: f64) -> f64 {
    if length < TOLERANCE {
        0.0
    } else {
        tolerance / length
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn segment_segment_crossing() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(2.0, 2.0, 0.0);
        let b0 = Point3::new(0.0, 2.0, 0.0);
        let b1 = Point3::new(2.0, 0.0, 0.0);
        let (pt, t, u) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1, 0.0).unwrap();
        assert!((pt.x - 1.0).abs() < TOLERANCE);
        assert!((pt.y - 1.0).abs() < TOLERANCE);
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_parallel_is_none() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(1.0, 0.0, 0.0);
        let b0 = Point3::new(0.0, 1.0, 0.0);
        let b1 = Point3::new(1.0, 1.0, 0.0);
        assert!(segment_segment_intersect_2d(&a0, &a1, &b0, &b1, 0.1).is_none());
    }

    #[test]
    fn segment_segment_zero_length_is_none() {
        let a0 = Point3::new(0.5, 0.5, 0.0);
        let b0 = Point3::new(0.0, 0.0, 0.0);
        let b1 = Point3::new(1.0, 1.0, 0.0);
        assert!(segment_segment_intersect_2d(&a0, &a0, &b0, &b1, 0.1).is_none());
    }

    #[test]
    fn segment_segment_near_miss_within_tolerance() {
        // b ends 1e-6 short of segment a.
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(1.0, 0.0, 0.0);
        let b0 = Point3::new(0.5, 1.0, 0.0);
        let b1 = Point3::new(0.5, 1e-6, 0.0);
        assert!(segment_segment_intersect_2d(&a0, &a1, &b0, &b1, 0.0).is_none());
        let (pt, _, u) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1, 1e-4).unwrap();
        assert!((pt.x - 0.5).abs() < TOLERANCE);
        assert!((u - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn point_segment_distance() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(4.0, 0.0, 0.0);
        let d = segment_point_distance_sq_2d(&a0, &a1, &Point3::new(2.0, 3.0, 0.0));
        assert!((d - 9.0).abs() < TOLERANCE);
        let d = segment_point_distance_sq_2d(&a0, &a1, &Point3::new(7.0, 4.0, 0.0));
        assert!((d - 25.0).abs() < TOLERANCE);
    }
}
