use glam::Vec3;

/// Tolerance used by geometric containment tests.
pub const GEOM_TOL: f32 = 1e-6;

/// Below this squared length a vector is treated as zero.
pub const ZERO_LEN_SQ: f32 = 1e-12;

/// Normalisation policy for the whole crate: near-zero vectors normalise to
/// the zero vector instead of NaN. Collision and kernel code rely on this to
/// absorb degenerate separations.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq < ZERO_LEN_SQ {
        Vec3::ZERO
    } else {
        v / len_sq.sqrt()
    }
}

/// Cap the magnitude of `v` at `max`, preserving direction.
#[inline]
pub fn truncate(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Area of the triangle spanned by three points.
#[inline]
pub fn triangle_area(p0: Vec3, p1: Vec3, p2: Vec3) -> f32 {
    (p1 - p0).cross(p2 - p0).length() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_or_zero_absorbs_degenerate() {
        assert_eq!(normalize_or_zero(Vec3::ZERO), Vec3::ZERO);
        assert_eq!(normalize_or_zero(Vec3::splat(1e-8)), Vec3::ZERO);
        let n = normalize_or_zero(Vec3::new(3.0, 4.0, 0.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn truncate_caps_only_long_vectors() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(truncate(v, 10.0), v);
        let t = truncate(v, 1.0);
        assert!((t.length() - 1.0).abs() < 1e-6);
        assert!(t.dot(v) > 0.0);
    }

    #[test]
    fn area_of_unit_right_triangle() {
        let a = triangle_area(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((a - 0.5).abs() < 1e-6);
    }
}
