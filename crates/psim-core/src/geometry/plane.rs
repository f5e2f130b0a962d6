use glam::Vec3;

use crate::error::{Error, Result};
use crate::math::{normalize_or_zero, GEOM_TOL};

use super::SurfaceHit;

/// An infinite plane `normal . x + d = 0` with unit normal.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    normal: Vec3,
    d: f32,
}

impl Plane {
    /// Plane through `point` with the given (not necessarily unit) normal.
    pub fn new(normal: Vec3, point: Vec3) -> Result<Self> {
        let n = normalize_or_zero(normal);
        if n == Vec3::ZERO {
            return Err(Error::InvalidGeometry(
                "plane normal has near-zero length".into(),
            ));
        }
        Ok(Self { normal: n, d: -point.dot(n) })
    }

    /// Plane through three points, with normal `(p1-p0) x (p2-p0)`.
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Result<Self> {
        Self::new((p1 - p0).cross(p2 - p0), p0)
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn constant(&self) -> f32 {
        self.d
    }

    /// Signed distance from `p` to the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }

    /// A point is "inside" a plane when it lies on or behind it: signed
    /// distance at most `tol`.
    pub fn is_inside(&self, p: Vec3, tol: f32) -> bool {
        self.signed_distance(p) <= tol
    }

    pub fn intersect_segment(&self, p1: Vec3, p2: Vec3) -> Option<Vec3> {
        self.hit(p1, p2).map(|h| h.point)
    }

    /// Contact of a moving sphere (centre travelling `p1 -> p2`) with the
    /// plane. The surface is offset one radius toward the sphere, so the
    /// returned point is the centre at contact and the response code can
    /// clamp the centre directly. Works from either side of the plane.
    pub fn hit_sphere(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        let d1 = self.signed_distance(p1);
        let d2 = self.signed_distance(p2);
        let side = if d1 >= 0.0 { 1.0 } else { -1.0 };
        let a1 = d1 * side;
        let a2 = d2 * side;
        // no contact at the end of the step, or already separating
        if a2 >= radius || a2 > a1 {
            return None;
        }
        let t = if a1 <= radius {
            0.0
        } else {
            ((a1 - radius) / (a1 - a2)).clamp(0.0, 1.0)
        };
        Some(SurfaceHit {
            point: p1 + (p2 - p1) * t,
            t,
            normal: self.normal * side,
        })
    }

    /// Line-plane intersection restricted to the segment's parametric range.
    /// Near-parallel segments are treated as non-intersecting.
    pub fn hit(&self, p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
        let dir = p2 - p1;
        let denom = self.normal.dot(dir);
        if denom.abs() < GEOM_TOL {
            return None;
        }
        let t = -(self.d + self.normal.dot(p1)) / denom;
        // inclusive boundary: grazes within tolerance still count
        if !(-GEOM_TOL..=1.0 + GEOM_TOL).contains(&t) {
            return None;
        }
        let t = t.clamp(0.0, 1.0);
        Some(SurfaceHit {
            point: p1 + dir * t,
            t,
            normal: self.normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Plane {
        Plane::new(Vec3::Y, Vec3::ZERO).unwrap()
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::new(Vec3::ZERO, Vec3::ZERO).is_err());
    }

    #[test]
    fn crossing_segment_intersects_at_surface() {
        let p = floor()
            .intersect_segment(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .unwrap();
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn parallel_segment_does_not_intersect() {
        let got = floor()
            .intersect_segment(Vec3::new(0.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0));
        assert!(got.is_none());
    }

    #[test]
    fn intersection_outside_segment_is_rejected() {
        // the infinite line crosses the plane, the segment does not
        let got = floor()
            .intersect_segment(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(got.is_none());
    }

    #[test]
    fn sphere_contact_stops_one_radius_off_the_surface() {
        let pl = floor();
        // centre falls from 1.0 to 0.2; a 0.5-sphere touches when the
        // centre reaches 0.5
        let hit = pl
            .hit_sphere(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.2, 0.0), 0.5)
            .unwrap();
        assert!((hit.point.y - 0.5).abs() < 1e-5, "contact centre at one radius");
        assert_eq!(hit.normal, Vec3::Y);

        // same approach from below must face the other way
        let hit = pl
            .hit_sphere(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -0.2, 0.0), 0.5)
            .unwrap();
        assert_eq!(hit.normal, Vec3::NEG_Y);
    }

    #[test]
    fn separating_sphere_is_not_a_contact() {
        let pl = floor();
        let got = pl.hit_sphere(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 0.45, 0.0), 0.5);
        assert!(got.is_none(), "a sphere moving away must be left alone");
    }

    #[test]
    fn inside_follows_signed_distance() {
        let pl = floor();
        assert!(pl.is_inside(Vec3::new(0.0, -1.0, 0.0), 0.0));
        assert!(pl.is_inside(Vec3::new(0.0, 1e-8, 0.0), 1e-6));
        assert!(!pl.is_inside(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    }
}
