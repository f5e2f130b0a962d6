use glam::Vec3;

use crate::error::Result;
use crate::math::{triangle_area, GEOM_TOL};

use super::{Plane, SurfaceHit};

/// A triangle with its supporting plane and a slightly inflated bounding box
/// for cheap rejection.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    plane: Plane,
    vmin: Vec3,
    vmax: Vec3,
}

const BOX_MARGIN: f32 = 0.01;

impl Triangle {
    /// Fails on degenerate (collinear) vertices.
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3) -> Result<Self> {
        let plane = Plane::from_points(p0, p1, p2)?;
        let vmin = p0.min(p1).min(p2) - Vec3::splat(BOX_MARGIN);
        let vmax = p0.max(p1).max(p2) + Vec3::splat(BOX_MARGIN);
        Ok(Self { p0, p1, p2, plane, vmin, vmax })
    }

    pub fn points(&self) -> (Vec3, Vec3, Vec3) {
        (self.p0, self.p1, self.p2)
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    fn in_box(&self, p: Vec3) -> bool {
        p.cmpge(self.vmin).all() && p.cmple(self.vmax).all()
    }

    /// Plane containment plus the area-sum test: the three sub-triangles at
    /// `p` must add up to the full area within `tol`.
    pub fn is_inside(&self, p: Vec3, tol: f32) -> bool {
        if !self.in_box(p) {
            return false;
        }
        if !self.plane.is_inside(p, tol) {
            return false;
        }
        let a1 = triangle_area(p, self.p1, self.p2);
        let a2 = triangle_area(self.p0, p, self.p2);
        let a3 = triangle_area(self.p0, self.p1, p);
        let total = triangle_area(self.p0, self.p1, self.p2);
        (a1 + a2 + a3) - total <= tol
    }

    pub fn intersect_segment(&self, p1: Vec3, p2: Vec3) -> Option<Vec3> {
        self.hit(p1, p2).map(|h| h.point)
    }

    pub fn hit(&self, p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
        // no plane crossing, no triangle crossing
        let hit = self.plane.hit(p1, p2)?;
        if self.is_inside(hit.point, GEOM_TOL) {
            Some(hit)
        } else {
            None
        }
    }

    /// Moving-sphere contact: the supporting plane offset by one radius,
    /// restricted to contacts whose surface projection lies on the triangle.
    pub fn hit_sphere(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        let hit = self.plane.hit_sphere(p1, p2, radius)?;
        let foot = self.plane.closest_point(hit.point);
        if self.is_inside(foot, GEOM_TOL) {
            Some(hit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tri() -> Triangle {
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn degenerate_vertices_rejected() {
        assert!(Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0).is_err());
    }

    #[test]
    fn segment_through_interior_hits() {
        let t = unit_tri();
        let p = t
            .intersect_segment(Vec3::new(0.2, 1.0, 0.2), Vec3::new(0.2, -1.0, 0.2))
            .unwrap();
        assert!(p.y.abs() < 1e-5);
        assert!((p.x - 0.2).abs() < 1e-5 && (p.z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn segment_missing_triangle_plane_is_rejected() {
        // crosses the supporting plane outside the triangle
        let t = unit_tri();
        let got = t.intersect_segment(Vec3::new(5.0, 1.0, 5.0), Vec3::new(5.0, -1.0, 5.0));
        assert!(got.is_none());
    }

    #[test]
    fn edge_graze_counts_as_hit() {
        let t = unit_tri();
        // passes exactly through the edge x in [0,1], z = 0
        let got = t.intersect_segment(Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.5, -1.0, 0.0));
        assert!(got.is_some(), "boundary grazes must be inclusive");
    }
}
