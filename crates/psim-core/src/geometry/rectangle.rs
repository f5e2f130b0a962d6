use glam::Vec3;

use crate::error::{Error, Result};

use super::{Plane, SurfaceHit, Triangle};

/// A planar quadrilateral, stored as its two triangles for intersection.
#[derive(Clone, Copy, Debug)]
pub struct Rectangle {
    vertices: [Vec3; 4],
    half_a: Triangle,
    half_b: Triangle,
}

/// How far off the supporting plane the fourth vertex may sit.
const COPLANAR_TOL: f32 = 1e-4;

impl Rectangle {
    /// Vertices must be given in perimeter order; the fourth must be
    /// coplanar with the first three.
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3, v4: Vec3) -> Result<Self> {
        let plane = Plane::from_points(v1, v2, v3)?;
        if plane.signed_distance(v4).abs() > COPLANAR_TOL {
            return Err(Error::InvalidGeometry(
                "rectangle vertex is not coplanar with the other three".into(),
            ));
        }
        Ok(Self {
            vertices: [v1, v2, v3, v4],
            half_a: Triangle::new(v1, v2, v3)?,
            half_b: Triangle::new(v1, v3, v4)?,
        })
    }

    pub fn vertices(&self) -> &[Vec3; 4] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane {
        self.half_a.plane()
    }

    /// Union of the two half-triangles.
    pub fn is_inside(&self, p: Vec3, tol: f32) -> bool {
        self.half_a.is_inside(p, tol) || self.half_b.is_inside(p, tol)
    }

    pub fn intersect_segment(&self, p1: Vec3, p2: Vec3) -> Option<Vec3> {
        self.hit(p1, p2).map(|h| h.point)
    }

    pub fn hit(&self, p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
        self.half_a.hit(p1, p2).or_else(|| self.half_b.hit(p1, p2))
    }

    pub fn hit_sphere(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        self.half_a
            .hit_sphere(p1, p2, radius)
            .or_else(|| self.half_b.hit_sphere(p1, p2, radius))
    }
}
