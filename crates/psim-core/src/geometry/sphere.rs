use glam::Vec3;

use crate::math::{normalize_or_zero, GEOM_TOL};

use super::SurfaceHit;

/// A solid sphere.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_inside(&self, p: Vec3, tol: f32) -> bool {
        self.center.distance(p) <= self.radius + tol
    }

    pub fn intersect_segment(&self, p1: Vec3, p2: Vec3) -> Option<Vec3> {
        self.hit(p1, p2).map(|h| h.point)
    }

    /// Quadratic line-sphere intersection; takes the nearest root that falls
    /// inside the segment's parametric range.
    pub fn hit(&self, p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
        self.hit_with_radius(p1, p2, self.radius)
    }

    /// Moving-sphere contact: equivalent to intersecting the centre's path
    /// with this sphere inflated by the moving sphere's radius.
    pub fn hit_sphere(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        self.hit_with_radius(p1, p2, self.radius + radius)
    }

    fn hit_with_radius(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        let dir = p2 - p1;
        let to_p1 = p1 - self.center;

        let a = dir.length_squared();
        if a < GEOM_TOL * GEOM_TOL {
            // zero-length trajectory: absorbed as no intersection
            return None;
        }
        let b = 2.0 * to_p1.dot(dir);
        let c = to_p1.length_squared() - radius * radius;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let t_near = (-b - sqrt_disc) / (2.0 * a);
        let t_far = (-b + sqrt_disc) / (2.0 * a);

        let in_range = |t: f32| (-GEOM_TOL..=1.0 + GEOM_TOL).contains(&t);
        let t = if in_range(t_near) {
            t_near
        } else if in_range(t_far) {
            t_far
        } else {
            return None;
        };
        let t = t.clamp(0.0, 1.0);
        let point = p1 + dir * t;
        Some(SurfaceHit {
            point,
            t,
            normal: normalize_or_zero(point - self.center),
        })
    }
}
