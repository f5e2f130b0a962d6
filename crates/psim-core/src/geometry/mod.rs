//! Static collision geometry: planes, triangles, rectangles, spheres and
//! triangle-soup objects.
//!
//! Every primitive answers two questions: `is_inside(point, tol)` and
//! `intersect_segment(p, q)`. Boundary grazes within tolerance count as
//! intersections so particles cannot slip through seams between adjacent
//! primitives.

pub mod object;
pub mod plane;
pub mod rectangle;
pub mod sphere;
pub mod triangle;

pub use object::Object;
pub use plane::Plane;
pub use rectangle::Rectangle;
pub use sphere::Sphere;
pub use triangle::Triangle;

use glam::Vec3;

/// A surface contact found along a trajectory segment.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    /// Intersection point on the surface. Moving-sphere queries report the
    /// sphere centre at contact, one radius off the surface.
    pub point: Vec3,
    /// Parametric position along the segment, in [0,1].
    pub t: f32,
    /// Surface normal at the intersection point (unit length).
    pub normal: Vec3,
}

/// A static scene primitive.
#[derive(Clone, Debug)]
pub enum Geometry {
    Plane(Plane),
    Triangle(Triangle),
    Rectangle(Rectangle),
    Sphere(Sphere),
    Object(Object),
}

impl Geometry {
    pub fn is_inside(&self, p: Vec3, tol: f32) -> bool {
        match self {
            Geometry::Plane(g) => g.is_inside(p, tol),
            Geometry::Triangle(g) => g.is_inside(p, tol),
            Geometry::Rectangle(g) => g.is_inside(p, tol),
            Geometry::Sphere(g) => g.is_inside(p, tol),
            Geometry::Object(g) => g.is_inside(p, tol),
        }
    }

    /// Intersection point of the segment `p1 -> p2` with this primitive,
    /// if any.
    pub fn intersect_segment(&self, p1: Vec3, p2: Vec3) -> Option<Vec3> {
        self.hit(p1, p2).map(|h| h.point)
    }

    /// Full contact information for the segment `p1 -> p2`.
    pub fn hit(&self, p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
        match self {
            Geometry::Plane(g) => g.hit(p1, p2),
            Geometry::Triangle(g) => g.hit(p1, p2),
            Geometry::Rectangle(g) => g.hit(p1, p2),
            Geometry::Sphere(g) => g.hit(p1, p2),
            Geometry::Object(g) => g.hit(p1, p2),
        }
    }

    /// Contact of a sphere whose centre travels `p1 -> p2`. The surface is
    /// offset one radius toward the sphere, so the returned hit describes
    /// where the centre stops.
    pub fn hit_sphere(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        match self {
            Geometry::Plane(g) => g.hit_sphere(p1, p2, radius),
            Geometry::Triangle(g) => g.hit_sphere(p1, p2, radius),
            Geometry::Rectangle(g) => g.hit_sphere(p1, p2, radius),
            Geometry::Sphere(g) => g.hit_sphere(p1, p2, radius),
            Geometry::Object(g) => g.hit_sphere(p1, p2, radius),
        }
    }
}
