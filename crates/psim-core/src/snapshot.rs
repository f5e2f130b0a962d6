//! Read-only state exported to a renderer once per frame.

use glam::Vec3;

use crate::geometry::Geometry;
use crate::particle::ParticleBase;

/// Renderer-compatible particle record: 32 bytes, tightly packed for upload
/// to a vertex or storage buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleSnapshot {
    pub position: [f32; 3], // 12 bytes
    pub lifetime: f32,      //  4 bytes
    pub velocity: [f32; 3], // 12 bytes
    pub radius: f32,        //  4 bytes
}

impl ParticleSnapshot {
    pub fn new(base: &ParticleBase, lifetime: f32, radius: f32) -> Self {
        Self {
            position: base.pos.to_array(),
            lifetime,
            velocity: base.vel.to_array(),
            radius,
        }
    }
}

/// Drawable parameters of one static primitive, enough to rebuild its shape
/// without reaching into the simulation types.
#[derive(Clone, Debug)]
pub enum GeometrySnapshot {
    Plane { normal: Vec3, constant: f32 },
    Triangle { points: [Vec3; 3] },
    Rectangle { vertices: [Vec3; 4] },
    Sphere { center: Vec3, radius: f32 },
    Object { triangles: Vec<[Vec3; 3]> },
}

impl From<&Geometry> for GeometrySnapshot {
    fn from(geom: &Geometry) -> Self {
        match geom {
            Geometry::Plane(p) => GeometrySnapshot::Plane {
                normal: p.normal(),
                constant: p.constant(),
            },
            Geometry::Triangle(t) => {
                let (p0, p1, p2) = t.points();
                GeometrySnapshot::Triangle { points: [p0, p1, p2] }
            }
            Geometry::Rectangle(r) => GeometrySnapshot::Rectangle { vertices: *r.vertices() },
            Geometry::Sphere(s) => GeometrySnapshot::Sphere {
                center: s.center(),
                radius: s.radius(),
            },
            Geometry::Object(o) => GeometrySnapshot::Object {
                triangles: o
                    .triangles()
                    .iter()
                    .map(|t| {
                        let (p0, p1, p2) = t.points();
                        [p0, p1, p2]
                    })
                    .collect(),
            },
        }
    }
}
