use glam::Vec3;

use crate::error::{Error, Result};

use super::{SurfaceHit, Triangle};

/// A triangle soup with an inflated bounding box for cheap rejection.
#[derive(Clone, Debug)]
pub struct Object {
    triangles: Vec<Triangle>,
    vmin: Vec3,
    vmax: Vec3,
}

const BOX_MARGIN: f32 = 0.01;

impl Object {
    /// Builds an object from a shared vertex list and triangle index triples.
    /// Fails on out-of-range indices or degenerate triangles.
    pub fn from_soup(vertices: &[Vec3], indices: &[[usize; 3]]) -> Result<Self> {
        let mut triangles = Vec::with_capacity(indices.len());
        for tri in indices {
            for &i in tri {
                if i >= vertices.len() {
                    return Err(Error::InvalidGeometry(format!(
                        "triangle index {i} out of range for {} vertices",
                        vertices.len()
                    )));
                }
            }
            triangles.push(Triangle::new(
                vertices[tri[0]],
                vertices[tri[1]],
                vertices[tri[2]],
            )?);
        }
        if triangles.is_empty() {
            return Err(Error::InvalidGeometry("object has no triangles".into()));
        }
        let mut vmin = Vec3::splat(f32::INFINITY);
        let mut vmax = Vec3::splat(f32::NEG_INFINITY);
        for v in vertices {
            vmin = vmin.min(*v);
            vmax = vmax.max(*v);
        }
        Ok(Self {
            triangles,
            vmin: vmin - Vec3::splat(BOX_MARGIN),
            vmax: vmax + Vec3::splat(BOX_MARGIN),
        })
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn in_box(&self, p: Vec3, pad: f32) -> bool {
        p.cmpge(self.vmin - Vec3::splat(pad)).all() && p.cmple(self.vmax + Vec3::splat(pad)).all()
    }

    fn misses_box(&self, p1: Vec3, p2: Vec3, pad: f32) -> bool {
        !self.in_box(p1, pad) && !self.in_box(p2, pad) && !self.segment_overlaps_box(p1, p2, pad)
    }

    /// True when `p` lies on one of the object's triangles.
    pub fn is_inside(&self, p: Vec3, tol: f32) -> bool {
        self.in_box(p, 0.0) && self.triangles.iter().any(|t| t.is_inside(p, tol))
    }

    pub fn intersect_segment(&self, p1: Vec3, p2: Vec3) -> Option<Vec3> {
        self.hit(p1, p2).map(|h| h.point)
    }

    /// Nearest triangle contact along the segment.
    pub fn hit(&self, p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
        if self.misses_box(p1, p2, 0.0) {
            return None;
        }
        let mut best: Option<SurfaceHit> = None;
        for tri in &self.triangles {
            if let Some(hit) = tri.hit(p1, p2) {
                if best.as_ref().map_or(true, |b| hit.t < b.t) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    /// Nearest moving-sphere contact over the soup; the box pre-reject is
    /// padded by the sphere radius.
    pub fn hit_sphere(&self, p1: Vec3, p2: Vec3, radius: f32) -> Option<SurfaceHit> {
        if self.misses_box(p1, p2, radius) {
            return None;
        }
        let mut best: Option<SurfaceHit> = None;
        for tri in &self.triangles {
            if let Some(hit) = tri.hit_sphere(p1, p2, radius) {
                if best.as_ref().map_or(true, |b| hit.t < b.t) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    // Slab test against the inflated box.
    fn segment_overlaps_box(&self, p1: Vec3, p2: Vec3, pad: f32) -> bool {
        let dir = p2 - p1;
        let mut t_enter: f32 = 0.0;
        let mut t_exit: f32 = 1.0;
        for axis in 0..3 {
            let d = dir[axis];
            let lo = self.vmin[axis] - pad;
            let hi = self.vmax[axis] + pad;
            if d.abs() < f32::EPSILON {
                if p1[axis] < lo || p1[axis] > hi {
                    return false;
                }
            } else {
                let mut t0 = (lo - p1[axis]) / d;
                let mut t1 = (hi - p1[axis]) / d;
                if t0 > t1 {
                    core::mem::swap(&mut t0, &mut t1);
                }
                t_enter = t_enter.max(t0);
                t_exit = t_exit.min(t1);
                if t_enter > t_exit {
                    return false;
                }
            }
        }
        true
    }
}
