//! Spring meshes: 1D chains and regular 2D grids of damped Hookean springs.
//!
//! Each topology expands into explicit links with their own rest lengths,
//! captured once from the initial particle layout by `capture_rest_state()`.
//! Stretch links are on by default; bend (skip-one) and shear (diagonal)
//! links are opt-in.

pub mod mesh1d;
pub mod mesh2d;

pub use mesh1d::Mesh1d;
pub use mesh2d::Mesh2d;

use crate::math::normalize_or_zero;
use crate::particle::MeshParticle;

/// One damped spring between two particles of the same mesh.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    pub i: usize,
    pub j: usize,
    pub rest: f32,
}

/// Accumulate the force of every spring into its endpoint particles:
/// `F = dir * (ke * (len - rest) + kd * (dvel . dir))` on `i`, negated on
/// `j`. Zero-length springs contribute nothing.
pub fn apply_spring_forces(particles: &mut [MeshParticle], springs: &[Spring], ke: f32, kd: f32) {
    for s in springs {
        let delta = particles[s.j].base.pos - particles[s.i].base.pos;
        let dist = delta.length();
        let dir = normalize_or_zero(delta);
        let dvel = particles[s.j].base.vel - particles[s.i].base.vel;

        let elastic = ke * (dist - s.rest);
        let damping = kd * dvel.dot(dir);
        let f = dir * (elastic + damping);

        particles[s.i].base.force += f;
        particles[s.j].base.force -= f;
    }
}
