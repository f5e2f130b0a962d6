//! Numerical integration schemes.

use glam::Vec3;

use crate::particle::ParticleBase;

/// Which scheme advances (position, velocity) each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverKind {
    /// `pos' = pos + v*dt` with the pre-update velocity, then `v' = v + a*dt`.
    EulerExplicit,
    /// Velocity first, then position from the updated velocity.
    EulerSemi,
    /// Position from current and previous positions plus acceleration;
    /// velocity reconstructed as `(pos' - pos) / dt`.
    Verlet,
}

/// Predicted kinematic state for one particle. Pure: does not touch the
/// particle. Fixed particles never reach this function.
pub fn integrate(base: &ParticleBase, solver: SolverKind, dt: f32) -> (Vec3, Vec3) {
    let accel = base.force / base.mass;
    match solver {
        SolverKind::EulerExplicit => {
            let pos = base.pos + base.vel * dt;
            let vel = base.vel + accel * dt;
            (pos, vel)
        }
        SolverKind::EulerSemi => {
            let vel = base.vel + accel * dt;
            let pos = base.pos + vel * dt;
            (pos, vel)
        }
        SolverKind::Verlet => {
            let pos = base.pos + (base.pos - base.prev_pos) + accel * (dt * dt);
            let vel = (pos - base.pos) / dt;
            (pos, vel)
        }
    }
}
