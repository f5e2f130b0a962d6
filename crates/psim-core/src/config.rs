use glam::Vec3;

use crate::integrator::SolverKind;

/// Global simulation parameters.
///
/// The configuration surface is format agnostic: front-ends build one of
/// these from whatever scene description they use.
#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    /// Gravity applied to every non-fixed particle as `mass * gravity`.
    pub gravity: Vec3,
    /// Time step in seconds.
    pub dt: f32,
    /// Numerical scheme used to advance particles.
    pub solver: SolverKind,
    /// Enables the pairwise sized/agent particle collision pass.
    pub particle_collisions: bool,
    /// Viscous drag coefficient; adds `-viscous_drag * velocity` to every
    /// particle's accumulated force.
    pub viscous_drag: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            dt: 0.01,
            solver: SolverKind::EulerSemi,
            particle_collisions: false,
            viscous_drag: 0.05,
        }
    }
}
