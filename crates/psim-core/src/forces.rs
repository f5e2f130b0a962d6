//! Force field evaluators.
//!
//! Fields are summed into each particle's force accumulator once per step,
//! before SPH and spring contributions. Near-zero separations evaluate to a
//! zero contribution instead of blowing up.

use glam::Vec3;

use crate::math::{normalize_or_zero, ZERO_LEN_SQ};

/// A force contributor evaluated per particle.
#[derive(Clone, Copy, Debug)]
pub enum ForceField {
    /// Distance-independent gravity near a planet surface: F = m * g_vec.
    UniformGravity { accel: Vec3 },
    /// Inverse-square attraction toward a point mass:
    /// F = G * M * m / r^2 toward `position`.
    PointGravity { position: Vec3, mass: f32, g: f32 },
    /// Coulomb interaction with a point charge:
    /// F = k * Q * q / r^2 along the line from `position` to the particle.
    /// Like charges repel (force points away from the field).
    Electric { position: Vec3, charge: f32, k: f32 },
    /// Lorentz magnetic force: F = (q * v) x B.
    Magnetic { field: Vec3 },
}

impl ForceField {
    /// Force on a particle with the given state. Mass enters the
    /// gravitational kinds, charge the electromagnetic ones, velocity only
    /// the magnetic one.
    pub fn force(&self, pos: Vec3, vel: Vec3, mass: f32, charge: f32) -> Vec3 {
        match *self {
            ForceField::UniformGravity { accel } => accel * mass,
            ForceField::PointGravity { position, mass: field_mass, g } => {
                let to_field = position - pos;
                let r_sq = to_field.length_squared();
                if r_sq < ZERO_LEN_SQ {
                    return Vec3::ZERO;
                }
                normalize_or_zero(to_field) * (g * field_mass * mass / r_sq)
            }
            ForceField::Electric { position, charge: field_charge, k } => {
                let away = pos - position;
                let r_sq = away.length_squared();
                if r_sq < ZERO_LEN_SQ {
                    return Vec3::ZERO;
                }
                normalize_or_zero(away) * (k * field_charge * charge / r_sq)
            }
            ForceField::Magnetic { field } => (vel * charge).cross(field),
        }
    }

    /// Fluid particles carry no charge and are kept out of magnetic fields.
    pub fn applies_to_fluids(&self) -> bool {
        !matches!(self, ForceField::Magnetic { .. })
    }
}
