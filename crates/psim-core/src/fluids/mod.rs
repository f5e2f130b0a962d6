//! SPH fluid solver.
//!
//! Density is estimated with the poly6 kernel, pressure forces with the spiky
//! gradient, viscosity with the standard Laplacian kernel. All kernels vanish
//! exactly at separations >= the smoothing radius. Neighbourhoods are the
//! full O(n^2) pairwise scan, which is fine for the particle counts this
//! solver targets.

use glam::Vec3;
use std::f32::consts::PI;

use crate::error::{Error, Result};
use crate::particle::FluidParticle;

/// Default speed of sound in the equation of state, m/s.
pub const SPEED_OF_SOUND: f32 = 343.0;

/// Poly6 smoothing kernel for density estimation.
///
/// Returns `W(r, h) = 315 / (64 * PI * h^9) * (h^2 - r^2)^3` when `r < h`,
/// and `0.0` when `r >= h`. Takes the squared separation to spare a sqrt.
/// Peak value at r = 0 is `315 / (64 * PI * h^3)`.
#[inline]
pub fn poly6_kernel(r_sq: f32, h: f32) -> f32 {
    let h2 = h * h;
    if r_sq >= h2 {
        return 0.0;
    }
    let diff = h2 - r_sq;
    let h9 = h2 * h2 * h2 * h2 * h; // h^9
    let coeff = 315.0 / (64.0 * PI * h9);
    coeff * diff * diff * diff
}

/// Spiky kernel gradient for the pressure force.
///
/// Returns `(r / r_len) * (-45 / (PI * h^6)) * (h - r_len)^2` when
/// `r_len < h` and `r_len > 1e-6`, and `Vec3::ZERO` otherwise.
#[inline]
pub fn spiky_gradient(r: Vec3, r_len: f32, h: f32) -> Vec3 {
    if r_len >= h || r_len <= 1e-6 {
        return Vec3::ZERO;
    }
    let h6 = h * h * h * h * h * h;
    let coeff = -45.0 / (PI * h6);
    let diff = h - r_len;
    (r / r_len) * coeff * diff * diff
}

/// Viscosity kernel Laplacian: `45 / (PI * h^6) * (h - r)` for `r < h`,
/// else 0.
#[inline]
pub fn viscosity_laplacian(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let h6 = h * h * h * h * h * h;
    (45.0 / (PI * h6)) * (h - r)
}

/// A body of SPH particles sharing one parameter set.
#[derive(Clone, Debug)]
pub struct Fluid {
    pub particles: Vec<FluidParticle>,
    volume: f32,
    rest_density: f32,
    viscosity: f32,
    smoothing_radius: f32,
    speed_of_sound: f32,
}

impl Fluid {
    /// Allocates `n` particles with mass `rest_density * volume / n` each.
    /// Positions and velocities start at zero; the caller seeds them.
    pub fn new(
        n: usize,
        volume: f32,
        rest_density: f32,
        viscosity: f32,
        smoothing_radius: f32,
    ) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidFluid("fluid needs at least one particle".into()));
        }
        if volume <= 0.0 || rest_density <= 0.0 {
            return Err(Error::InvalidFluid(
                "fluid volume and rest density must be positive".into(),
            ));
        }
        if viscosity < 0.0 {
            return Err(Error::InvalidFluid("viscosity must be non-negative".into()));
        }
        if smoothing_radius <= 0.0 {
            return Err(Error::InvalidFluid(
                "smoothing radius must be positive".into(),
            ));
        }

        let mass = rest_density * volume / n as f32;
        let mut particles = Vec::with_capacity(n);
        for i in 0..n {
            let mut p = FluidParticle::default();
            p.base.index = i;
            p.base.mass = mass;
            particles.push(p);
        }
        Ok(Self {
            particles,
            volume,
            rest_density,
            viscosity,
            smoothing_radius,
            speed_of_sound: SPEED_OF_SOUND,
        })
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn rest_density(&self) -> f32 {
        self.rest_density
    }

    pub fn viscosity(&self) -> f32 {
        self.viscosity
    }

    pub fn smoothing_radius(&self) -> f32 {
        self.smoothing_radius
    }

    pub fn set_speed_of_sound(&mut self, c: f32) {
        self.speed_of_sound = c;
    }

    /// Recompute density, pressure and the pressure + viscosity forces for
    /// every particle. Densities and pressures are rebuilt from scratch;
    /// forces are accumulated on top of whatever the caller already folded
    /// into the accumulators.
    pub fn update_forces(&mut self) {
        let h = self.smoothing_radius;
        let n = self.particles.len();

        // density (the self term is W(0)) and equation-of-state pressure
        for i in 0..n {
            let mut density = 0.0;
            for j in 0..n {
                let r_sq = self.particles[i]
                    .base
                    .pos
                    .distance_squared(self.particles[j].base.pos);
                density += self.particles[j].base.mass * poly6_kernel(r_sq, h);
            }
            self.particles[i].density = density;
            self.particles[i].pressure =
                self.speed_of_sound * self.speed_of_sound * (density - self.rest_density);
        }

        // symmetric pressure and viscosity accelerations
        for i in 0..n {
            let pi = self.particles[i];
            let mut acc = Vec3::ZERO;
            for j in 0..n {
                if j == i {
                    continue;
                }
                let pj = self.particles[j];
                // gradient is taken at r_i - r_j so positive pressure pushes
                // the pair apart
                let from_j = pi.base.pos - pj.base.pos;
                let r = from_j.length();

                let pressure_term = -pj.base.mass
                    * (pi.pressure / (pi.density * pi.density)
                        + pj.pressure / (pj.density * pj.density));
                acc += spiky_gradient(from_j, r, h) * pressure_term;

                let visc_term = self.viscosity * pj.base.mass
                    / (pi.density * pj.density)
                    * viscosity_laplacian(r, h);
                acc += (pj.base.vel - pi.base.vel) * visc_term;
            }
            self.particles[i].base.force += acc * pi.base.mass;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poly6_cutoff_is_exact() {
        let h = 0.5;
        assert_eq!(poly6_kernel(h * h, h), 0.0);
        assert_eq!(poly6_kernel(h * h * 4.0, h), 0.0);
        assert!(poly6_kernel(h * h * 0.99, h) > 0.0);
    }

    #[test]
    fn poly6_peak_matches_closed_form() {
        let h = 0.3;
        let expected = 315.0 / (64.0 * PI * h * h * h);
        assert!((poly6_kernel(0.0, h) - expected).abs() / expected < 1e-5);
    }

    #[test]
    fn spiky_gradient_points_against_separation() {
        let h = 1.0;
        let r = Vec3::new(0.5, 0.0, 0.0);
        let g = spiky_gradient(r, 0.5, h);
        assert!(g.x < 0.0, "gradient points from j toward i");
        assert_eq!(spiky_gradient(r * 4.0, 2.0, h), Vec3::ZERO);
    }

    #[test]
    fn viscosity_laplacian_cutoff() {
        assert_eq!(viscosity_laplacian(1.0, 1.0), 0.0);
        assert!(viscosity_laplacian(0.5, 1.0) > 0.0);
    }

    #[test]
    fn invalid_parameters_fail_fast() {
        assert!(Fluid::new(0, 1.0, 1000.0, 0.001, 0.1).is_err());
        assert!(Fluid::new(10, -1.0, 1000.0, 0.001, 0.1).is_err());
        assert!(Fluid::new(10, 1.0, 1000.0, 0.001, 0.0).is_err());
        assert!(Fluid::new(10, 1.0, 1000.0, -0.5, 0.1).is_err());
    }

    #[test]
    fn mass_divides_rest_mass_evenly() {
        let f = Fluid::new(8, 0.01, 1000.0, 0.001, 0.1).unwrap();
        for p in &f.particles {
            assert!((p.base.mass - 1.25).abs() < 1e-5);
        }
    }

    #[test]
    fn compressed_pair_repels_symmetrically() {
        let mut f = Fluid::new(2, 0.01, 1000.0, 0.0, 0.1).unwrap();
        f.particles[0].base.pos = Vec3::ZERO;
        f.particles[1].base.pos = Vec3::new(0.05, 0.0, 0.0);
        f.update_forces();
        let f0 = f.particles[0].base.force;
        let f1 = f.particles[1].base.force;
        assert!(f0.x < 0.0 && f1.x > 0.0, "overdense pair must push apart");
        assert!((f0 + f1).length() < f0.length() * 1e-3, "forces are equal and opposite");
    }

    #[test]
    fn density_is_rebuilt_not_accumulated() {
        let mut f = Fluid::new(2, 0.01, 1000.0, 0.0, 0.1).unwrap();
        f.particles[1].base.pos = Vec3::new(0.05, 0.0, 0.0);
        f.update_forces();
        let first = f.particles[0].density;
        f.particles[0].base.force = Vec3::ZERO;
        f.particles[1].base.force = Vec3::ZERO;
        f.update_forces();
        assert_eq!(f.particles[0].density, first);
    }

    #[test]
    fn isolated_particle_feels_no_fluid_force() {
        let mut f = Fluid::new(2, 0.01, 1000.0, 0.001, 0.1).unwrap();
        f.particles[1].base.pos = Vec3::new(10.0, 0.0, 0.0);
        f.update_forces();
        assert_eq!(f.particles[0].base.force, Vec3::ZERO);
    }
}
