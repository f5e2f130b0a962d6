use crate::error::{Error, Result};
use crate::particle::MeshParticle;

use super::{apply_spring_forces, Spring};

/// A chain of spring-linked particles.
///
/// Stretch links join immediate neighbours; optional bend links join every
/// (i, i+2) span with their own rest lengths, resisting folding.
#[derive(Clone, Debug)]
pub struct Mesh1d {
    pub particles: Vec<MeshParticle>,
    ke: f32,
    kd: f32,
    pub stretch: bool,
    pub bend: bool,
    stretch_links: Vec<Spring>,
    bend_links: Vec<Spring>,
}

impl Mesh1d {
    /// A chain needs at least two particles.
    pub fn new(n: usize, ke: f32, kd: f32) -> Result<Self> {
        if n < 2 {
            return Err(Error::InvalidMesh(format!(
                "1d mesh needs at least 2 particles, got {n}"
            )));
        }
        let mut particles = Vec::with_capacity(n);
        for i in 0..n {
            let mut p = MeshParticle::default();
            p.base.index = i;
            particles.push(p);
        }
        Ok(Self {
            particles,
            ke,
            kd,
            stretch: true,
            bend: false,
            stretch_links: Vec::new(),
            bend_links: Vec::new(),
        })
    }

    pub fn elasticity(&self) -> f32 {
        self.ke
    }

    pub fn damping(&self) -> f32 {
        self.kd
    }

    /// Record current inter-particle distances as the rest lengths of every
    /// link. Call once after laying the particles out, before stepping.
    pub fn capture_rest_state(&mut self) {
        let n = self.particles.len();
        self.stretch_links = (0..n - 1)
            .map(|i| Spring {
                i,
                j: i + 1,
                rest: self.particles[i].base.pos.distance(self.particles[i + 1].base.pos),
            })
            .collect();
        self.bend_links = (0..n.saturating_sub(2))
            .map(|i| Spring {
                i,
                j: i + 2,
                rest: self.particles[i].base.pos.distance(self.particles[i + 2].base.pos),
            })
            .collect();
    }

    /// Accumulate spring forces into the particles. Does nothing until
    /// `capture_rest_state` has run.
    pub fn update_forces(&mut self) {
        if self.stretch {
            apply_spring_forces(&mut self.particles, &self.stretch_links, self.ke, self.kd);
        }
        if self.bend {
            apply_spring_forces(&mut self.particles, &self.bend_links, self.ke, self.kd);
        }
    }
}
