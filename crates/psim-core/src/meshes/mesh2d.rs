use crate::error::{Error, Result};
use crate::particle::MeshParticle;

use super::{apply_spring_forces, Spring};

/// A regular grid of spring-linked particles, stored row-major.
///
/// Stretch links join row and column neighbours. Optional bend links skip
/// one particle along rows and columns; optional shear links join the two
/// diagonals of every grid cell.
#[derive(Clone, Debug)]
pub struct Mesh2d {
    pub particles: Vec<MeshParticle>,
    rows: usize,
    cols: usize,
    ke: f32,
    kd: f32,
    pub stretch: bool,
    pub bend: bool,
    pub shear: bool,
    stretch_links: Vec<Spring>,
    bend_links: Vec<Spring>,
    shear_links: Vec<Spring>,
}

impl Mesh2d {
    /// A grid needs at least 2x2 particles.
    pub fn new(rows: usize, cols: usize, ke: f32, kd: f32) -> Result<Self> {
        if rows < 2 || cols < 2 {
            return Err(Error::InvalidMesh(format!(
                "2d mesh needs at least a 2x2 grid, got {rows}x{cols}"
            )));
        }
        let mut particles = Vec::with_capacity(rows * cols);
        for i in 0..rows * cols {
            let mut p = MeshParticle::default();
            p.base.index = i;
            particles.push(p);
        }
        Ok(Self {
            particles,
            rows,
            cols,
            ke,
            kd,
            stretch: true,
            bend: false,
            shear: false,
            stretch_links: Vec::new(),
            bend_links: Vec::new(),
            shear_links: Vec::new(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn elasticity(&self) -> f32 {
        self.ke
    }

    pub fn damping(&self) -> f32 {
        self.kd
    }

    /// Row-major flat index of grid cell (i, j).
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    fn link(&self, a: usize, b: usize) -> Spring {
        Spring {
            i: a,
            j: b,
            rest: self.particles[a].base.pos.distance(self.particles[b].base.pos),
        }
    }

    /// Record current distances as rest lengths for every link class. Call
    /// once after laying the grid out, before stepping.
    pub fn capture_rest_state(&mut self) {
        let mut stretch = Vec::new();
        let mut bend = Vec::new();
        let mut shear = Vec::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                let a = self.index(i, j);
                if i + 1 < self.rows {
                    stretch.push(self.link(a, self.index(i + 1, j)));
                }
                if j + 1 < self.cols {
                    stretch.push(self.link(a, self.index(i, j + 1)));
                }
                if i + 2 < self.rows {
                    bend.push(self.link(a, self.index(i + 2, j)));
                }
                if j + 2 < self.cols {
                    bend.push(self.link(a, self.index(i, j + 2)));
                }
                if i + 1 < self.rows && j + 1 < self.cols {
                    shear.push(self.link(a, self.index(i + 1, j + 1)));
                    shear.push(self.link(self.index(i + 1, j), self.index(i, j + 1)));
                }
            }
        }
        self.stretch_links = stretch;
        self.bend_links = bend;
        self.shear_links = shear;
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
        if self.shear {
            apply_spring_forces(&mut self.particles, &self.shear_links, self.ke, self.kd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn flat_grid(rows: usize, cols: usize) -> Mesh2d {
        let mut m = Mesh2d::new(rows, cols, 50.0, 0.5).unwrap();
        for i in 0..rows {
            for j in 0..cols {
                let at = m.index(i, j);
                m.particles[at].base.pos = Vec3::new(j as f32, 0.0, i as f32);
            }
        }
        m.capture_rest_state();
        m
    }

    #[test]
    fn degenerate_grid_rejected() {
        assert!(Mesh2d::new(1, 5, 50.0, 0.5).is_err());
        assert!(Mesh2d::new(5, 1, 50.0, 0.5).is_err());
        assert!(Mesh2d::new(2, 2, 50.0, 0.5).is_ok());
    }

    #[test]
    fn grid_at_rest_stays_force_free() {
        let mut m = flat_grid(3, 3);
        m.bend = true;
        m.shear = true;
        m.update_forces();
        for p in &m.particles {
            assert!(p.base.force.length() < 1e-5);
        }
    }

    #[test]
    fn sheared_cell_resisted_only_by_shear_links() {
        let mut m = flat_grid(2, 2);
        m.stretch = false;
        m.shear = true;
        // slide the top row sideways: row/column distances stay 1 for the
        // moved corner's column link, diagonals change
        let top = m.index(1, 1);
        m.particles[top].base.pos += Vec3::new(0.4, 0.0, 0.0);
        m.update_forces();
        assert!(m.particles[top].base.force.length() > 1e-3);
    }

    #[test]
    fn lifted_corner_is_pulled_down() {
        let mut m = flat_grid(3, 3);
        let corner = m.index(0, 0);
        m.particles[corner].base.pos += Vec3::Y * 0.2;
        m.update_forces();
        assert!(m.particles[corner].base.force.y < 0.0);
    }
}
