//! Spawn and respawn policies.
//!
//! An [`Emitter`] is plain data plus a private random source: duplicating one
//! derives a fresh generator from an explicit seed, so two emitters can never
//! alias each other's random state.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::math::{normalize_or_zero, ZERO_LEN_SQ};
use crate::particle::{FreeParticle, SizedParticle};

/// Where a spawned particle starts.
#[derive(Clone, Copy, Debug)]
pub enum PositionPolicy {
    /// Always the same point.
    AtPoint(Vec3),
    /// Uniform over a horizontal rectangle: corner plus random fractions of
    /// the width (x) and depth (z) edges.
    Rectangle { corner: Vec3, width: f32, depth: f32 },
}

/// How a spawned particle's initial velocity is produced. Position is
/// assigned first; policies that depend on it read the already-set position.
#[derive(Clone, Copy, Debug)]
pub enum VelocityPolicy {
    Constant(Vec3),
    /// Straight down with a random speed in [0, max_speed].
    Falling { max_speed: f32 },
    /// Away from the rectangle centre `centre`, tilted up along `normal`,
    /// faster near the centre: v = normalize(pos + normal - centre) * (D2/d2)
    /// with D2 = (w^2 + h^2)/4.
    Fountain { centre: Vec3, normal: Vec3, spread_sq: f32 },
    /// Toward a random point on the far disc of a cone with apex at the
    /// source position.
    Cone { source: Vec3, disc_centre: Vec3, disc_u: Vec3, disc_v: Vec3, radius: f32 },
}

/// Per-attribute spawn policy bundle with its own random source.
#[derive(Clone, Debug)]
pub struct Emitter {
    pub position: PositionPolicy,
    pub velocity: VelocityPolicy,
    pub mass: f32,
    pub charge: f32,
    pub friction: f32,
    pub bounce: f32,
    pub lifetime: f32,
    pub starttime: f32,
    pub fixed: bool,
    /// Radius assigned to sized particles.
    pub radius: f32,
    rng: StdRng,
}

impl Emitter {
    pub fn new(position: PositionPolicy, velocity: VelocityPolicy, seed: u64) -> Self {
        Self {
            position,
            velocity,
            mass: 1.0,
            charge: 0.0,
            friction: 0.2,
            bounce: 0.8,
            lifetime: 10.0,
            starttime: 0.0,
            fixed: false,
            radius: 1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Rain of particles over a rectangle, falling straight down with random
    /// speeds up to `fall_speed`.
    pub fn shower(corner: Vec3, width: f32, depth: f32, fall_speed: f32, seed: u64) -> Self {
        Self::new(
            PositionPolicy::Rectangle { corner, width, depth },
            VelocityPolicy::Falling { max_speed: fall_speed },
            seed,
        )
    }

    /// Particles sprayed up and outward from a rectangle, faster near its
    /// centre.
    pub fn fountain(corner: Vec3, width: f32, depth: f32, seed: u64) -> Self {
        let centre = corner + Vec3::new(width * 0.5, 0.0, depth * 0.5);
        Self::new(
            PositionPolicy::Rectangle { corner, width, depth },
            VelocityPolicy::Fountain {
                centre,
                normal: Vec3::Y,
                spread_sq: (width * width + depth * depth) / 4.0,
            },
            seed,
        )
    }

    /// Conical jet from a point source along the unit `axis`. The cone's far
    /// disc has the given `radius` at distance `height`. Fails when `axis` is
    /// not unit length.
    pub fn hose(source: Vec3, axis: Vec3, radius: f32, height: f32, seed: u64) -> Result<Self> {
        if (axis.length() - 1.0).abs() > 1e-6 {
            return Err(Error::InvalidEmitter(
                "hose axis must be a unit vector".into(),
            ));
        }
        // orthonormal basis on the disc; pick the world axis least aligned
        // with the cone axis so the cross product stays well conditioned
        let helper = if axis.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        let disc_u = normalize_or_zero(axis.cross(helper));
        let disc_v = axis.cross(disc_u);
        Ok(Self::new(
            PositionPolicy::AtPoint(source),
            VelocityPolicy::Cone {
                source,
                disc_centre: source + axis * height,
                disc_u,
                disc_v,
                radius,
            },
            seed,
        ))
    }

    /// Same policies, fresh random stream. Never shares generator state with
    /// the original.
    pub fn duplicate(&self, seed: u64) -> Self {
        let mut copy = self.clone();
        copy.rng = StdRng::seed_from_u64(seed);
        copy
    }

    fn sample_position(&mut self) -> Vec3 {
        match self.position {
            PositionPolicy::AtPoint(p) => p,
            PositionPolicy::Rectangle { corner, width, depth } => {
                let rx: f32 = self.rng.gen();
                let rz: f32 = self.rng.gen();
                corner + Vec3::new(rx * width, 0.0, rz * depth)
            }
        }
    }

    fn sample_velocity(&mut self, pos: Vec3) -> Vec3 {
        match self.velocity {
            VelocityPolicy::Constant(v) => v,
            VelocityPolicy::Falling { max_speed } => {
                let r: f32 = self.rng.gen();
                Vec3::new(0.0, -r * max_speed, 0.0)
            }
            VelocityPolicy::Fountain { centre, normal, spread_sq } => {
                let d_sq = pos.distance_squared(centre);
                if d_sq < ZERO_LEN_SQ {
                    // spawn exactly at the centre: straight up
                    return normal;
                }
                normalize_or_zero(pos + normal - centre) * (spread_sq / d_sq)
            }
            VelocityPolicy::Cone { source, disc_centre, disc_u, disc_v, radius } => {
                let x: f32 = self.rng.gen::<f32>() * radius;
                let y: f32 = self.rng.gen::<f32>() * radius;
                let phi = 2.0 * core::f32::consts::PI * self.rng.gen::<f32>();
                let target = disc_centre + disc_u * (x * phi.cos()) + disc_v * (y * phi.sin());
                target - source
            }
        }
    }

    /// Initialise (or re-initialise) a free particle in place. The insertion
    /// index survives untouched.
    pub fn emit_free(&mut self, p: &mut FreeParticle) {
        let index = p.base.index;
        p.reset();
        p.base.index = index;
        p.base.pos = self.sample_position();
        p.base.save_position();
        p.base.vel = self.sample_velocity(p.base.pos);
        p.base.mass = self.mass;
        p.charge = self.charge;
        p.friction = self.friction;
        p.bounce = self.bounce;
        p.lifetime = self.lifetime;
        p.starttime = self.starttime;
        p.fixed = self.fixed;
    }

    pub fn emit_sized(&mut self, p: &mut SizedParticle) {
        self.emit_free(&mut p.free);
        p.radius = self.radius;
    }
}
