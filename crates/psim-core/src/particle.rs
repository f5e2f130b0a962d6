use glam::Vec3;

use crate::math::{normalize_or_zero, truncate};

/// Kinematic state shared by every particle kind.
///
/// `prev_pos` is valid Verlet history: it is written only by
/// [`ParticleBase::save_position`] (and emitter initialisation), never as a
/// side effect of integration. `index` is assigned once when the particle is
/// added to a collection and never changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBase {
    pub prev_pos: Vec3,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Force accumulator, cleared at the start of every step.
    pub force: Vec3,
    pub mass: f32,
    pub index: usize,
}

impl ParticleBase {
    pub fn new(index: usize) -> Self {
        Self { index, ..Self::default() }
    }

    /// Copy the current position into the Verlet history slot.
    #[inline]
    pub fn save_position(&mut self) {
        self.prev_pos = self.pos;
    }

    /// Reset kinematics to defaults: everything zero, mass 1. The position
    /// is left untouched so an emitter can overwrite it afterwards.
    pub fn reset(&mut self) {
        self.prev_pos = Vec3::ZERO;
        self.vel = Vec3::ZERO;
        self.force = Vec3::ZERO;
        self.mass = 1.0;
    }
}

impl Default for ParticleBase {
    fn default() -> Self {
        Self {
            prev_pos: Vec3::ZERO,
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: 1.0,
            index: 0,
        }
    }
}

/// A particle affected by force fields, collisions and ageing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FreeParticle {
    pub base: ParticleBase,
    /// Fraction of tangential velocity removed on collision, in [0,1].
    pub friction: f32,
    /// Restitution: fraction of normal speed preserved on collision, in [0,1].
    pub bounce: f32,
    pub charge: f32,
    /// Seconds of life left; expiry triggers re-emission.
    pub lifetime: f32,
    /// Seconds until the particle starts being simulated.
    pub starttime: f32,
    /// Fixed particles are never integrated or collision-resolved.
    pub fixed: bool,
}

impl FreeParticle {
    /// Reset to documented defaults (kind-specific values on top of the
    /// base reset).
    pub fn reset(&mut self) {
        self.base.reset();
        self.friction = 0.2;
        self.bounce = 0.8;
        self.charge = 0.0;
        self.lifetime = 10.0;
        self.starttime = 0.0;
        self.fixed = false;
    }
}

/// A free particle with spatial extent, for particle-particle collisions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizedParticle {
    pub free: FreeParticle,
    pub radius: f32,
}

impl SizedParticle {
    pub fn reset(&mut self) {
        self.free.reset();
        self.radius = 1.0;
    }
}

/// A particle belonging to a spring mesh. No lifetime: mesh particles never
/// expire.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshParticle {
    pub base: ParticleBase,
    pub charge: f32,
    pub fixed: bool,
}

impl MeshParticle {
    pub fn reset(&mut self) {
        self.base.reset();
        self.charge = 0.0;
        self.fixed = false;
    }
}

/// An SPH fluid particle. Density and pressure are scratch values recomputed
/// from scratch every step by the fluid solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluidParticle {
    pub base: ParticleBase,
    pub density: f32,
    pub pressure: f32,
}

impl FluidParticle {
    pub fn reset(&mut self) {
        self.base.reset();
        self.density = 0.0;
        self.pressure = 0.0;
    }
}

/// Steering behaviours an agent can combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AgentBehaviour {
    pub seek: bool,
    pub flee: bool,
    pub arrival: bool,
}

/// An autonomous sized particle steered toward (or away from) a target.
/// Agents ignore force fields; their only force is the steering force.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentParticle {
    pub sized: SizedParticle,
    pub target: Vec3,
    pub max_speed: f32,
    pub max_force: f32,
    /// Radius around the target inside which `arrival` ramps speed down.
    pub slowing_distance: f32,
    pub behaviour: AgentBehaviour,
}

impl AgentParticle {
    /// Combined steering force from the enabled behaviours, truncated to
    /// `max_force`. Each behaviour contributes `desired_velocity - velocity`:
    /// seek points the desired velocity at the target, flee away from it,
    /// arrival ramps the desired speed down inside `slowing_distance`.
    pub fn steering(&self) -> Vec3 {
        let pos = self.sized.free.base.pos;
        let vel = self.sized.free.base.vel;
        let mut steer = Vec3::ZERO;

        if self.behaviour.seek {
            let desired = normalize_or_zero(self.target - pos) * self.max_speed;
            steer += desired - vel;
        }
        if self.behaviour.flee {
            let desired = normalize_or_zero(pos - self.target) * self.max_speed;
            steer += desired - vel;
        }
        if self.behaviour.arrival {
            let offset = self.target - pos;
            let dist = offset.length();
            if dist > 1e-6 && self.slowing_distance > 0.0 {
                let clipped = (dist / self.slowing_distance * self.max_speed).min(self.max_speed);
                let desired = offset * (clipped / dist);
                steer += desired - vel;
            }
        }
        truncate(steer, self.max_force)
    }

    pub fn reset(&mut self) {
        self.sized.reset();
        self.target = Vec3::ZERO;
        self.max_speed = 1.0;
        self.max_force = 1.0;
        self.slowing_distance = 0.0;
        self.behaviour = AgentBehaviour::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_reset_applies_kind_defaults() {
        let mut p = FreeParticle::default();
        p.friction = 0.9;
        p.base.mass = 4.0;
        p.base.index = 7;
        p.reset();
        assert_eq!(p.friction, 0.2);
        assert_eq!(p.bounce, 0.8);
        assert_eq!(p.lifetime, 10.0);
        assert_eq!(p.base.mass, 1.0);
        // reset never touches the insertion index
        assert_eq!(p.base.index, 7);
    }

    #[test]
    fn save_position_copies_current() {
        let mut b = ParticleBase::default();
        b.pos = Vec3::new(1.0, 2.0, 3.0);
        b.save_position();
        assert_eq!(b.prev_pos, b.pos);
    }
}
