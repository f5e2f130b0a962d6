//! The orchestrator: owns every collection and drives one ordered step.
//!
//! `apply_time_step` runs, per kind: clear force accumulators, apply force
//! fields, apply SPH and spring forces, integrate, resolve collisions, then
//! age and respawn expired particles. The ordering is a correctness
//! requirement; reordering phases changes the simulated physics.
//!
//! Structural mutation (adding or removing particles, geometry, fields) is
//! only allowed between steps.

use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::collision::{
    advance, advance_sized, nearest_hit_sphere, resolve_sphere_pair, surface_response,
};
use crate::config::SimConfig;
use crate::emitter::{Emitter, PositionPolicy, VelocityPolicy};
use crate::fluids::Fluid;
use crate::forces::ForceField;
use crate::geometry::Geometry;
use crate::integrator::SolverKind;
use crate::math::truncate;
use crate::meshes::{Mesh1d, Mesh2d};
use crate::particle::{AgentParticle, FreeParticle, ParticleBase, SizedParticle};
use crate::snapshot::{GeometrySnapshot, ParticleSnapshot};

/// Restitution used for particle kinds that carry no bounce of their own
/// (mesh and fluid particles).
const DEFAULT_BOUNCE: f32 = 0.8;
/// Friction used for particle kinds that carry no friction of their own.
const DEFAULT_FRICTION: f32 = 0.2;

/// Owns all simulation state and steps it.
pub struct Simulator {
    pub config: SimConfig,
    free: Vec<FreeParticle>,
    sized: Vec<SizedParticle>,
    agents: Vec<AgentParticle>,
    geometry: Vec<Geometry>,
    fields: Vec<ForceField>,
    meshes1d: Vec<Mesh1d>,
    meshes2d: Vec<Mesh2d>,
    fluids: Vec<Fluid>,
    emitter: Emitter,
    elapsed: f32,
    next_free_index: usize,
    next_sized_index: usize,
    next_agent_index: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            free: Vec::new(),
            sized: Vec::new(),
            agents: Vec::new(),
            geometry: Vec::new(),
            fields: Vec::new(),
            meshes1d: Vec::new(),
            meshes2d: Vec::new(),
            fluids: Vec::new(),
            emitter: Emitter::new(
                PositionPolicy::AtPoint(Vec3::ZERO),
                VelocityPolicy::Constant(Vec3::ZERO),
                0,
            ),
            elapsed: 0.0,
            next_free_index: 0,
            next_sized_index: 0,
            next_agent_index: 0,
        }
    }

    /// Simulation clock: total simulated time, in seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn set_emitter(&mut self, emitter: Emitter) {
        self.emitter = emitter;
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    // ----- building the scene

    /// Add a free particle initialised by the emitter. Returns its insertion
    /// index, which is assigned once and never reused for this collection.
    pub fn add_free(&mut self) -> usize {
        let index = self.next_free_index;
        self.next_free_index += 1;
        let mut p = FreeParticle::default();
        p.base.index = index;
        self.emitter.emit_free(&mut p);
        prime_history(&mut p.base, self.config.solver, self.config.dt);
        self.free.push(p);
        index
    }

    pub fn add_sized(&mut self) -> usize {
        let index = self.next_sized_index;
        self.next_sized_index += 1;
        let mut p = SizedParticle::default();
        p.free.base.index = index;
        self.emitter.emit_sized(&mut p);
        prime_history(&mut p.free.base, self.config.solver, self.config.dt);
        self.sized.push(p);
        index
    }

    /// Agents are configured by the caller (target, behaviour, limits), not
    /// by the emitter.
    pub fn add_agent(&mut self, mut agent: AgentParticle) -> usize {
        let index = self.next_agent_index;
        self.next_agent_index += 1;
        agent.sized.free.base.index = index;
        self.agents.push(agent);
        index
    }

    pub fn add_geometry(&mut self, g: Geometry) {
        self.geometry.push(g);
    }

    pub fn add_field(&mut self, f: ForceField) {
        self.fields.push(f);
    }

    pub fn add_mesh1d(&mut self, m: Mesh1d) {
        self.meshes1d.push(m);
    }

    pub fn add_mesh2d(&mut self, m: Mesh2d) {
        self.meshes2d.push(m);
    }

    pub fn add_fluid(&mut self, f: Fluid) {
        self.fluids.push(f);
    }

    // ----- access

    pub fn free_particles(&self) -> &[FreeParticle] {
        &self.free
    }

    pub fn free_particles_mut(&mut self) -> &mut [FreeParticle] {
        &mut self.free
    }

    pub fn sized_particles(&self) -> &[SizedParticle] {
        &self.sized
    }

    pub fn sized_particles_mut(&mut self) -> &mut [SizedParticle] {
        &mut self.sized
    }

    pub fn agents(&self) -> &[AgentParticle] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [AgentParticle] {
        &mut self.agents
    }

    pub fn geometry(&self) -> &[Geometry] {
        &self.geometry
    }

    pub fn fields(&self) -> &[ForceField] {
        &self.fields
    }

    pub fn meshes1d(&self) -> &[Mesh1d] {
        &self.meshes1d
    }

    pub fn meshes1d_mut(&mut self) -> &mut [Mesh1d] {
        &mut self.meshes1d
    }

    pub fn meshes2d(&self) -> &[Mesh2d] {
        &self.meshes2d
    }

    pub fn meshes2d_mut(&mut self) -> &mut [Mesh2d] {
        &mut self.meshes2d
    }

    pub fn fluids(&self) -> &[Fluid] {
        &self.fluids
    }

    pub fn fluids_mut(&mut self) -> &mut [Fluid] {
        &mut self.fluids
    }

    // ----- removal, permitted only between steps

    /// Swap-remove: O(1), does not renumber the survivors' insertion
    /// indices.
    pub fn remove_free(&mut self, at: usize) -> FreeParticle {
        self.free.swap_remove(at)
    }

    pub fn remove_sized(&mut self, at: usize) -> SizedParticle {
        self.sized.swap_remove(at)
    }

    pub fn remove_agent(&mut self, at: usize) -> AgentParticle {
        self.agents.swap_remove(at)
    }

    pub fn clear_particles(&mut self) {
        self.free.clear();
        self.sized.clear();
        self.agents.clear();
        self.next_free_index = 0;
        self.next_sized_index = 0;
        self.next_agent_index = 0;
    }

    pub fn clear_geometry(&mut self) {
        self.geometry.clear();
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }

    /// Drop everything and rewind the clock.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing simulation: {} free, {} sized, {} agents, {} geometries",
            self.free.len(),
            self.sized.len(),
            self.agents.len(),
            self.geometry.len()
        );
        self.clear_particles();
        self.clear_geometry();
        self.clear_fields();
        self.meshes1d.clear();
        self.meshes2d.clear();
        self.fluids.clear();
        self.elapsed = 0.0;
    }

    /// Re-emit every lifetime-bearing particle in place and rewind the
    /// clock. Meshes, fluids and the static scene keep their state.
    pub fn reset(&mut self) {
        log::debug!("resetting {} free and {} sized particles", self.free.len(), self.sized.len());
        let (solver, dt) = (self.config.solver, self.config.dt);
        for p in &mut self.free {
            self.emitter.emit_free(p);
            prime_history(&mut p.base, solver, dt);
        }
        for p in &mut self.sized {
            self.emitter.emit_sized(p);
            prime_history(&mut p.free.base, solver, dt);
        }
        for a in &mut self.agents {
            self.emitter.emit_sized(&mut a.sized);
            prime_history(&mut a.sized.free.base, solver, dt);
        }
        self.elapsed = 0.0;
    }

    // ----- snapshots for the renderer

    /// One record per particle of every kind, in collection order. Kinds
    /// without a lifetime report infinity; kinds without a radius report 0.
    pub fn particle_snapshots(&self) -> Vec<ParticleSnapshot> {
        let mut out = Vec::with_capacity(self.particle_count());
        for p in &self.free {
            out.push(ParticleSnapshot::new(&p.base, p.lifetime, 0.0));
        }
        for p in &self.sized {
            out.push(ParticleSnapshot::new(&p.free.base, p.free.lifetime, p.radius));
        }
        for a in &self.agents {
            out.push(ParticleSnapshot::new(
                &a.sized.free.base,
                a.sized.free.lifetime,
                a.sized.radius,
            ));
        }
        for m in &self.meshes1d {
            for p in &m.particles {
                out.push(ParticleSnapshot::new(&p.base, f32::INFINITY, 0.0));
            }
        }
        for m in &self.meshes2d {
            for p in &m.particles {
                out.push(ParticleSnapshot::new(&p.base, f32::INFINITY, 0.0));
            }
        }
        for f in &self.fluids {
            for p in &f.particles {
                out.push(ParticleSnapshot::new(&p.base, f32::INFINITY, 0.0));
            }
        }
        out
    }

    pub fn geometry_snapshots(&self) -> Vec<GeometrySnapshot> {
        self.geometry.iter().map(GeometrySnapshot::from).collect()
    }

    fn particle_count(&self) -> usize {
        self.free.len()
            + self.sized.len()
            + self.agents.len()
            + self.meshes1d.iter().map(|m| m.particles.len()).sum::<usize>()
            + self.meshes2d.iter().map(|m| m.particles.len()).sum::<usize>()
            + self.fluids.iter().map(|f| f.particles.len()).sum::<usize>()
    }

    // ----- stepping

    /// Advance the whole simulation by one `config.dt`.
    pub fn apply_time_step(&mut self) {
        let dt = self.config.dt;
        let solver = self.config.solver;

        // (a) clear every force accumulator
        for p in &mut self.free {
            p.base.force = Vec3::ZERO;
        }
        for p in &mut self.sized {
            p.free.base.force = Vec3::ZERO;
        }
        for a in &mut self.agents {
            a.sized.free.base.force = Vec3::ZERO;
        }
        for m in &mut self.meshes1d {
            for p in &mut m.particles {
                p.base.force = Vec3::ZERO;
            }
        }
        for m in &mut self.meshes2d {
            for p in &mut m.particles {
                p.base.force = Vec3::ZERO;
            }
        }
        for f in &mut self.fluids {
            for p in &mut f.particles {
                p.base.force = Vec3::ZERO;
            }
        }

        // (b) force fields, ambient gravity and viscous drag
        let gravity = self.config.gravity;
        let drag = self.config.viscous_drag;
        let fields = &self.fields;
        for p in &mut self.free {
            if p.fixed || p.starttime > 0.0 {
                continue;
            }
            accumulate_field_forces(&mut p.base, p.charge, fields, gravity, drag);
        }
        for p in &mut self.sized {
            if p.free.fixed || p.free.starttime > 0.0 {
                continue;
            }
            accumulate_field_forces(&mut p.free.base, p.free.charge, fields, gravity, drag);
        }
        for m in &mut self.meshes1d {
            for p in &mut m.particles {
                if !p.fixed {
                    accumulate_field_forces(&mut p.base, p.charge, fields, gravity, drag);
                }
            }
        }
        for m in &mut self.meshes2d {
            for p in &mut m.particles {
                if !p.fixed {
                    accumulate_field_forces(&mut p.base, p.charge, fields, gravity, drag);
                }
            }
        }
        for f in &mut self.fluids {
            for p in &mut f.particles {
                p.base.force += gravity * p.base.mass;
                for field in fields {
                    if field.applies_to_fluids() {
                        p.base.force += field.force(p.base.pos, p.base.vel, p.base.mass, 0.0);
                    }
                }
            }
        }
        // agents take only their steering force
        for a in &mut self.agents {
            if a.sized.free.fixed {
                continue;
            }
            a.sized.free.base.force = a.steering();
        }

        // (c) spring and SPH forces; must complete before any integration
        for m in &mut self.meshes1d {
            m.update_forces();
        }
        for m in &mut self.meshes2d {
            m.update_forces();
        }
        for f in &mut self.fluids {
            f.update_forces();
        }

        // (d) integrate and (e) resolve collisions, per particle
        self.advance_free_particles();

        for m in &mut self.meshes1d {
            for p in &mut m.particles {
                if !p.fixed {
                    advance(&mut p.base, DEFAULT_BOUNCE, DEFAULT_FRICTION, &self.geometry, solver, dt);
                }
            }
        }
        for m in &mut self.meshes2d {
            for p in &mut m.particles {
                if !p.fixed {
                    advance(&mut p.base, DEFAULT_BOUNCE, DEFAULT_FRICTION, &self.geometry, solver, dt);
                }
            }
        }
        for f in &mut self.fluids {
            for p in &mut f.particles {
                advance(&mut p.base, DEFAULT_BOUNCE, DEFAULT_FRICTION, &self.geometry, solver, dt);
            }
        }

        self.advance_agents();

        // optional particle-particle pass, sequential by design
        if self.config.particle_collisions {
            self.resolve_particle_pairs();
        }

        // (f) age lifetime-bearing kinds; respawn in place on expiry
        let emitter = &mut self.emitter;
        for p in &mut self.free {
            if p.fixed {
                continue;
            }
            if p.starttime > 0.0 {
                p.starttime -= dt;
                continue;
            }
            p.lifetime -= dt;
            if p.lifetime <= 0.0 {
                emitter.emit_free(p);
                prime_history(&mut p.base, solver, dt);
            }
        }
        for p in &mut self.sized {
            if p.free.fixed {
                continue;
            }
            if p.free.starttime > 0.0 {
                p.free.starttime -= dt;
                continue;
            }
            p.free.lifetime -= dt;
            if p.free.lifetime <= 0.0 {
                emitter.emit_sized(p);
                prime_history(&mut p.free.base, solver, dt);
            }
        }

        self.elapsed += dt;
    }

    fn advance_free_particles(&mut self) {
        let dt = self.config.dt;
        let solver = self.config.solver;
        let geometry = &self.geometry;

        #[cfg(feature = "parallel")]
        {
            self.free.par_iter_mut().for_each(|p| {
                if !p.fixed && p.starttime <= 0.0 {
                    advance(&mut p.base, p.bounce, p.friction, geometry, solver, dt);
                }
            });
            self.sized.par_iter_mut().for_each(|p| {
                if !p.free.fixed && p.free.starttime <= 0.0 {
                    advance_sized(
                        &mut p.free.base,
                        p.radius,
                        p.free.bounce,
                        p.free.friction,
                        geometry,
                        solver,
                        dt,
                    );
                }
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for p in &mut self.free {
                if !p.fixed && p.starttime <= 0.0 {
                    advance(&mut p.base, p.bounce, p.friction, geometry, solver, dt);
                }
            }
            for p in &mut self.sized {
                if !p.free.fixed && p.free.starttime <= 0.0 {
                    advance_sized(
                        &mut p.free.base,
                        p.radius,
                        p.free.bounce,
                        p.free.friction,
                        geometry,
                        solver,
                        dt,
                    );
                }
            }
        }
    }

    /// Steering, truncated semi-implicit integration, then collisions.
    /// Agents cap their speed at `max_speed` after every velocity change.
    fn advance_agents(&mut self) {
        let dt = self.config.dt;
        for a in &mut self.agents {
            if a.sized.free.fixed {
                continue;
            }
            let base = &mut a.sized.free.base;
            let pred_vel = truncate(base.vel + base.force / base.mass * dt, a.max_speed);
            let pred_pos = base.pos + pred_vel * dt;

            let hit = nearest_hit_sphere(&self.geometry, base.pos, pred_pos, a.sized.radius);
            base.save_position();
            match hit {
                None => {
                    base.pos = pred_pos;
                    base.vel = pred_vel;
                }
                Some(hit) => {
                    let (pos, vel) = surface_response(
                        &hit,
                        pred_pos,
                        pred_vel,
                        a.sized.free.bounce,
                        a.sized.free.friction,
                    );
                    base.pos = pos;
                    base.vel = truncate(vel, a.max_speed);
                }
            }
        }
    }

    /// Sphere-sphere resolution over sized particles and agents. O(n^2) and
    /// sequential; geometry resolution has already clamped positions.
    fn resolve_particle_pairs(&mut self) {
        let n = self.sized.len();
        for i in 0..n {
            for j in i + 1..n {
                let (left, right) = self.sized.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];
                resolve_sphere_pair(
                    &mut a.free.base,
                    a.radius,
                    a.free.fixed,
                    &mut b.free.base,
                    b.radius,
                    b.free.fixed,
                );
            }
        }
        let m = self.agents.len();
        for i in 0..m {
            for j in i + 1..m {
                let (left, right) = self.agents.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];
                resolve_sphere_pair(
                    &mut a.sized.free.base,
                    a.sized.radius,
                    a.sized.free.fixed,
                    &mut b.sized.free.base,
                    b.sized.radius,
                    b.sized.free.fixed,
                );
            }
        }
        // agents against sized particles
        for a in &mut self.agents {
            for s in &mut self.sized {
                resolve_sphere_pair(
                    &mut a.sized.free.base,
                    a.sized.radius,
                    a.sized.free.fixed,
                    &mut s.free.base,
                    s.radius,
                    s.free.fixed,
                );
            }
        }
    }
}

/// Accumulate field forces, ambient gravity and viscous drag into one
/// particle.
fn accumulate_field_forces(
    base: &mut ParticleBase,
    charge: f32,
    fields: &[ForceField],
    gravity: Vec3,
    drag: f32,
) {
    base.force += gravity * base.mass;
    for field in fields {
        base.force += field.force(base.pos, base.vel, base.mass, charge);
    }
    base.force += base.vel * -drag;
}

/// After emission the history slot equals the position; Verlet needs it to
/// encode the initial velocity instead.
fn prime_history(base: &mut ParticleBase, solver: SolverKind, dt: f32) {
    if solver == SolverKind::Verlet {
        base.prev_pos = base.pos - base.vel * dt;
    }
}
