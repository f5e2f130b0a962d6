//! Force-based point-mass particle simulation core.
//!
//! The crate advances collections of point-mass particles (free, sized,
//! agent, spring-mesh and SPH fluid particles) under force fields, collisions
//! with static geometry and structural spring constraints, one discrete time
//! step at a time. Rendering, scene files and mesh loading live in separate
//! front-end crates; this crate only exposes read-only snapshots for them.

pub mod collision;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fluids;
pub mod forces;
pub mod geometry;
pub mod integrator;
pub mod math;
pub mod meshes;
pub mod particle;
pub mod simulator;
pub mod snapshot;

pub use config::SimConfig;
pub use error::{Error, Result};
pub use integrator::SolverKind;
pub use simulator::Simulator;
