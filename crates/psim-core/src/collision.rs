//! Collision detection and response against static geometry, plus the
//! optional sphere-sphere pass for sized particles.

use glam::Vec3;

use crate::geometry::{Geometry, SurfaceHit};
use crate::integrator::{integrate, SolverKind};
use crate::math::normalize_or_zero;
use crate::particle::ParticleBase;

/// Nearest contact along the segment `p1 -> p2` over all primitives.
/// Minimum parametric t wins; the first primitive in list order breaks exact
/// ties.
pub fn nearest_hit(geometry: &[Geometry], p1: Vec3, p2: Vec3) -> Option<SurfaceHit> {
    let mut best: Option<SurfaceHit> = None;
    for geom in geometry {
        if let Some(hit) = geom.hit(p1, p2) {
            if best.as_ref().map_or(true, |b| hit.t < b.t) {
                best = Some(hit);
            }
        }
    }
    best
}

/// Sphere variant of [`nearest_hit`]: nearest contact for a sphere whose
/// centre travels `p1 -> p2`, against every primitive offset by the radius.
pub fn nearest_hit_sphere(
    geometry: &[Geometry],
    p1: Vec3,
    p2: Vec3,
    radius: f32,
) -> Option<SurfaceHit> {
    let mut best: Option<SurfaceHit> = None;
    for geom in geometry {
        if let Some(hit) = geom.hit_sphere(p1, p2, radius) {
            if best.as_ref().map_or(true, |b| hit.t < b.t) {
                best = Some(hit);
            }
        }
    }
    best
}

/// Post-contact state for a predicted (position, velocity) pair.
///
/// The predicted position is reflected about the contact plane, scaled by
/// (1 + bounce) so bounce = 1 mirrors it and bounce = 0 leaves it on the
/// surface. Velocity splits at the surface: the normal component is scaled
/// by -bounce, the tangential one by (1 - friction).
pub fn surface_response(
    hit: &SurfaceHit,
    pred_pos: Vec3,
    pred_vel: Vec3,
    bounce: f32,
    friction: f32,
) -> (Vec3, Vec3) {
    let n = hit.normal;
    let depth = (pred_pos - hit.point).dot(n);
    let pos = pred_pos - n * ((1.0 + bounce) * depth);

    let v_n = n * pred_vel.dot(n);
    let v_t = pred_vel - v_n;
    let vel = v_t * (1.0 - friction) - v_n * bounce;
    (pos, vel)
}

/// Integrate one particle and resolve it against the scene. Writes the final
/// post-step state into `base` and keeps the Verlet history consistent.
/// Fixed particles must be filtered out by the caller.
pub fn advance(
    base: &mut ParticleBase,
    bounce: f32,
    friction: f32,
    geometry: &[Geometry],
    solver: SolverKind,
    dt: f32,
) {
    let (pred_pos, pred_vel) = integrate(base, solver, dt);
    let hit = nearest_hit(geometry, base.pos, pred_pos);
    base.save_position();
    match hit {
        None => {
            base.pos = pred_pos;
            base.vel = pred_vel;
        }
        Some(hit) => {
            let (pos, vel) = surface_response(&hit, pred_pos, pred_vel, bounce, friction);
            base.pos = pos;
            base.vel = vel;
            if solver == SolverKind::Verlet {
                // rebuild history so the next Verlet step sees the
                // post-collision velocity
                base.prev_pos = base.pos - base.vel * dt;
            }
        }
    }
}

/// [`advance`] for a particle with spatial extent: the scene is resolved
/// against the centre's trajectory with every surface offset by the radius,
/// so a resting sphere's centre settles one radius off the surface.
pub fn advance_sized(
    base: &mut ParticleBase,
    radius: f32,
    bounce: f32,
    friction: f32,
    geometry: &[Geometry],
    solver: SolverKind,
    dt: f32,
) {
    let (pred_pos, pred_vel) = integrate(base, solver, dt);
    let hit = nearest_hit_sphere(geometry, base.pos, pred_pos, radius);
    base.save_position();
    match hit {
        None => {
            base.pos = pred_pos;
            base.vel = pred_vel;
        }
        Some(hit) => {
            let (pos, vel) = surface_response(&hit, pred_pos, pred_vel, bounce, friction);
            base.pos = pos;
            base.vel = vel;
            if solver == SolverKind::Verlet {
                base.prev_pos = base.pos - base.vel * dt;
            }
        }
    }
}

/// Sphere-sphere resolution for one overlapping pair: positional separation
/// along the line of centres, then an exchange of normal velocity components.
/// A fixed particle keeps its position and velocity; the other takes the full
/// separation.
pub fn resolve_sphere_pair(
    a: &mut ParticleBase,
    radius_a: f32,
    fixed_a: bool,
    b: &mut ParticleBase,
    radius_b: f32,
    fixed_b: bool,
) {
    if fixed_a && fixed_b {
        return;
    }
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let overlap = radius_a + radius_b - dist;
    if overlap <= 0.0 {
        return;
    }
    let n = normalize_or_zero(delta);
    if n == Vec3::ZERO {
        // coincident centres: no line of centres to separate along
        return;
    }

    if fixed_a {
        b.pos += n * overlap;
    } else if fixed_b {
        a.pos -= n * overlap;
    } else {
        a.pos -= n * (overlap * 0.5);
        b.pos += n * (overlap * 0.5);
    }

    let vn_a = a.vel.dot(n);
    let vn_b = b.vel.dot(n);
    // separating already, leave velocities alone
    if vn_b - vn_a > 0.0 {
        return;
    }
    if !fixed_a {
        a.vel += n * (vn_b - vn_a);
    }
    if !fixed_b {
        b.vel += n * (vn_a - vn_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Plane;

    fn floor() -> Vec<Geometry> {
        vec![Geometry::Plane(Plane::new(Vec3::Y, Vec3::ZERO).unwrap())]
    }

    #[test]
    fn nearest_hit_picks_minimum_t() {
        let scene = vec![
            Geometry::Plane(Plane::new(Vec3::Y, Vec3::new(0.0, -1.0, 0.0)).unwrap()),
            Geometry::Plane(Plane::new(Vec3::Y, Vec3::ZERO).unwrap()),
        ];
        let hit = nearest_hit(&scene, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -2.0, 0.0)).unwrap();
        assert!(hit.point.y.abs() < 1e-5, "must stop at the higher plane first");
    }

    #[test]
    fn elastic_bounce_preserves_normal_speed() {
        let scene = floor();
        let mut base = ParticleBase::default();
        base.pos = Vec3::new(0.0, 0.05, 0.0);
        base.vel = Vec3::new(1.0, -10.0, 0.0);
        advance(&mut base, 1.0, 0.0, &scene, SolverKind::EulerSemi, 0.01);
        assert!(base.vel.y > 0.0, "normal velocity flips sign");
        assert!((base.vel.y.abs() - 10.0).abs() < 1e-4, "speed magnitude preserved, got {}", base.vel.y);
        assert!((base.vel.x - 1.0).abs() < 1e-5, "tangential untouched at friction 0");
        assert!(base.pos.y > 0.0, "reflected back above the surface");
    }

    #[test]
    fn inelastic_hit_zeroes_normal_velocity() {
        let scene = floor();
        let mut base = ParticleBase::default();
        base.pos = Vec3::new(0.0, 0.05, 0.0);
        base.vel = Vec3::new(1.0, -10.0, 0.0);
        advance(&mut base, 0.0, 0.0, &scene, SolverKind::EulerSemi, 0.01);
        assert!(base.vel.y.abs() < 1e-5);
        assert!((base.vel.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn friction_damps_tangential_velocity() {
        let scene = floor();
        let mut base = ParticleBase::default();
        base.pos = Vec3::new(0.0, 0.05, 0.0);
        base.vel = Vec3::new(2.0, -10.0, 0.0);
        advance(&mut base, 1.0, 0.5, &scene, SolverKind::EulerSemi, 0.01);
        assert!((base.vel.x - 1.0).abs() < 1e-5, "half the tangential speed survives");
    }

    #[test]
    fn miss_keeps_prediction_and_saves_history() {
        let scene = floor();
        let mut base = ParticleBase::default();
        base.pos = Vec3::new(0.0, 5.0, 0.0);
        base.vel = Vec3::X;
        let before = base.pos;
        advance(&mut base, 0.8, 0.2, &scene, SolverKind::EulerSemi, 0.01);
        assert_eq!(base.prev_pos, before);
        assert!((base.pos - Vec3::new(0.01, 5.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn verlet_history_rebuilt_after_contact() {
        let scene = floor();
        let mut base = ParticleBase::default();
        base.pos = Vec3::new(0.0, 0.05, 0.0);
        base.prev_pos = Vec3::new(0.0, 0.15, 0.0);
        advance(&mut base, 1.0, 0.0, &scene, SolverKind::Verlet, 0.01);
        let implied = (base.pos - base.prev_pos) / 0.01;
        assert!((implied - base.vel).length() < 1e-4, "prev must encode post-collision velocity");
    }

    #[test]
    fn sized_particle_rests_one_radius_off_the_floor() {
        let scene = floor();
        let mut base = ParticleBase::default();
        base.pos = Vec3::new(0.0, 1.0, 0.0);
        // constant pull toward the floor, fully inelastic contact
        for _ in 0..500 {
            base.force = Vec3::new(0.0, -9.81, 0.0);
            advance_sized(&mut base, 0.25, 0.0, 0.2, &scene, SolverKind::EulerSemi, 0.01);
        }
        assert!(
            (base.pos.y - 0.25).abs() < 1e-3,
            "centre must settle at the radius, got y = {}",
            base.pos.y
        );
        assert!(base.vel.y.abs() < 1e-3);
    }

    #[test]
    fn overlapping_spheres_separate_and_swap_normal_velocity() {
        let mut a = ParticleBase::default();
        let mut b = ParticleBase::default();
        a.pos = Vec3::new(-0.4, 0.0, 0.0);
        b.pos = Vec3::new(0.4, 0.0, 0.0);
        a.vel = Vec3::X;
        b.vel = Vec3::NEG_X;
        resolve_sphere_pair(&mut a, 0.5, false, &mut b, 0.5, false);
        assert!((b.pos.x - a.pos.x - 1.0).abs() < 1e-5, "separated to touching distance");
        assert!((a.vel.x + 1.0).abs() < 1e-5 && (b.vel.x - 1.0).abs() < 1e-5, "normal components exchanged");
    }

    #[test]
    fn fixed_sphere_takes_no_motion() {
        let mut a = ParticleBase::default();
        let mut b = ParticleBase::default();
        a.pos = Vec3::ZERO;
        b.pos = Vec3::new(0.5, 0.0, 0.0);
        b.vel = Vec3::NEG_X;
        let a_before = a;
        resolve_sphere_pair(&mut a, 0.5, true, &mut b, 0.5, false);
        assert_eq!(a, a_before);
        assert!(b.pos.x >= 1.0 - 1e-5);
    }
}
