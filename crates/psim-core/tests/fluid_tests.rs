use glam::Vec3;
use psim_core::fluids::{poly6_kernel, Fluid, SPEED_OF_SOUND};
use psim_core::forces::ForceField;
use psim_core::{SimConfig, Simulator};

fn small_blob(n_side: usize, spacing: f32) -> Fluid {
    let n = n_side * n_side * n_side;
    let mut f = Fluid::new(n, 0.001, 1000.0, 0.001, spacing * 2.5).unwrap();
    let mut at = 0;
    for x in 0..n_side {
        for y in 0..n_side {
            for z in 0..n_side {
                f.particles[at].base.pos =
                    Vec3::new(x as f32, y as f32, z as f32) * spacing;
                f.particles[at].base.prev_pos = f.particles[at].base.pos;
                at += 1;
            }
        }
    }
    f
}

#[test]
fn test_kernel_cutoff_holds_for_any_pair_beyond_h() {
    let h = 0.04;
    for k in 1..20 {
        let r = h * (1.0 + k as f32 * 0.5);
        assert_eq!(poly6_kernel(r * r, h), 0.0, "kernel must vanish at r = {r}");
    }
    let peak = 315.0 / (64.0 * std::f32::consts::PI * h * h * h);
    assert!((poly6_kernel(0.0, h) - peak).abs() / peak < 1e-4);
}

#[test]
fn test_density_and_pressure_are_recomputed_each_step() {
    let mut sim = Simulator::new(SimConfig {
        gravity: Vec3::ZERO,
        viscous_drag: 0.0,
        ..SimConfig::default()
    });
    sim.add_fluid(small_blob(2, 0.02));
    sim.apply_time_step();
    let rho_1 = sim.fluids()[0].particles[0].density;
    assert!(rho_1 > 0.0, "density must include the self term");
    sim.apply_time_step();
    let rho_2 = sim.fluids()[0].particles[0].density;
    // the blob relaxes between steps so the recomputed density differs
    assert!(rho_1 != rho_2 || sim.fluids()[0].particles[0].base.vel.length() < 1e-12);

    let p = &sim.fluids()[0].particles[0];
    let expected = SPEED_OF_SOUND * SPEED_OF_SOUND * (p.density - 1000.0);
    assert!((p.pressure - expected).abs() <= expected.abs() * 1e-5,
        "pressure must follow the equation of state");
}

#[test]
fn test_overdense_blob_expands() {
    let mut sim = Simulator::new(SimConfig {
        gravity: Vec3::ZERO,
        viscous_drag: 0.0,
        ..SimConfig::default()
    });
    // particles packed much tighter than the rest density supports
    sim.add_fluid(small_blob(2, 0.005));

    let spread_before: f32 = sim.fluids()[0]
        .particles
        .iter()
        .map(|p| p.base.pos.distance(Vec3::splat(0.0025)))
        .sum();
    sim.apply_time_step();
    let spread_after: f32 = sim.fluids()[0]
        .particles
        .iter()
        .map(|p| p.base.pos.distance(Vec3::splat(0.0025)))
        .sum();
    assert!(
        spread_after > spread_before,
        "pressure must push an overdense blob apart: {spread_before} -> {spread_after}"
    );
}

#[test]
fn test_fluids_are_exempt_from_magnetic_fields() {
    let mut sim = Simulator::new(SimConfig {
        gravity: Vec3::ZERO,
        viscous_drag: 0.0,
        ..SimConfig::default()
    });
    sim.add_field(ForceField::Magnetic { field: Vec3::new(0.0, 0.0, 50.0) });

    let mut f = Fluid::new(1, 0.001, 1000.0, 0.0, 0.1).unwrap();
    f.particles[0].base.vel = Vec3::X;
    sim.add_fluid(f);

    sim.add_free();
    {
        let p = &mut sim.free_particles_mut()[0];
        p.base.pos = Vec3::new(100.0, 0.0, 0.0); // far from the fluid
        p.base.vel = Vec3::X;
        p.charge = 1.0;
    }

    sim.apply_time_step();

    let fluid_vel = sim.fluids()[0].particles[0].base.vel;
    assert!(fluid_vel.y.abs() < 1e-7, "no Lorentz deflection on fluid particles");
    let free_vel = sim.free_particles()[0].base.vel;
    assert!(free_vel.y.abs() > 1e-4, "charged free particle must be deflected");
}

#[test]
fn test_fluid_rejects_bad_configuration_before_stepping() {
    assert!(Fluid::new(100, 0.001, 1000.0, 0.001, -0.1).is_err());
    assert!(Fluid::new(100, 0.0, 1000.0, 0.001, 0.1).is_err());
    assert!(Fluid::new(0, 0.001, 1000.0, 0.001, 0.1).is_err());
}
