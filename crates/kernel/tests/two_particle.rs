//! Two-particle symmetry test.
//!
//! Verifies Newton's 3rd law (pressure accelerations equal and opposite)
//! and momentum conservation for a simple two-particle system.

use kernel::{ParticleArrays, Periodicity, SolverSettings, WallParticles, WcsphSolver};

/// Two particles separated by distance `h` along the x-axis, at rest.
fn setup_two_particles(h: f32) -> WcsphSolver {
    let mut particles = ParticleArrays::new();
    let mass = 0.001;
    let rest_density = 1000.0;

    particles.push_particle(0.0, 0.0, 0.0, mass, rest_density, [0.0, 0.0, 0.0]);
    particles.push_particle(h, 0.0, 0.0, mass, rest_density, [0.0, 0.0, 0.0]);

    let settings = SolverSettings {
        h,
        rest_density,
        speed_of_sound: 20.0,
        dynamic_viscosity: 0.001,
        body_force: [0.0, 0.0, 0.0],
        u_ref: 1.0,
        domain_min: [-1.0, -1.0, -1.0],
        domain_max: [1.0, 1.0, 1.0],
        periodicity: Periodicity::none(),
    };
    WcsphSolver::new(particles, WallParticles::new(), settings)
}

#[test]
fn pressure_accel_equal_and_opposite() {
    let h = 0.05;
    let mut solver = setup_two_particles(h);

    solver.compute_density_summation();
    solver.compute_viscous_force();
    solver.pressure_relaxation(0.0);

    let p = solver.particles();
    let (ax0, ay0, az0) = (p.ax[0], p.ay[0], p.az[0]);
    let (ax1, ay1, az1) = (p.ax[1], p.ay[1], p.az[1]);

    let tol = 1.0e-4 * ax0.abs().max(1.0e-6);
    assert!(
        (ax0 + ax1).abs() < tol,
        "ax not equal and opposite: ax0={ax0}, ax1={ax1}, sum={}",
        ax0 + ax1
    );
    assert!(
        (ay0 + ay1).abs() < tol,
        "ay not equal and opposite: ay0={ay0}, ay1={ay1}"
    );
    assert!(
        (az0 + az1).abs() < tol,
        "az not equal and opposite: az0={az0}, az1={az1}"
    );

    // By symmetry the acceleration is along the x-axis only
    assert!(ay0.abs() < tol, "ay0 should be ~0, got {ay0}");
    assert!(az0.abs() < tol, "az0 should be ~0, got {az0}");
}

#[test]
fn momentum_conserved() {
    let h = 0.05;
    let mut solver = setup_two_particles(h);
    let mass = solver.particles().mass[0];

    let dt = 1.0e-4;
    for _ in 0..10 {
        solver.compute_density_summation();
        solver.compute_viscous_force();
        solver.pressure_relaxation(dt);
        solver.apply_body_force(dt);
        solver.density_relaxation(dt);
        solver.update_configuration();
    }

    let p = solver.particles();
    let px: f32 = (0..p.len()).map(|i| p.mass[i] * p.vx[i]).sum();
    let py: f32 = (0..p.len()).map(|i| p.mass[i] * p.vy[i]).sum();
    let pz: f32 = (0..p.len()).map(|i| p.mass[i] * p.vz[i]).sum();

    // No external forces, so total momentum stays zero
    let tol = mass * 1.0e-4;
    assert!(px.abs() < tol, "px not conserved: {px}");
    assert!(py.abs() < tol, "py not conserved: {py}");
    assert!(pz.abs() < tol, "pz not conserved: {pz}");
}
