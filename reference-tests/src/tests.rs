//! Channel flow case tests.
//!
//! The fast tests run a coarse channel for a short spin-up and check
//! qualitative behavior. The full-resolution convergence run takes hours and
//! is ignored by default; run it with `cargo test --release -- --ignored`.

use orchestrator::{CaseRunner, ChannelFlowConfig};

use crate::{ChannelFlowCase, ProfileTolerances};

/// A coarse channel that starts from rest, cheap enough for unit tests.
///
/// At this resolution the default sound speed lets density variation creep
/// past the weakly-compressible bound during spin-up, so the coarse case
/// uses a stiffer equation of state.
fn coarse_config() -> ChannelFlowConfig {
    let json = r#"{
        "name": "coarse-spin-up",
        "length": 2.0,
        "height": 1.0,
        "width": 0.5,
        "particle_spacing": 0.25,
        "initial_direction": 0,
        "bulk_velocity": 1.0,
        "reynolds_number": 50.0,
        "sound_speed_factor": 20.0,
        "end_time": 1.0
    }"#;
    serde_json::from_str(json).unwrap()
}

/// The canonical validation case matching the published benchmark setup.
fn reference_config() -> ChannelFlowConfig {
    let json = r#"{
        "name": "channel-flow-3d",
        "length": 10.0,
        "height": 2.0,
        "width": 1.0,
        "particle_spacing": 0.05,
        "initial_direction": 1,
        "body_force_direction": -1,
        "bulk_velocity": 1.0,
        "reynolds_number": 100.0,
        "end_time": 100.0
    }"#;
    serde_json::from_str(json).unwrap()
}

#[test]
fn spin_up_follows_body_force() {
    let mut runner = CaseRunner::new(coarse_config()).unwrap();
    runner.advance(1.0);

    let p = runner.solver().particles();
    let n = p.len() as f32;
    let mean_vx: f32 = p.vx.iter().sum::<f32>() / n;
    let mean_vy: f32 = p.vy.iter().sum::<f32>() / n;
    let mean_vz: f32 = p.vz.iter().sum::<f32>() / n;

    // Default body force direction is -x
    assert!(
        mean_vx < 0.0,
        "flow should develop along the body force, mean vx = {mean_vx}"
    );
    assert!(
        mean_vy.abs() < 0.1 && mean_vz.abs() < 0.1,
        "cross-stream drift should stay small: vy={mean_vy}, vz={mean_vz}"
    );
}

#[test]
fn spin_up_keeps_weak_compressibility() {
    let mut runner = CaseRunner::new(coarse_config()).unwrap();
    runner.advance(1.0);
    let variation = runner.solver().max_density_variation();
    assert!(
        variation < 0.1,
        "density variation {variation} too large for weakly compressible flow"
    );
}

#[test]
fn spin_up_speed_stays_below_steady_state() {
    // During spin-up from rest the flow cannot exceed the steady centerline
    // velocity of 1.5 * U_bulk (plus discretization headroom).
    let config = coarse_config();
    let mut runner = CaseRunner::new(config.clone()).unwrap();
    runner.advance(1.0);

    let center = [
        0.5 * config.length,
        0.5 * config.height,
        0.0,
    ];
    let v = runner.solver().interpolate_velocity(center);
    let limit = 2.0 * config.bulk_velocity;
    assert!(
        v[0].abs() < limit,
        "centerline speed {} exceeds physical bound {limit}",
        v[0]
    );
}

#[test]
fn mass_is_conserved_through_the_loop() {
    let mut runner = CaseRunner::new(coarse_config()).unwrap();
    let before: f64 = runner
        .solver()
        .particles()
        .mass
        .iter()
        .map(|&m| m as f64)
        .sum();
    runner.advance(1.0);
    let after: f64 = runner
        .solver()
        .particles()
        .mass
        .iter()
        .map(|&m| m as f64)
        .sum();
    assert!(
        ((after - before) / before).abs() < 1e-6,
        "total mass drifted: {before} -> {after}"
    );
}

/// Full-resolution convergence run. Matches the published benchmark: the
/// steady profile must agree with the analytical parabola to 5% of the bulk
/// velocity streamwise and 2% cross-stream on every probe.
#[test]
#[ignore]
fn full_resolution_profile_converges() {
    let case = ChannelFlowCase {
        config: reference_config(),
        tolerances: ProfileTolerances::default(),
    };
    let result = case.run().unwrap();
    result.print_summary();
    assert!(result.passed, "profile validation failed, see summary above");
}

/// Medium-resolution run: the profile ordering must be parabolic (fastest at
/// the centerline) even before full convergence. Slow in debug builds.
#[test]
#[ignore]
fn profile_develops_parabolic_ordering() {
    let json = r#"{
        "name": "medium-spin-up",
        "length": 1.0,
        "height": 1.0,
        "width": 0.5,
        "particle_spacing": 0.1,
        "initial_direction": 0,
        "bulk_velocity": 1.0,
        "reynolds_number": 10.0,
        "end_time": 10.0
    }"#;
    let config: ChannelFlowConfig = serde_json::from_str(json).unwrap();
    let mut runner = CaseRunner::new(config.clone()).unwrap();
    runner.advance(config.end_time);

    let x = 0.5 * config.length;
    let center = runner.solver().interpolate_velocity([x, 0.5, 0.0]);
    let near_wall = runner.solver().interpolate_velocity([x, 0.2, 0.0]);
    assert!(
        center[0].abs() > near_wall[0].abs(),
        "centerline {} should outrun near-wall {}",
        center[0],
        near_wall[0]
    );
    assert!(center[0] < 0.0, "flow follows the -x body force");
}
