//! Particle lattice generation and solver construction for the channel case.
//!
//! The fluid fills `[0, L] x [0, H] x [-W/2, W/2]` on a cubic lattice at cell
//! centers. Each wall is a block of dummy particle layers outside the fluid,
//! offset half a spacing from the wall plane so the first fluid and wall
//! layers are symmetric about it. Walls extend past the periodic x and z
//! extents so that fluid near a periodic seam still sees a full wall stencil.

use kernel::{ParticleArrays, Periodicity, SolverSettings, WallParticles, WcsphSolver};

use crate::config::ChannelFlowConfig;

/// How far the walls extend beyond the fluid domain along periodic axes,
/// in multiples of the particle spacing. Must cover the kernel support
/// (2h = 2.6 spacings).
const WALL_MARGIN_CELLS: i64 = 4;

/// Generate the fluid particle lattice.
///
/// Particles sit at lattice cell centers with mass `rho0 * dp^3` and initial
/// velocity `initial_direction * bulk_velocity` along x. With
/// `initial_direction = 0` the fluid starts from rest.
pub fn build_fluid(config: &ChannelFlowConfig) -> ParticleArrays {
    let dp = config.particle_spacing;
    let mass = config.rest_density * dp * dp * dp;
    let u0 = config.initial_direction as f32 * config.bulk_velocity;

    let nx = (config.length / dp).round() as i64;
    let ny = (config.height / dp).round() as i64;
    let nz = (config.width / dp).round() as i64;

    let mut particles = ParticleArrays::new();
    for ix in 0..nx {
        let x = (ix as f32 + 0.5) * dp;
        for iy in 0..ny {
            let y = (iy as f32 + 0.5) * dp;
            for iz in 0..nz {
                let z = -0.5 * config.width + (iz as f32 + 0.5) * dp;
                particles.push_particle(x, y, z, mass, config.rest_density, [u0, 0.0, 0.0]);
            }
        }
    }
    particles
}

/// Generate the wall particle lattices above and below the channel.
///
/// The bottom wall occupies `wall_layers` planes below `y = 0` starting at
/// `y = -dp/2`; the top wall mirrors it above `y = H`. Both extend
/// `WALL_MARGIN_CELLS` spacings beyond the fluid along x and z.
pub fn build_walls(config: &ChannelFlowConfig) -> WallParticles {
    let dp = config.particle_spacing;
    let mass = config.rest_density * dp * dp * dp;

    let nx = (config.length / dp).round() as i64;
    let nz = (config.width / dp).round() as i64;
    let layers = config.wall_layers as i64;

    let mut wall = WallParticles::new();
    for ix in -WALL_MARGIN_CELLS..nx + WALL_MARGIN_CELLS {
        let x = (ix as f32 + 0.5) * dp;
        for iz in -WALL_MARGIN_CELLS..nz + WALL_MARGIN_CELLS {
            let z = -0.5 * config.width + (iz as f32 + 0.5) * dp;
            for layer in 0..layers {
                // Bottom wall, first layer at y = -dp/2
                let y_bottom = -(layer as f32 + 0.5) * dp;
                wall.push_particle(x, y_bottom, z, mass);
                // Top wall, first layer at y = H + dp/2
                let y_top = config.height + (layer as f32 + 0.5) * dp;
                wall.push_particle(x, y_top, z, mass);
            }
        }
    }
    wall
}

/// Build the solver for the channel case.
///
/// The fluid neighbor domain spans the periodic x and z extents exactly and
/// reaches `wall_layers` spacings past the walls in y so that wall-pressure
/// mirroring queries stay inside the grid.
pub fn build_solver(config: &ChannelFlowConfig) -> WcsphSolver {
    let dp = config.particle_spacing;
    let y_pad = config.wall_layers as f32 * dp;

    let settings = SolverSettings {
        h: config.smoothing_length(),
        rest_density: config.rest_density,
        speed_of_sound: config.speed_of_sound(),
        dynamic_viscosity: config.dynamic_viscosity(),
        body_force: config.body_force(),
        // The advection reference velocity is the steady centerline speed,
        // 1.5 * U_bulk, so the outer step stays bounded through spin-up.
        u_ref: 1.5 * config.bulk_velocity,
        domain_min: [0.0, -y_pad, -0.5 * config.width],
        domain_max: [config.length, config.height + y_pad, 0.5 * config.width],
        periodicity: Periodicity::streamwise_spanwise(),
    };

    let fluid = build_fluid(config);
    let wall = build_walls(config);
    tracing::info!(
        fluid = fluid.len(),
        wall = wall.len(),
        h = settings.h,
        speed_of_sound = settings.speed_of_sound,
        dynamic_viscosity = settings.dynamic_viscosity,
        "built channel flow case"
    );
    WcsphSolver::new(fluid, wall, settings)
}
