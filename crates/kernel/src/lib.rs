//! Weakly Compressible SPH Solver Kernel
//!
//! This crate provides the core solver for weakly compressible Smoothed
//! Particle Hydrodynamics (WCSPH) with dual-criteria time stepping. It is
//! designed to be separable and compute-focused; case setup and result
//! recording live in the orchestrator crate.
//!
//! # Modules
//! - [`particle`] -- Struct-of-arrays fluid particle storage.
//! - [`smoothing`] -- Wendland C2 smoothing kernel, gradient, and core SPH operators.
//! - [`neighbor`] -- Periodic-aware uniform-grid spatial hash for neighbor search.
//! - [`eos`] -- Linear weakly compressible equation of state.
//! - [`wall`] -- Static wall particle data and pressure mirroring (Adami et al. 2012).

#![warn(missing_docs)]

pub mod eos;
pub mod neighbor;
pub mod particle;
pub mod smoothing;
pub mod wall;

pub use eos::weakly_compressible_eos;
pub use neighbor::{NeighborGrid, Periodicity};
pub use particle::ParticleArrays;
pub use smoothing::{wendland_c2, wendland_c2_gradient};
pub use wall::WallParticles;

// ---------------------------------------------------------------------------
// Solver settings
// ---------------------------------------------------------------------------

/// Physical and numerical parameters of a WCSPH simulation.
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings {
    /// Smoothing length (meters). The kernel support radius is 2h.
    pub h: f32,
    /// Rest density of the fluid (kg/m^3).
    pub rest_density: f32,
    /// Numerical speed of sound (m/s), typically 10x the maximum flow speed.
    pub speed_of_sound: f32,
    /// Dynamic viscosity mu (Pa s).
    pub dynamic_viscosity: f32,
    /// Constant body-force acceleration driving the flow (m/s^2).
    pub body_force: [f32; 3],
    /// Reference flow speed used as a floor in the advection time-step criterion.
    pub u_ref: f32,
    /// Minimum corner of the fluid neighbor-search domain.
    pub domain_min: [f32; 3],
    /// Maximum corner of the fluid neighbor-search domain.
    pub domain_max: [f32; 3],
    /// Which axes of the fluid domain wrap periodically.
    pub periodicity: Periodicity,
}

// ---------------------------------------------------------------------------
// WcsphSolver
// ---------------------------------------------------------------------------

/// Weakly compressible SPH solver with dual-criteria time stepping.
///
/// The solver exposes the individual relaxation primitives rather than a
/// monolithic `step` so that a driver can sequence them:
///
/// ```text
/// Dt = advection_timestep()
/// compute_density_summation();
/// compute_viscous_force();
/// transport_velocity_correction();
/// while relaxed < Dt {
///     dt = min(acoustic_timestep(), Dt - relaxed);
///     pressure_relaxation(dt);
///     apply_body_force(dt);
///     density_relaxation(dt);
///     relaxed += dt;
/// }
/// update_configuration();
/// ```
///
/// The viscous acceleration is computed once per advection step and held
/// fixed across the acoustic substeps.
pub struct WcsphSolver {
    /// Fluid particle data.
    particles: ParticleArrays,
    /// Static wall particle data.
    wall: WallParticles,
    /// Neighbor grid over the fluid particles, periodic per settings.
    grid: NeighborGrid,
    /// Non-periodic neighbor grid over the static wall particles.
    wall_grid: NeighborGrid,
    /// Viscous acceleration held fixed across acoustic substeps.
    visc_ax: Vec<f32>,
    visc_ay: Vec<f32>,
    visc_az: Vec<f32>,
    settings: SolverSettings,
}

impl WcsphSolver {
    /// Create a new solver from initial fluid and wall particle data.
    ///
    /// The wall grid is built once here; wall particles never move. The
    /// fluid grid is populated immediately so that neighbor queries are
    /// valid before the first step.
    pub fn new(
        particles: ParticleArrays,
        wall: WallParticles,
        settings: SolverSettings,
    ) -> Self {
        let cell_size = 2.0 * settings.h;
        let n = particles.len();

        let mut grid = NeighborGrid::new(
            cell_size,
            settings.domain_min,
            settings.domain_max,
            settings.periodicity,
        );
        grid.update(&particles.x, &particles.y, &particles.z);

        let (wall_min, wall_max) = wall_bounds(&wall, cell_size, settings.domain_min, settings.domain_max);
        let mut wall_grid = NeighborGrid::new(cell_size, wall_min, wall_max, Periodicity::none());
        wall_grid.update(&wall.x, &wall.y, &wall.z);

        Self {
            particles,
            wall,
            grid,
            wall_grid,
            visc_ax: vec![0.0; n],
            visc_ay: vec![0.0; n],
            visc_az: vec![0.0; n],
            settings,
        }
    }

    /// Compute the advection (outer-loop) time-step size.
    pub fn advection_timestep(&self) -> f32 {
        smoothing::advection_timestep(
            &self.particles,
            self.settings.h,
            self.settings.u_ref,
            self.settings.rest_density,
            self.settings.dynamic_viscosity,
        )
    }

    /// Compute the acoustic (inner-loop) time-step size.
    pub fn acoustic_timestep(&self) -> f32 {
        smoothing::acoustic_timestep(&self.particles, self.settings.h, self.settings.speed_of_sound)
    }

    /// Recompute fluid densities by SPH summation over fluid and wall neighbors.
    pub fn compute_density_summation(&mut self) {
        smoothing::compute_density(
            &mut self.particles,
            &self.wall,
            &self.grid,
            &self.wall_grid,
            self.settings.h,
        );
    }

    /// Recompute the laminar viscous acceleration, held fixed until the next call.
    pub fn compute_viscous_force(&mut self) {
        let (ax, ay, az) = smoothing::compute_viscous_accel(
            &self.particles,
            &self.wall,
            &self.grid,
            &self.wall_grid,
            self.settings.h,
            self.settings.dynamic_viscosity,
            self.settings.rest_density,
        );
        self.visc_ax = ax;
        self.visc_ay = ay;
        self.visc_az = az;
    }

    /// Apply the transport-velocity position correction.
    ///
    /// Shifts particle positions against the kernel-gradient residue to keep
    /// the distribution regular. Called once per advection step, after the
    /// density summation.
    pub fn transport_velocity_correction(&mut self) {
        let (sx, sy, sz) = smoothing::compute_transport_shift(
            &self.particles,
            &self.wall,
            &self.grid,
            &self.wall_grid,
            self.settings.h,
            self.settings.rest_density,
        );
        for i in 0..self.particles.len() {
            self.particles.x[i] += sx[i];
            self.particles.y[i] += sy[i];
            self.particles.z[i] += sz[i];
        }
    }

    /// First half of the position-based Verlet scheme.
    ///
    /// Evaluates the equation of state, mirrors wall pressures, computes the
    /// pressure acceleration, then kicks velocities with the combined
    /// pressure and viscous acceleration and drifts positions a half step.
    pub fn pressure_relaxation(&mut self, dt: f32) {
        let n = self.particles.len();

        for i in 0..n {
            self.particles.pressure[i] = eos::weakly_compressible_eos(
                self.particles.density[i],
                self.settings.rest_density,
                self.settings.speed_of_sound,
            );
        }

        self.wall.update_pressures(
            &self.particles,
            &self.grid,
            self.settings.h,
            self.settings.body_force,
        );

        smoothing::compute_pressure_accel(
            &mut self.particles,
            &self.wall,
            &self.grid,
            &self.wall_grid,
            self.settings.h,
            self.settings.rest_density,
        );

        let half_dt = 0.5 * dt;
        for i in 0..n {
            self.particles.vx[i] += (self.particles.ax[i] + self.visc_ax[i]) * dt;
            self.particles.vy[i] += (self.particles.ay[i] + self.visc_ay[i]) * dt;
            self.particles.vz[i] += (self.particles.az[i] + self.visc_az[i]) * dt;
            self.particles.x[i] += self.particles.vx[i] * half_dt;
            self.particles.y[i] += self.particles.vy[i] * half_dt;
            self.particles.z[i] += self.particles.vz[i] * half_dt;
        }
    }

    /// Kick velocities with the constant body-force acceleration.
    pub fn apply_body_force(&mut self, dt: f32) {
        let [gx, gy, gz] = self.settings.body_force;
        for i in 0..self.particles.len() {
            self.particles.vx[i] += gx * dt;
            self.particles.vy[i] += gy * dt;
            self.particles.vz[i] += gz * dt;
        }
    }

    /// Second half of the position-based Verlet scheme.
    ///
    /// Drifts positions the remaining half step, then integrates the
    /// continuity equation to update densities.
    pub fn density_relaxation(&mut self, dt: f32) {
        let n = self.particles.len();
        let half_dt = 0.5 * dt;
        for i in 0..n {
            self.particles.x[i] += self.particles.vx[i] * half_dt;
            self.particles.y[i] += self.particles.vy[i] * half_dt;
            self.particles.z[i] += self.particles.vz[i] * half_dt;
        }

        let rate = smoothing::compute_density_rate(
            &self.particles,
            &self.wall,
            &self.grid,
            &self.wall_grid,
            self.settings.h,
            self.settings.rest_density,
        );
        for i in 0..n {
            self.particles.density[i] += rate[i] * dt;
        }
    }

    /// Wrap particle positions across periodic boundaries and rebuild the
    /// fluid neighbor grid. Called once at the end of each advection step.
    pub fn update_configuration(&mut self) {
        for i in 0..self.particles.len() {
            let wrapped = self.grid.wrap_point([
                self.particles.x[i],
                self.particles.y[i],
                self.particles.z[i],
            ]);
            self.particles.x[i] = wrapped[0];
            self.particles.y[i] = wrapped[1];
            self.particles.z[i] = wrapped[2];
        }
        self.grid
            .update(&self.particles.x, &self.particles.y, &self.particles.z);
    }

    /// Reorder particle storage into cell-major order for cache locality.
    ///
    /// The fluid grid must be current (call [`Self::update_configuration`]
    /// first). The grid is rebuilt afterwards so its sorted index arrays
    /// refer to the new storage order.
    pub fn sort_particles(&mut self) {
        let order = self.grid.cell_order().to_vec();
        self.particles.reorder(&order);
        self.grid
            .update(&self.particles.x, &self.particles.y, &self.particles.z);
        tracing::debug!(particles = self.particles.len(), "sorted particle storage");
    }

    /// Shepard-corrected SPH interpolation of the velocity field at a point.
    ///
    /// Returns zero when the point has no fluid neighbors within the kernel
    /// support.
    pub fn interpolate_velocity(&self, point: [f32; 3]) -> [f32; 3] {
        let h = self.settings.h;
        let support_radius = 2.0 * h;
        let mut vx = 0.0f32;
        let mut vy = 0.0f32;
        let mut vz = 0.0f32;
        let mut weight_sum = 0.0f32;

        self.grid.for_each_neighbor_of_point(
            point,
            &self.particles.x,
            &self.particles.y,
            &self.particles.z,
            support_radius,
            |j, _, _, _, r| {
                let weight =
                    self.particles.mass[j] / self.particles.density[j] * wendland_c2(r, h);
                vx += weight * self.particles.vx[j];
                vy += weight * self.particles.vy[j];
                vz += weight * self.particles.vz[j];
                weight_sum += weight;
            },
        );

        if weight_sum > 1.0e-12 {
            [vx / weight_sum, vy / weight_sum, vz / weight_sum]
        } else {
            [0.0, 0.0, 0.0]
        }
    }

    /// Total kinetic energy of the fluid, accumulated in f64.
    pub fn total_kinetic_energy(&self) -> f64 {
        let mut energy = 0.0f64;
        for i in 0..self.particles.len() {
            let m = self.particles.mass[i] as f64;
            let vx = self.particles.vx[i] as f64;
            let vy = self.particles.vy[i] as f64;
            let vz = self.particles.vz[i] as f64;
            energy += 0.5 * m * (vx * vx + vy * vy + vz * vz);
        }
        energy
    }

    /// Maximum relative density deviation from the rest density.
    pub fn max_density_variation(&self) -> f32 {
        let rho0 = self.settings.rest_density;
        let mut max_var = 0.0f32;
        for &rho in &self.particles.density {
            let var = (rho - rho0).abs() / rho0;
            if var > max_var {
                max_var = var;
            }
        }
        max_var
    }

    /// Read back current fluid particle state.
    pub fn particles(&self) -> &ParticleArrays {
        &self.particles
    }

    /// Number of fluid particles.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of wall particles.
    pub fn wall_count(&self) -> usize {
        self.wall.len()
    }

    /// Solver settings used at construction.
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

/// Axis-aligned bounds of the wall particles, padded by one cell so the
/// outermost particles do not sit on the grid boundary. Falls back to the
/// fluid domain when there are no wall particles.
fn wall_bounds(
    wall: &WallParticles,
    pad: f32,
    fallback_min: [f32; 3],
    fallback_max: [f32; 3],
) -> ([f32; 3], [f32; 3]) {
    if wall.is_empty() {
        return (fallback_min, fallback_max);
    }
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for w in 0..wall.len() {
        let p = [wall.x[w], wall.y[w], wall.z[w]];
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    for axis in 0..3 {
        min[axis] -= pad;
        max[axis] += pad;
    }
    (min, max)
}
