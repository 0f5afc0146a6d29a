//! SPH smoothing kernel functions and core SPH operators.
//!
//! Implements the Wendland C2 kernel and its gradient for 3D SPH simulations.
//! The Wendland C2 kernel is preferred over the cubic spline for its strict
//! positivity and lack of tensile-instability pairing artifacts.
//!
//! Also provides the operators the solver sequences each advection step:
//! density summation, symmetric pressure acceleration, laminar viscous
//! acceleration (Morris et al. 1997), transport-velocity position correction
//! (Adami et al. 2013), the continuity-equation density rate, and the
//! dual-criteria time-step sizes.

use std::f32::consts::PI;

use crate::neighbor::NeighborGrid;
use crate::particle::ParticleArrays;
use crate::wall::WallParticles;

/// Normalization constant for the 3D Wendland C2 kernel: 21 / (16 * pi).
///
/// With q = r/h and support radius 2h, the analytically correct normalization
/// for the Wendland C2 kernel in 3D is alpha_d = 21 / (16 * pi).
const WENDLAND_C2_NORM_3D: f32 = 21.0 / (16.0 * PI);

/// Wendland C2 smoothing kernel in 3D.
///
/// ```text
/// W(r, h) = (21 / (16 pi h^3)) * (1 - q/2)^4 * (1 + 2q)   for q = r/h <= 2
/// W(r, h) = 0                                             for q > 2
/// ```
///
/// # Arguments
/// * `r` - Distance between two particles (must be >= 0).
/// * `h` - Smoothing length. The support radius is 2h.
pub fn wendland_c2(r: f32, h: f32) -> f32 {
    let q = r / h;
    if q >= 2.0 {
        return 0.0;
    }
    let h3 = h * h * h;
    let one_minus_half_q = 1.0 - 0.5 * q;
    // (1 - q/2)^4
    let t = one_minus_half_q * one_minus_half_q;
    let t4 = t * t;
    WENDLAND_C2_NORM_3D / h3 * t4 * (1.0 + 2.0 * q)
}

/// Gradient of the Wendland C2 smoothing kernel in 3D.
///
/// Returns the gradient components (dW/dx, dW/dy, dW/dz) given the
/// displacement vector (dx, dy, dz) from particle j to particle i and the
/// pre-computed distance `r = sqrt(dx^2 + dy^2 + dz^2)`.
///
/// ```text
/// nabla W = (dW/dr) * (r_vec / |r|)
/// dW/dr   = (21 / (16 pi h^3)) * (-5 q) * (1 - q/2)^3 / h    for q <= 2
/// ```
///
/// When `r` is (near) zero the gradient is zero (particles at the same
/// position).
pub fn wendland_c2_gradient(dx: f32, dy: f32, dz: f32, r: f32, h: f32) -> (f32, f32, f32) {
    let q = r / h;
    if q >= 2.0 || r < 1.0e-12 {
        return (0.0, 0.0, 0.0);
    }

    let h3 = h * h * h;
    let one_minus_half_q = 1.0 - 0.5 * q;
    // (1 - q/2)^3
    let t3 = one_minus_half_q * one_minus_half_q * one_minus_half_q;

    // dW/dr = norm / h^3 * (-5q)(1 - q/2)^3 / h
    let dw_dr = WENDLAND_C2_NORM_3D / (h3 * h) * (-5.0 * q) * t3;

    // gradient = dW/dr * (r_vec / |r|)
    let inv_r = 1.0 / r;
    (dw_dr * dx * inv_r, dw_dr * dy * inv_r, dw_dr * dz * inv_r)
}

// ---------------------------------------------------------------------------
// Density summation
// ---------------------------------------------------------------------------

/// Compute density for all fluid particles using SPH summation.
///
/// ```text
/// rho_i = m_i * W(0, h) + sum_j m_j * W(r_ij, h) + sum_w m_w * W(r_iw, h)
/// ```
///
/// Wall particles contribute to fluid density but never have their own
/// density updated.
pub fn compute_density(
    particles: &mut ParticleArrays,
    wall: &WallParticles,
    fluid_grid: &NeighborGrid,
    wall_grid: &NeighborGrid,
    h: f32,
) {
    let n = particles.len();
    let support_radius = 2.0 * h;
    let w0 = wendland_c2(0.0, h);

    let mut density = vec![0.0f32; n];
    for i in 0..n {
        // Self-contribution
        let mut rho = particles.mass[i] * w0;

        fluid_grid.for_each_neighbor(
            i,
            &particles.x,
            &particles.y,
            &particles.z,
            support_radius,
            |j, _, _, _, r| {
                rho += particles.mass[j] * wendland_c2(r, h);
            },
        );

        wall_grid.for_each_neighbor_of_point(
            [particles.x[i], particles.y[i], particles.z[i]],
            &wall.x,
            &wall.y,
            &wall.z,
            support_radius,
            |w, _, _, _, r| {
                rho += wall.mass[w] * wendland_c2(r, h);
            },
        );

        density[i] = rho;
    }

    particles.density.copy_from_slice(&density);
}

// ---------------------------------------------------------------------------
// Pressure acceleration
// ---------------------------------------------------------------------------

/// Compute the symmetric SPH pressure acceleration, overwriting the particle
/// acceleration arrays.
///
/// ```text
/// a_i = -sum_j m_j * (p_i/rho_i^2 + p_j/rho_j^2) * grad_W(r_ij, h)
/// ```
///
/// Wall particles push on fluid particles with their mirrored pressure
/// (see [`WallParticles::update_pressures`]) and the rest density in the
/// denominator. The fluid-side pressure is clamped non-negative in the wall
/// term so walls always repel, never attract; without the clamp, tension
/// from sub-rest-density fluid pulls particles into the wall.
pub fn compute_pressure_accel(
    particles: &mut ParticleArrays,
    wall: &WallParticles,
    fluid_grid: &NeighborGrid,
    wall_grid: &NeighborGrid,
    h: f32,
    rest_density: f32,
) {
    let n = particles.len();
    let support_radius = 2.0 * h;

    let mut ax = vec![0.0f32; n];
    let mut ay = vec![0.0f32; n];
    let mut az = vec![0.0f32; n];

    let rho0_sq = rest_density * rest_density;

    for i in 0..n {
        let pi_over_rho2 = particles.pressure[i] / (particles.density[i] * particles.density[i]);

        fluid_grid.for_each_neighbor(
            i,
            &particles.x,
            &particles.y,
            &particles.z,
            support_radius,
            |j, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let pj_over_rho2 =
                    particles.pressure[j] / (particles.density[j] * particles.density[j]);
                let factor = -particles.mass[j] * (pi_over_rho2 + pj_over_rho2);
                ax[i] += factor * gx;
                ay[i] += factor * gy;
                az[i] += factor * gz;
            },
        );

        let pi_clamped_over_rho2 =
            particles.pressure[i].max(0.0) / (particles.density[i] * particles.density[i]);

        wall_grid.for_each_neighbor_of_point(
            [particles.x[i], particles.y[i], particles.z[i]],
            &wall.x,
            &wall.y,
            &wall.z,
            support_radius,
            |w, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let pw_over_rho2 = wall.pressure[w] / rho0_sq;
                let factor = -wall.mass[w] * (pi_clamped_over_rho2 + pw_over_rho2);
                ax[i] += factor * gx;
                ay[i] += factor * gy;
                az[i] += factor * gz;
            },
        );
    }

    particles.ax.copy_from_slice(&ax);
    particles.ay.copy_from_slice(&ay);
    particles.az.copy_from_slice(&az);
}

// ---------------------------------------------------------------------------
// Laminar viscous acceleration (Morris et al. 1997)
// ---------------------------------------------------------------------------

/// Compute the laminar (physical) viscous acceleration.
///
/// ```text
/// a_i = sum_j m_j * (2 mu / (rho_i rho_j)) * (r_ij . grad_W) / (|r_ij|^2 + 0.01 h^2) * v_ij
/// ```
///
/// Wall neighbors enforce no-slip through a reflected velocity difference
/// `v_iw = 2 * v_i` (the wall is at rest), giving the correct shear stress
/// at the interface. The result is returned as separate vectors because the
/// solver holds it fixed across the acoustic substeps of one advection step.
pub fn compute_viscous_accel(
    particles: &ParticleArrays,
    wall: &WallParticles,
    fluid_grid: &NeighborGrid,
    wall_grid: &NeighborGrid,
    h: f32,
    dynamic_viscosity: f32,
    rest_density: f32,
) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let n = particles.len();
    let support_radius = 2.0 * h;
    let eta_sq = 0.01 * h * h;
    let two_mu = 2.0 * dynamic_viscosity;

    let mut ax = vec![0.0f32; n];
    let mut ay = vec![0.0f32; n];
    let mut az = vec![0.0f32; n];

    for i in 0..n {
        let rho_i = particles.density[i];
        let vx_i = particles.vx[i];
        let vy_i = particles.vy[i];
        let vz_i = particles.vz[i];

        fluid_grid.for_each_neighbor(
            i,
            &particles.x,
            &particles.y,
            &particles.z,
            support_radius,
            |j, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                // r_ij . grad_W (negative inside the support)
                let r_dot_grad = dx * gx + dy * gy + dz * gz;
                let factor = particles.mass[j] * two_mu / (rho_i * particles.density[j])
                    * r_dot_grad
                    / (r * r + eta_sq);
                ax[i] += factor * (vx_i - particles.vx[j]);
                ay[i] += factor * (vy_i - particles.vy[j]);
                az[i] += factor * (vz_i - particles.vz[j]);
            },
        );

        wall_grid.for_each_neighbor_of_point(
            [particles.x[i], particles.y[i], particles.z[i]],
            &wall.x,
            &wall.y,
            &wall.z,
            support_radius,
            |w, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let r_dot_grad = dx * gx + dy * gy + dz * gz;
                let factor = wall.mass[w] * two_mu / (rho_i * rest_density) * r_dot_grad
                    / (r * r + eta_sq);
                // Reflected wall velocity difference: 2 * (v_i - 0)
                ax[i] += factor * 2.0 * vx_i;
                ay[i] += factor * 2.0 * vy_i;
                az[i] += factor * 2.0 * vz_i;
            },
        );
    }

    (ax, ay, az)
}

// ---------------------------------------------------------------------------
// Transport-velocity position correction (Adami et al. 2013)
// ---------------------------------------------------------------------------

/// Shifting coefficient for the transport-velocity correction.
const TRANSPORT_SHIFT_COEFF: f32 = 0.2;

/// Compute the transport-velocity position shift for all particles.
///
/// The zero-order kernel-gradient residue
///
/// ```text
/// R_i = sum_j V_j * grad_W(r_ij, h)    (fluid and wall neighbors)
/// ```
///
/// vanishes on a uniform particle distribution and points toward clustered
/// neighbors otherwise. Shifting against it,
///
/// ```text
/// dr_i = -coeff * h^2 * R_i
/// ```
///
/// regularizes the distribution and suppresses the tensile clumping that
/// would otherwise contaminate the steady velocity profile. The shift is
/// applied once per advection step.
pub fn compute_transport_shift(
    particles: &ParticleArrays,
    wall: &WallParticles,
    fluid_grid: &NeighborGrid,
    wall_grid: &NeighborGrid,
    h: f32,
    rest_density: f32,
) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let n = particles.len();
    let support_radius = 2.0 * h;
    let scale = -TRANSPORT_SHIFT_COEFF * h * h;

    let mut sx = vec![0.0f32; n];
    let mut sy = vec![0.0f32; n];
    let mut sz = vec![0.0f32; n];

    for i in 0..n {
        let mut rx = 0.0f32;
        let mut ry = 0.0f32;
        let mut rz = 0.0f32;

        fluid_grid.for_each_neighbor(
            i,
            &particles.x,
            &particles.y,
            &particles.z,
            support_radius,
            |j, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let v_j = particles.mass[j] / particles.density[j];
                rx += v_j * gx;
                ry += v_j * gy;
                rz += v_j * gz;
            },
        );

        wall_grid.for_each_neighbor_of_point(
            [particles.x[i], particles.y[i], particles.z[i]],
            &wall.x,
            &wall.y,
            &wall.z,
            support_radius,
            |w, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let v_w = wall.mass[w] / rest_density;
                rx += v_w * gx;
                ry += v_w * gy;
                rz += v_w * gz;
            },
        );

        sx[i] = scale * rx;
        sy[i] = scale * ry;
        sz[i] = scale * rz;
    }

    (sx, sy, sz)
}

// ---------------------------------------------------------------------------
// Continuity-equation density rate
// ---------------------------------------------------------------------------

/// Compute the continuity-equation density rate for all particles.
///
/// ```text
/// drho_i/dt = rho_i * sum_j V_j * (v_ij . grad_W) + rho_i * sum_w V_w * (v_i . grad_W)
/// ```
///
/// Wall particles are at rest, so the wall relative velocity is `v_i`.
/// Returned as a separate vector; the density-relaxation half step applies
/// `rho_i += rate_i * dt`.
pub fn compute_density_rate(
    particles: &ParticleArrays,
    wall: &WallParticles,
    fluid_grid: &NeighborGrid,
    wall_grid: &NeighborGrid,
    h: f32,
    rest_density: f32,
) -> Vec<f32> {
    let n = particles.len();
    let support_radius = 2.0 * h;
    let mut rate = vec![0.0f32; n];

    for i in 0..n {
        let rho_i = particles.density[i];
        let vx_i = particles.vx[i];
        let vy_i = particles.vy[i];
        let vz_i = particles.vz[i];
        let mut div = 0.0f32;

        fluid_grid.for_each_neighbor(
            i,
            &particles.x,
            &particles.y,
            &particles.z,
            support_radius,
            |j, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let v_j = particles.mass[j] / particles.density[j];
                div += v_j
                    * ((vx_i - particles.vx[j]) * gx
                        + (vy_i - particles.vy[j]) * gy
                        + (vz_i - particles.vz[j]) * gz);
            },
        );

        wall_grid.for_each_neighbor_of_point(
            [particles.x[i], particles.y[i], particles.z[i]],
            &wall.x,
            &wall.y,
            &wall.z,
            support_radius,
            |w, dx, dy, dz, r| {
                let (gx, gy, gz) = wendland_c2_gradient(dx, dy, dz, r, h);
                let v_w = wall.mass[w] / rest_density;
                div += v_w * (vx_i * gx + vy_i * gy + vz_i * gz);
            },
        );

        rate[i] = rho_i * div;
    }

    rate
}

// ---------------------------------------------------------------------------
// Dual-criteria time-step sizes
// ---------------------------------------------------------------------------

/// Compute the advection (outer-loop) time-step size.
///
/// Combines the advective criterion `0.25 * h / max(|v|_max, u_ref)` with
/// the viscous diffusion criterion `0.125 * h^2 * rho0 / mu`. The reference
/// velocity `u_ref` keeps the step bounded during spin-up from rest, when
/// the instantaneous maximum velocity underestimates the eventual flow
/// speed.
pub fn advection_timestep(
    particles: &ParticleArrays,
    h: f32,
    u_ref: f32,
    rest_density: f32,
    dynamic_viscosity: f32,
) -> f32 {
    let v_max = max_velocity_magnitude(particles);
    let dt_adv = 0.25 * h / v_max.max(u_ref).max(1.0e-6);
    if dynamic_viscosity > 0.0 {
        let dt_visc = 0.125 * h * h * rest_density / dynamic_viscosity;
        dt_adv.min(dt_visc)
    } else {
        dt_adv
    }
}

/// Compute the acoustic (inner-loop) time-step size.
///
/// ```text
/// dt = 0.6 * h / (c + |v|_max)
/// ```
pub fn acoustic_timestep(particles: &ParticleArrays, h: f32, speed_of_sound: f32) -> f32 {
    let v_max = max_velocity_magnitude(particles);
    0.6 * h / (speed_of_sound + v_max)
}

fn max_velocity_magnitude(particles: &ParticleArrays) -> f32 {
    let mut v_max_sq = 0.0f32;
    for i in 0..particles.len() {
        let v_sq = particles.vx[i] * particles.vx[i]
            + particles.vy[i] * particles.vy[i]
            + particles.vz[i] * particles.vz[i];
        if v_sq > v_max_sq {
            v_max_sq = v_sq;
        }
    }
    v_max_sq.sqrt()
}
