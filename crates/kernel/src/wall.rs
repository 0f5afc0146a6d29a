//! Static wall particles for no-slip and no-penetration boundaries.
//!
//! Walls are represented as layers of dummy particles outside the fluid
//! domain. They never move; their only evolving state is a pressure mirrored
//! from the adjacent fluid (Adami et al. 2012) so that the pressure gradient
//! across the interface balances and fluid particles neither penetrate the
//! wall nor feel a spurious gap.

use crate::neighbor::NeighborGrid;
use crate::particle::ParticleArrays;
use crate::smoothing::wendland_c2;

/// Struct-of-arrays storage for static wall particles.
///
/// Positions and masses are fixed at construction. Pressure is refreshed
/// from the fluid each advection step. No-penetration comes entirely from
/// the mirrored pressure gradient, so no surface normals are carried.
#[derive(Debug, Default, Clone)]
pub struct WallParticles {
    /// X positions
    pub x: Vec<f32>,
    /// Y positions
    pub y: Vec<f32>,
    /// Z positions
    pub z: Vec<f32>,
    /// Particle mass (rest density times lattice cell volume).
    pub mass: Vec<f32>,
    /// Mirrored pressure, clamped non-negative.
    pub pressure: Vec<f32>,
}

impl WallParticles {
    /// Create empty wall storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wall particles.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true when there are no wall particles.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Add a wall particle with a fixed position and mass.
    pub fn push_particle(&mut self, px: f32, py: f32, pz: f32, mass: f32) {
        self.x.push(px);
        self.y.push(py);
        self.z.push(pz);
        self.mass.push(mass);
        self.pressure.push(0.0);
    }

    /// Mirror fluid pressure onto the wall particles.
    ///
    /// For each wall particle, a Shepard-weighted average over fluid
    /// neighbors:
    ///
    /// ```text
    /// p_w = sum_f W_wf * (p_f + rho_f * g . (r_w - r_f)) / sum_f W_wf
    /// ```
    ///
    /// The hydrostatic correction term extrapolates the fluid pressure along
    /// the body-force direction to the wall particle position. The result is
    /// clamped non-negative; a wall never pulls on the fluid. Wall particles
    /// with no fluid neighbors keep zero pressure.
    pub fn update_pressures(
        &mut self,
        particles: &ParticleArrays,
        fluid_grid: &NeighborGrid,
        h: f32,
        body_force: [f32; 3],
    ) {
        let support_radius = 2.0 * h;
        for w in 0..self.len() {
            let mut weighted_pressure = 0.0f32;
            let mut weight_sum = 0.0f32;

            fluid_grid.for_each_neighbor_of_point(
                [self.x[w], self.y[w], self.z[w]],
                &particles.x,
                &particles.y,
                &particles.z,
                support_radius,
                |f, dx, dy, dz, r| {
                    // (dx, dy, dz) is r_w - r_f with the minimal image applied
                    let weight = wendland_c2(r, h);
                    let hydrostatic = particles.density[f]
                        * (body_force[0] * dx + body_force[1] * dy + body_force[2] * dz);
                    weighted_pressure += weight * (particles.pressure[f] + hydrostatic);
                    weight_sum += weight;
                },
            );

            self.pressure[w] = if weight_sum > 0.0 {
                (weighted_pressure / weight_sum).max(0.0)
            } else {
                0.0
            };
        }
    }
}
