//! Analytical reference solution for plane Poiseuille channel flow.
//!
//! Provides the closed-form steady-state profile against which simulated
//! velocity profiles are compared for quantitative accuracy assessment.

/// Analytical solution for Poiseuille (channel) flow between parallel plates,
/// parameterized by the bulk (cross-section averaged) velocity.
///
/// The steady profile between no-slip walls at y = 0 and y = H is parabolic:
///
/// ```text
/// u(y) = 1.5 * U_bulk * (1 - (2y/H - 1)^2)
/// ```
///
/// so the centerline velocity is 1.5 times the bulk velocity. When the flow
/// is driven by a body-force acceleration G through a fluid of kinematic
/// viscosity nu, the equivalent identities are:
///
/// ```text
/// u_max  = G * H^2 / (8 * nu)
/// U_bulk = G * H^2 / (12 * nu)
/// ```
pub struct PoiseuilleFlow {
    /// Channel height H (m)
    pub channel_height: f64,
    /// Bulk velocity U_bulk, signed by flow direction (m/s)
    pub bulk_velocity: f64,
}

impl PoiseuilleFlow {
    /// Create the analytical solution from a signed bulk velocity.
    pub fn new(channel_height: f64, bulk_velocity: f64) -> Self {
        Self {
            channel_height,
            bulk_velocity,
        }
    }

    /// Create the analytical solution from a driving body-force acceleration.
    ///
    /// Uses `U_bulk = G * H^2 / (12 * nu)`, keeping the sign of G.
    pub fn from_body_force(
        channel_height: f64,
        body_force_accel: f64,
        kinematic_viscosity: f64,
    ) -> Self {
        let bulk_velocity =
            body_force_accel * channel_height * channel_height / (12.0 * kinematic_viscosity);
        Self::new(channel_height, bulk_velocity)
    }

    /// Compute the analytical streamwise velocity at height y above the
    /// bottom wall. Zero outside the channel.
    pub fn velocity_at(&self, y: f64) -> f64 {
        if y < 0.0 || y > self.channel_height {
            return 0.0;
        }
        let eta = 2.0 * y / self.channel_height - 1.0;
        1.5 * self.bulk_velocity * (1.0 - eta * eta)
    }

    /// The centerline velocity, u(H/2) = 1.5 * U_bulk.
    pub fn max_velocity(&self) -> f64 {
        1.5 * self.bulk_velocity
    }

    /// Compute the analytical velocity profile at N evenly spaced points.
    ///
    /// Returns a vector of (y, u) pairs from y=0 to y=H.
    pub fn velocity_profile(&self, n_points: usize) -> Vec<(f64, f64)> {
        let mut profile = Vec::with_capacity(n_points);
        for i in 0..n_points {
            let y = self.channel_height * (i as f64) / ((n_points - 1) as f64);
            profile.push((y, self.velocity_at(y)));
        }
        profile
    }

    /// Compare a simulated velocity profile against the analytical solution.
    ///
    /// # Arguments
    /// * `y_positions` - Y coordinates of sampled probes
    /// * `velocities` - Corresponding streamwise velocities
    ///
    /// # Returns
    /// RMS error normalized by the centerline velocity magnitude.
    pub fn rms_error(&self, y_positions: &[f64], velocities: &[f64]) -> f64 {
        assert_eq!(y_positions.len(), velocities.len());
        if y_positions.is_empty() {
            return f64::MAX;
        }
        let u_max = self.max_velocity();
        if u_max.abs() < 1e-15 {
            return f64::MAX;
        }

        let mut sum_sq_error = 0.0;
        for (&y, &u_sim) in y_positions.iter().zip(velocities.iter()) {
            let error = (u_sim - self.velocity_at(y)) / u_max;
            sum_sq_error += error * error;
        }
        (sum_sq_error / y_positions.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_vanishes_at_walls() {
        let flow = PoiseuilleFlow::new(2.0, 1.0);
        assert!(flow.velocity_at(0.0).abs() < 1e-15);
        assert!(flow.velocity_at(2.0).abs() < 1e-15);
    }

    #[test]
    fn centerline_is_three_halves_bulk() {
        let flow = PoiseuilleFlow::new(2.0, 1.0);
        let u_center = flow.velocity_at(1.0);
        assert!((u_center - 1.5).abs() < 1e-12);
        assert!((flow.max_velocity() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn profile_is_symmetric() {
        let flow = PoiseuilleFlow::new(2.0, -1.0);
        let u_quarter = flow.velocity_at(0.5);
        let u_three_quarter = flow.velocity_at(1.5);
        assert!((u_quarter - u_three_quarter).abs() < 1e-12);
        assert!(u_quarter < 0.0, "profile carries the flow sign");
    }

    #[test]
    fn body_force_form_matches_bulk_form() {
        // g = 12 * nu * U / H^2 must reproduce bulk velocity U
        let h = 2.0;
        let nu = 0.02;
        let u_bulk = 1.0;
        let g = 12.0 * nu * u_bulk / (h * h);
        let flow = PoiseuilleFlow::from_body_force(h, g, nu);
        assert!((flow.bulk_velocity - u_bulk).abs() < 1e-12);
        // and u_max = g H^2 / (8 nu)
        let u_max = g * h * h / (8.0 * nu);
        assert!((flow.max_velocity() - u_max).abs() < 1e-12);
    }

    #[test]
    fn rms_perfect_match_is_zero() {
        let flow = PoiseuilleFlow::new(2.0, 1.0);
        let n = 20;
        let y_pos: Vec<f64> = (0..n).map(|i| 2.0 * (i as f64) / ((n - 1) as f64)).collect();
        let vels: Vec<f64> = y_pos.iter().map(|&y| flow.velocity_at(y)).collect();
        let rms = flow.rms_error(&y_pos, &vels);
        assert!(rms < 1e-12, "perfect match should give zero RMS, got {rms}");
    }

    #[test]
    fn velocity_profile_spans_the_channel() {
        let flow = PoiseuilleFlow::new(2.0, 1.0);
        let profile = flow.velocity_profile(11);
        assert_eq!(profile.len(), 11);
        assert!((profile[0].0).abs() < 1e-15);
        assert!((profile[10].0 - 2.0).abs() < 1e-12);
        assert!(profile[5].1 > profile[1].1);
    }
}
