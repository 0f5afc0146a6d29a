//! Equation of state for the weakly compressible SPH formulation.
//!
//! The artificial sound speed is chosen an order of magnitude above the flow
//! velocity scale so density variations stay around 1%, which keeps the
//! linear pressure-density relation accurate.

/// Linear weakly compressible equation of state.
///
/// ```text
/// p = c^2 * (rho - rho0)
/// ```
///
/// # Arguments
/// * `density` - Current density rho.
/// * `rest_density` - Reference rest density rho0.
/// * `speed_of_sound` - Artificial sound speed c.
///
/// # Returns
/// Pressure. Negative (tension) if `density < rest_density`.
pub fn weakly_compressible_eos(density: f32, rest_density: f32, speed_of_sound: f32) -> f32 {
    speed_of_sound * speed_of_sound * (density - rest_density)
}
