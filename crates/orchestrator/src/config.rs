//! Configuration parsing and validation for the channel flow case

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::CaseError;

/// Configuration of a 3D plane Poiseuille channel flow simulation.
///
/// The channel occupies `[0, length] x [0, height] x [-width/2, width/2]`
/// with solid walls at `y = 0` and `y = height` and periodic boundaries
/// along x (streamwise) and z (spanwise). A constant streamwise body force
/// drives the flow; its magnitude is derived from the target bulk velocity
/// and Reynolds number so the analytical steady state is the parabolic
/// Poiseuille profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelFlowConfig {
    /// Human-readable case name
    pub name: String,
    /// Channel length along the streamwise x-axis (meters)
    pub length: f32,
    /// Channel height between the walls along y (meters)
    pub height: f32,
    /// Channel width along the spanwise z-axis (meters)
    pub width: f32,
    /// Initial inter-particle distance (meters)
    pub particle_spacing: f32,
    /// Number of dummy particle layers per wall
    #[serde(default = "default_wall_layers")]
    pub wall_layers: u32,
    /// Rest density of the fluid (kg/m^3)
    #[serde(default = "default_rest_density")]
    pub rest_density: f32,
    /// Target bulk (cross-section averaged) velocity (m/s)
    pub bulk_velocity: f32,
    /// Reynolds number based on bulk velocity and channel height
    pub reynolds_number: f32,
    /// Numerical speed of sound as a multiple of the bulk velocity
    #[serde(default = "default_sound_speed_factor")]
    pub sound_speed_factor: f32,
    /// Initial streamwise flow direction: -1, 0 (start from rest), or +1
    #[serde(default = "default_initial_direction")]
    pub initial_direction: i32,
    /// Direction of the driving body force: -1 or +1
    #[serde(default = "default_body_force_direction")]
    pub body_force_direction: i32,
    /// Stop after this much simulated time (seconds)
    pub end_time: f64,
    /// Number of observation snapshots over the run
    #[serde(default = "default_output_count")]
    pub output_count: u32,
    /// Number of probe points on the streamwise centerline
    #[serde(default = "default_centerline_probes")]
    pub centerline_probes: u32,
    /// Number of probe points across the channel height
    #[serde(default = "default_wall_normal_probes")]
    pub wall_normal_probes: u32,
    /// Number of probe points across the channel width
    #[serde(default = "default_spanwise_probes")]
    pub spanwise_probes: u32,
    /// Directory for CSV output files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

// Default values

fn default_wall_layers() -> u32 {
    4
}

fn default_rest_density() -> f32 {
    1.0
}

fn default_sound_speed_factor() -> f32 {
    10.0
}

fn default_initial_direction() -> i32 {
    1
}

fn default_body_force_direction() -> i32 {
    -1
}

fn default_output_count() -> u32 {
    200
}

fn default_centerline_probes() -> u32 {
    41
}

fn default_wall_normal_probes() -> u32 {
    51
}

fn default_spanwise_probes() -> u32 {
    21
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl ChannelFlowConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CaseError::Io {
            context: format!("reading config file {}", path.display()),
            source,
        })?;
        let config: ChannelFlowConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.length <= 0.0 || self.height <= 0.0 || self.width <= 0.0 {
            return Err(CaseError::invalid_config(
                "channel dimensions must be positive",
            ));
        }
        if self.particle_spacing <= 0.0 {
            return Err(CaseError::invalid_config(
                "particle spacing must be positive",
            ));
        }
        if self.particle_spacing > self.height / 4.0 {
            return Err(CaseError::invalid_config(
                "particle spacing must resolve the channel height with at least 4 particles",
            ));
        }
        if self.wall_layers == 0 {
            return Err(CaseError::invalid_config(
                "at least one wall layer is required",
            ));
        }
        if self.rest_density <= 0.0 {
            return Err(CaseError::invalid_config("rest density must be positive"));
        }
        if self.bulk_velocity <= 0.0 {
            return Err(CaseError::invalid_config("bulk velocity must be positive"));
        }
        if self.reynolds_number <= 0.0 {
            return Err(CaseError::invalid_config(
                "Reynolds number must be positive",
            ));
        }
        if self.sound_speed_factor < 10.0 {
            return Err(CaseError::invalid_config(
                "sound speed factor below 10 violates the weak-compressibility assumption",
            ));
        }
        if !matches!(self.initial_direction, -1 | 0 | 1) {
            return Err(CaseError::invalid_config(
                "initial direction must be -1, 0, or +1",
            ));
        }
        if !matches!(self.body_force_direction, -1 | 1) {
            return Err(CaseError::invalid_config(
                "body force direction must be -1 or +1",
            ));
        }
        if self.end_time <= 0.0 {
            return Err(CaseError::invalid_config("end time must be positive"));
        }
        if self.output_count == 0 {
            return Err(CaseError::invalid_config(
                "output count must be at least 1",
            ));
        }
        if self.centerline_probes < 2 || self.wall_normal_probes < 2 || self.spanwise_probes < 2 {
            return Err(CaseError::invalid_config(
                "each observer line needs at least 2 probes",
            ));
        }
        Ok(())
    }

    /// Smoothing length h = 1.3 * particle spacing
    pub fn smoothing_length(&self) -> f32 {
        1.3 * self.particle_spacing
    }

    /// Numerical speed of sound
    pub fn speed_of_sound(&self) -> f32 {
        self.sound_speed_factor * self.bulk_velocity
    }

    /// Dynamic viscosity from the Reynolds number: mu = rho0 * U * H / Re
    pub fn dynamic_viscosity(&self) -> f32 {
        self.rest_density * self.bulk_velocity * self.height / self.reynolds_number
    }

    /// Magnitude of the driving body force: g = 12 * mu * U / (rho0 * H^2)
    ///
    /// This is the exact forcing for which the steady Poiseuille profile has
    /// bulk velocity U between no-slip walls a distance H apart.
    pub fn body_force_magnitude(&self) -> f32 {
        12.0 * self.dynamic_viscosity() * self.bulk_velocity
            / (self.rest_density * self.height * self.height)
    }

    /// Body force acceleration vector along the streamwise axis
    pub fn body_force(&self) -> [f32; 3] {
        [
            self.body_force_direction as f32 * self.body_force_magnitude(),
            0.0,
            0.0,
        ]
    }

    /// Simulated time span between observation snapshots
    pub fn output_interval(&self) -> f64 {
        self.end_time / self.output_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> ChannelFlowConfig {
        ChannelFlowConfig {
            name: "channel-flow-3d".to_string(),
            length: 10.0,
            height: 2.0,
            width: 1.0,
            particle_spacing: 0.05,
            wall_layers: default_wall_layers(),
            rest_density: 1.0,
            bulk_velocity: 1.0,
            reynolds_number: 100.0,
            sound_speed_factor: default_sound_speed_factor(),
            initial_direction: 1,
            body_force_direction: -1,
            end_time: 100.0,
            output_count: default_output_count(),
            centerline_probes: default_centerline_probes(),
            wall_normal_probes: default_wall_normal_probes(),
            spanwise_probes: default_spanwise_probes(),
            output_dir: default_output_dir(),
        }
    }

    #[test]
    fn derived_quantities() {
        let config = reference_config();
        assert!((config.smoothing_length() - 0.065).abs() < 1e-6);
        assert!((config.speed_of_sound() - 10.0).abs() < 1e-6);
        // mu = 1 * 1 * 2 / 100 = 0.02
        assert!((config.dynamic_viscosity() - 0.02).abs() < 1e-6);
        // g = 12 * 0.02 * 1 / (1 * 4) = 0.06
        assert!((config.body_force_magnitude() - 0.06).abs() < 1e-6);
        let g = config.body_force();
        assert!((g[0] + 0.06).abs() < 1e-6, "force follows direction -1");
        assert_eq!(g[1], 0.0);
        assert_eq!(g[2], 0.0);
    }

    #[test]
    fn validation_rejects_bad_dimensions() {
        let mut config = reference_config();
        config.height = -2.0;
        assert!(config.validate().is_err());
        config.height = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_coarse_spacing() {
        let mut config = reference_config();
        config.particle_spacing = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_bad_directions() {
        let mut config = reference_config();
        config.initial_direction = 2;
        assert!(config.validate().is_err());
        config.initial_direction = 0;
        assert!(config.validate().is_ok());
        config.body_force_direction = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = reference_config();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ChannelFlowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, config.name);
        assert_eq!(parsed.initial_direction, config.initial_direction);
        assert!((parsed.end_time - config.end_time).abs() < 1e-12);
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let json = r#"{
            "name": "minimal",
            "length": 10.0,
            "height": 2.0,
            "width": 1.0,
            "particle_spacing": 0.05,
            "bulk_velocity": 1.0,
            "reynolds_number": 100.0,
            "end_time": 100.0
        }"#;
        let config: ChannelFlowConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.wall_layers, 4);
        assert_eq!(config.initial_direction, 1);
        assert_eq!(config.body_force_direction, -1);
        assert_eq!(config.output_count, 200);
        assert!(config.validate().is_ok());
    }
}
