//! Observer probe lines for velocity profile sampling.
//!
//! Three probe lines interrogate the channel: along the streamwise
//! centerline, across the channel height at mid-length, and across the
//! width at mid-length. Probes keep a margin of four particle spacings
//! from walls and periodic seams so the interpolation stencil is always
//! fully populated.

use kernel::WcsphSolver;

use crate::config::ChannelFlowConfig;

/// Margin between the outermost probes and the domain boundary, in
/// multiples of the particle spacing.
const PROBE_MARGIN_CELLS: f32 = 4.0;

/// A straight line of velocity probe points.
#[derive(Debug, Clone)]
pub struct ObserverLine {
    /// Name used in output records ("centerline", "wall_normal", "spanwise").
    pub name: &'static str,
    /// Probe point positions.
    pub points: Vec<[f32; 3]>,
}

impl ObserverLine {
    /// Evenly spaced points from `start` to `end` inclusive.
    fn spaced(name: &'static str, start: [f32; 3], end: [f32; 3], count: u32) -> Self {
        let n = count.max(2);
        let points = (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                [
                    start[0] + t * (end[0] - start[0]),
                    start[1] + t * (end[1] - start[1]),
                    start[2] + t * (end[2] - start[2]),
                ]
            })
            .collect();
        Self { name, points }
    }

    /// Probes along the channel centerline `y = H/2, z = 0`.
    pub fn centerline(config: &ChannelFlowConfig) -> Self {
        let margin = PROBE_MARGIN_CELLS * config.particle_spacing;
        let y = 0.5 * config.height;
        Self::spaced(
            "centerline",
            [margin, y, 0.0],
            [config.length - margin, y, 0.0],
            config.centerline_probes,
        )
    }

    /// Probes across the channel height at `x = L/2, z = 0`.
    pub fn wall_normal(config: &ChannelFlowConfig) -> Self {
        let margin = PROBE_MARGIN_CELLS * config.particle_spacing;
        let x = 0.5 * config.length;
        Self::spaced(
            "wall_normal",
            [x, margin, 0.0],
            [x, config.height - margin, 0.0],
            config.wall_normal_probes,
        )
    }

    /// Probes across the channel width at `x = L/2, y = H/2`.
    pub fn spanwise(config: &ChannelFlowConfig) -> Self {
        let margin = PROBE_MARGIN_CELLS * config.particle_spacing;
        let x = 0.5 * config.length;
        let y = 0.5 * config.height;
        Self::spaced(
            "spanwise",
            [x, y, -0.5 * config.width + margin],
            [x, y, 0.5 * config.width - margin],
            config.spanwise_probes,
        )
    }

    /// All three probe lines for the channel case.
    pub fn standard_set(config: &ChannelFlowConfig) -> Vec<Self> {
        vec![
            Self::centerline(config),
            Self::wall_normal(config),
            Self::spanwise(config),
        ]
    }

    /// Sample the interpolated velocity at every probe point.
    pub fn sample(&self, solver: &WcsphSolver) -> Vec<[f32; 3]> {
        self.points
            .iter()
            .map(|&p| solver.interpolate_velocity(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> ChannelFlowConfig {
        let json = r#"{
            "name": "test",
            "length": 10.0,
            "height": 2.0,
            "width": 1.0,
            "particle_spacing": 0.05,
            "bulk_velocity": 1.0,
            "reynolds_number": 100.0,
            "end_time": 100.0
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn centerline_spans_with_margin() {
        let config = reference_config();
        let line = ObserverLine::centerline(&config);
        assert_eq!(line.points.len(), 41);
        let first = line.points[0];
        let last = *line.points.last().unwrap();
        assert!((first[0] - 0.2).abs() < 1e-5);
        assert!((last[0] - 9.8).abs() < 1e-5);
        for p in &line.points {
            assert!((p[1] - 1.0).abs() < 1e-6);
            assert!(p[2].abs() < 1e-6);
        }
    }

    #[test]
    fn wall_normal_stays_inside_channel() {
        let config = reference_config();
        let line = ObserverLine::wall_normal(&config);
        assert_eq!(line.points.len(), 51);
        for p in &line.points {
            assert!(p[1] >= 0.2 - 1e-5 && p[1] <= 1.8 + 1e-5);
            assert!((p[0] - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn spanwise_is_symmetric_about_midplane() {
        let config = reference_config();
        let line = ObserverLine::spanwise(&config);
        assert_eq!(line.points.len(), 21);
        let first = line.points[0];
        let last = *line.points.last().unwrap();
        assert!((first[2] + last[2]).abs() < 1e-5, "ends mirror in z");
    }

    #[test]
    fn standard_set_has_three_lines() {
        let config = reference_config();
        let lines = ObserverLine::standard_set(&config);
        let names: Vec<_> = lines.iter().map(|l| l.name).collect();
        assert_eq!(names, ["centerline", "wall_normal", "spanwise"]);
    }
}
