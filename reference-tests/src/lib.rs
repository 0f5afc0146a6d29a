//! Reference test framework for channel flow validation
//!
//! Runs the 3D plane Poiseuille channel flow case and validates the sampled
//! velocity profiles against the analytical parabolic solution.

pub mod analytical;

#[cfg(test)]
mod tests;

use kernel::WcsphSolver;
use orchestrator::{CaseError, CaseRunner, ChannelFlowConfig, ObserverLine};

use analytical::PoiseuilleFlow;

/// Per-probe tolerances for profile validation, as fractions of the bulk
/// velocity magnitude.
#[derive(Debug, Clone, Copy)]
pub struct ProfileTolerances {
    /// Allowed deviation of the streamwise velocity from the analytical value.
    pub streamwise: f64,
    /// Allowed magnitude of the cross-stream velocity components.
    pub cross_stream: f64,
}

impl Default for ProfileTolerances {
    fn default() -> Self {
        Self {
            streamwise: 0.05,
            cross_stream: 0.02,
        }
    }
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Details, or the failure reason
    pub message: Option<String>,
}

/// Result of running the channel flow reference case
#[derive(Debug)]
pub struct TestResult {
    /// Case name
    pub name: String,
    /// Whether all checks passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Advection iterations executed
    pub iterations: u64,
    /// Simulated time (seconds)
    pub sim_time: f64,
    /// Final maximum relative density deviation
    pub max_density_variation: f32,
}

/// The channel flow reference case: a configuration plus profile tolerances.
pub struct ChannelFlowCase {
    /// Case configuration.
    pub config: ChannelFlowConfig,
    /// Profile validation tolerances.
    pub tolerances: ProfileTolerances,
}

impl ChannelFlowCase {
    /// Run the case to its configured end time and validate the final
    /// velocity profiles. No result files are written; use
    /// [`CaseRunner::run`] directly when CSV output is wanted.
    pub fn run(&self) -> Result<TestResult, CaseError> {
        tracing::info!(name = %self.config.name, "running channel flow reference case");
        let mut runner = CaseRunner::new(self.config.clone())?;
        runner.advance(self.config.end_time);
        Ok(self.validate(&runner))
    }

    /// Validate the current state of a runner against the analytical profile.
    pub fn validate(&self, runner: &CaseRunner) -> TestResult {
        let config = runner.config();
        let direction = config.body_force_direction as f64;
        let u_bulk = config.bulk_velocity as f64;
        let reference = PoiseuilleFlow::new(config.height as f64, direction * u_bulk);

        let mut checks = Vec::new();
        for line in runner.observers() {
            let samples = line.sample(runner.solver());
            // The flow is uniform along the centerline and spanwise lines,
            // so the analytical value depends only on the probe height.
            checks.push(streamwise_check(line, &samples, &reference, u_bulk, self.tolerances));
            checks.push(cross_stream_check(line, &samples, u_bulk, self.tolerances));
        }
        checks.push(density_check(runner.solver()));

        let passed = checks.iter().all(|c| c.passed);
        TestResult {
            name: config.name.clone(),
            passed,
            checks,
            iterations: runner.iterations(),
            sim_time: runner.time(),
            max_density_variation: runner.solver().max_density_variation(),
        }
    }
}

/// Check the streamwise velocity of every probe on a line against the
/// analytical profile at the probe's height.
fn streamwise_check(
    line: &ObserverLine,
    samples: &[[f32; 3]],
    reference: &PoiseuilleFlow,
    u_bulk: f64,
    tolerances: ProfileTolerances,
) -> CheckResult {
    let tolerance = tolerances.streamwise * u_bulk;
    let mut worst_error = 0.0f64;
    let mut worst_probe = 0;
    for (index, (point, velocity)) in line.points.iter().zip(samples).enumerate() {
        let target = reference.velocity_at(point[1] as f64);
        let error = (velocity[0] as f64 - target).abs();
        if error > worst_error {
            worst_error = error;
            worst_probe = index;
        }
    }

    let name = format!("{} streamwise profile", line.name);
    if worst_error <= tolerance {
        CheckResult {
            name,
            passed: true,
            message: Some(format!(
                "max deviation {:.4} (tolerance {:.4})",
                worst_error, tolerance
            )),
        }
    } else {
        CheckResult {
            name,
            passed: false,
            message: Some(format!(
                "probe {} deviates {:.4} from analytical (tolerance {:.4})",
                worst_probe, worst_error, tolerance
            )),
        }
    }
}

/// Check that the cross-stream velocity components on a line stay small.
fn cross_stream_check(
    line: &ObserverLine,
    samples: &[[f32; 3]],
    u_bulk: f64,
    tolerances: ProfileTolerances,
) -> CheckResult {
    let tolerance = tolerances.cross_stream * u_bulk;
    let mut worst = 0.0f64;
    for velocity in samples {
        worst = worst
            .max(velocity[1].abs() as f64)
            .max(velocity[2].abs() as f64);
    }

    let name = format!("{} cross-stream velocity", line.name);
    if worst <= tolerance {
        CheckResult {
            name,
            passed: true,
            message: Some(format!("max |u_cross| {:.4} (tolerance {:.4})", worst, tolerance)),
        }
    } else {
        CheckResult {
            name,
            passed: false,
            message: Some(format!(
                "max |u_cross| {:.4} exceeds tolerance {:.4}",
                worst, tolerance
            )),
        }
    }
}

/// Weak-compressibility sanity check: density stays within a few percent of
/// the rest density.
fn density_check(solver: &WcsphSolver) -> CheckResult {
    let variation = solver.max_density_variation();
    let limit = 0.05;
    if (variation as f64) <= limit {
        CheckResult {
            name: "density variation".to_string(),
            passed: true,
            message: Some(format!("{:.2}% (limit {:.0}%)", variation * 100.0, limit * 100.0)),
        }
    } else {
        CheckResult {
            name: "density variation".to_string(),
            passed: false,
            message: Some(format!(
                "{:.2}% exceeds weak-compressibility limit {:.0}%",
                variation * 100.0,
                limit * 100.0
            )),
        }
    }
}

impl TestResult {
    /// Print a summary of the test result
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Case: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Iterations: {}", self.iterations);
        println!("Simulated time: {:.3} s", self.sim_time);
        println!(
            "Max density variation: {:.2}%",
            self.max_density_variation * 100.0
        );
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}
