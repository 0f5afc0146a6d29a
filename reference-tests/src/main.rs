//! Channel flow reference case binary.
//!
//! Runs the configured case to its end time, records velocity profiles and
//! diagnostics as CSV, then validates the final profiles against the
//! analytical Poiseuille solution.

use orchestrator::{CaseRunner, ChannelFlowConfig};
use reference_tests::{ChannelFlowCase, ProfileTolerances};

const DEFAULT_CONFIG_PATH: &str = "configs/channel-flow-3d.json";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    tracing::info!(config = %config_path, "channel flow reference case");

    let config = match ChannelFlowConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR loading {config_path}: {e}");
            std::process::exit(2);
        }
    };

    let case = ChannelFlowCase {
        config: config.clone(),
        tolerances: ProfileTolerances::default(),
    };

    let mut runner = match CaseRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("ERROR building case: {e}");
            std::process::exit(2);
        }
    };

    let report = match runner.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("ERROR during run: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        iterations = report.iterations,
        wall_seconds = report.wall_seconds,
        "recording complete, validating profiles"
    );

    let result = case.validate(&runner);
    result.print_summary();

    if !result.passed {
        std::process::exit(1);
    }
}
