//! CSV recording of observer samples and run diagnostics.
//!
//! Two long-format CSV files accumulate over a run:
//! - `velocity_profiles.csv` with one row per probe point per snapshot
//! - `diagnostics.csv` with per-snapshot kinetic energy and density variation
//!
//! A plain-text `timing_summary.txt` is appended when the run finishes so
//! consecutive runs in the same output directory stay comparable.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::observer::ObserverLine;
use crate::CaseError;

/// One probe sample in the long-format velocity CSV.
#[derive(Debug, Serialize)]
struct VelocityRecord {
    time: f64,
    line: &'static str,
    index: usize,
    x: f32,
    y: f32,
    z: f32,
    ux: f32,
    uy: f32,
    uz: f32,
}

/// One per-snapshot diagnostics row.
#[derive(Debug, Serialize)]
struct DiagnosticsRecord {
    time: f64,
    kinetic_energy: f64,
    max_density_variation: f32,
}

/// Writes observer samples and diagnostics to CSV files in an output
/// directory.
pub struct CaseRecorder {
    output_dir: PathBuf,
    velocity_writer: csv::Writer<File>,
    diagnostics_writer: csv::Writer<File>,
}

impl CaseRecorder {
    /// Create the output directory (if needed) and open fresh CSV files,
    /// truncating any previous run's output.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, CaseError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| CaseError::Io {
            context: format!("creating output directory {}", output_dir.display()),
            source,
        })?;

        let velocity_writer = csv::Writer::from_path(output_dir.join("velocity_profiles.csv"))?;
        let diagnostics_writer = csv::Writer::from_path(output_dir.join("diagnostics.csv"))?;

        Ok(Self {
            output_dir,
            velocity_writer,
            diagnostics_writer,
        })
    }

    /// Record one snapshot of all observer lines.
    pub fn record_snapshot(
        &mut self,
        time: f64,
        lines: &[ObserverLine],
        samples: &[Vec<[f32; 3]>],
    ) -> Result<(), CaseError> {
        for (line, velocities) in lines.iter().zip(samples) {
            for (index, (point, velocity)) in line.points.iter().zip(velocities).enumerate() {
                self.velocity_writer.serialize(VelocityRecord {
                    time,
                    line: line.name,
                    index,
                    x: point[0],
                    y: point[1],
                    z: point[2],
                    ux: velocity[0],
                    uy: velocity[1],
                    uz: velocity[2],
                })?;
            }
        }
        self.velocity_writer.flush().map_err(|source| CaseError::Io {
            context: "flushing velocity profiles".to_string(),
            source,
        })?;
        Ok(())
    }

    /// Record one per-snapshot diagnostics row.
    pub fn record_diagnostics(
        &mut self,
        time: f64,
        kinetic_energy: f64,
        max_density_variation: f32,
    ) -> Result<(), CaseError> {
        self.diagnostics_writer.serialize(DiagnosticsRecord {
            time,
            kinetic_energy,
            max_density_variation,
        })?;
        self.diagnostics_writer
            .flush()
            .map_err(|source| CaseError::Io {
                context: "flushing diagnostics".to_string(),
                source,
            })?;
        Ok(())
    }

    /// Append a timing summary line and flush all writers.
    pub fn finish(mut self, wall_seconds: f64, iterations: u64) -> Result<(), CaseError> {
        self.velocity_writer.flush().map_err(|source| CaseError::Io {
            context: "flushing velocity profiles".to_string(),
            source,
        })?;
        self.diagnostics_writer
            .flush()
            .map_err(|source| CaseError::Io {
                context: "flushing diagnostics".to_string(),
                source,
            })?;

        let epoch_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = self.output_dir.join("timing_summary.txt");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| CaseError::Io {
                context: format!("opening {}", path.display()),
                source,
            })?;
        writeln!(
            file,
            "finished_at_epoch={epoch_seconds} wall_seconds={wall_seconds:.3} iterations={iterations}"
        )
        .map_err(|source| CaseError::Io {
            context: format!("writing {}", path.display()),
            source,
        })?;
        Ok(())
    }
}
