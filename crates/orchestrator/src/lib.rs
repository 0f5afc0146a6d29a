//! Channel Flow Case Orchestration
//!
//! Builds and drives a 3D plane Poiseuille channel flow simulation on top of
//! the WCSPH solver in the `kernel` crate. The orchestrator owns everything
//! case-specific: geometry and particle placement, observer probe lines,
//! the dual-criteria time loop, and CSV result recording.
//!
//! # Modules
//! - [`config`] -- JSON case configuration with validation and derived quantities.
//! - [`setup`] -- Fluid and wall particle lattice generation, solver construction.
//! - [`observer`] -- Probe-line placement and velocity sampling.
//! - [`recording`] -- CSV writers for velocity profiles and diagnostics.
//! - [`runner`] -- The dual-criteria advection/acoustic time loop.

#![warn(missing_docs)]

pub mod config;
pub mod observer;
pub mod recording;
pub mod runner;
pub mod setup;

pub use config::ChannelFlowConfig;
pub use observer::ObserverLine;
pub use recording::CaseRecorder;
pub use runner::{CaseRunner, RunReport};

use thiserror::Error;

/// Errors from case configuration, setup, and result recording.
#[derive(Debug, Error)]
pub enum CaseError {
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An I/O operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done when the error occurred.
        context: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Writing a CSV record failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CaseError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        CaseError::InvalidConfig(message.into())
    }
}
