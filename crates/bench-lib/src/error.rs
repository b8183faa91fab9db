//! Error types for probes and benchmark runs

use std::path::PathBuf;
use thiserror::Error;

/// Failure preparing or running a single probe.
///
/// Probes never propagate these to the runner; they are folded into a
/// zero-rate result rated `Error`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe setup failed: {0}")]
    Setup(String),

    #[error("scratch file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cryptographic primitive failed: {0}")]
    Crypto(String),
}

/// Failures that stop a benchmark run or its reporting.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("benchmark cancelled during {probe}")]
    Cancelled { probe: &'static str },

    #[error("test directory {path} is not usable: {source}")]
    Prerequisite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report to {path}: {source}")]
    ReportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to export metrics: {0}")]
    Metrics(String),
}
