//! Benchmark library for blockchain node hardware readiness
//!
//! This crate provides the core functionality for:
//! - Time-boxed probe execution with cooperative cancellation
//! - Budget allocation across CPU, memory and disk probes
//! - Piecewise-linear scoring and weighted aggregation
//! - Readiness verdicts with advisories
//! - Host introspection, reports and observability

pub mod budget;
pub mod error;
pub mod kernel;
pub mod models;
pub mod observability;
pub mod probes;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod system;

pub use budget::{BenchConfig, Profile};
pub use error::{BenchError, ProbeError};
pub use kernel::{CancelToken, Outcome, Tally, TimedLoop};
pub use models::*;
pub use observability::{BenchMetrics, StructuredLogger};
pub use report::Report;
pub use runner::{BenchmarkRunner, BenchmarkRunnerBuilder};
pub use scoring::{classify, summarize, Readiness, Summary, Tier, Verdict};
pub use system::SystemInfo;
