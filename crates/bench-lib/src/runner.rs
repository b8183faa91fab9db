//! Benchmark runner
//!
//! Drives every probe in a fixed order (CPU, memory, disk) against the
//! budgets derived from a [`BenchConfig`]. Probes run one after another on
//! the calling thread; cancellation is checked before and after each probe.

use crate::budget::BenchConfig;
use crate::error::BenchError;
use crate::kernel::CancelToken;
use crate::models::{BenchmarkResults, CpuResults, DiskResults, MemoryResults};
use crate::observability::{BenchMetrics, StructuredLogger};
use crate::probes::cpu::{BlsProbe, Bn256Probe, EcdsaProbe, KeccakProbe};
use crate::probes::disk::{BatchProbe, RandomProbe, SequentialProbe};
use crate::probes::memory::{PoolProbe, StateCacheProbe, TrieProbe};
use crate::probes::{Probe, ProbeOutput};
use crate::scoring::{Summary, Verdict};
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::debug;

/// Number of probes in a full run
pub const PROBE_COUNT: usize = 10;

/// Runs the full probe suite
pub struct BenchmarkRunner {
    config: BenchConfig,
    cancel: CancelToken,
    metrics: BenchMetrics,
    logger: StructuredLogger,
    step: Cell<usize>,
}

impl BenchmarkRunner {
    pub fn new(config: BenchConfig) -> Self {
        BenchmarkRunnerBuilder::new().config(config).build()
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Token that stops the run at the next iteration boundary when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn metrics(&self) -> &BenchMetrics {
        &self.metrics
    }

    /// Run every probe and collect the raw measurements.
    ///
    /// A probe that cannot be set up contributes a zero-rate result rated
    /// `Error`; only cancellation aborts the run.
    pub fn run(&self) -> Result<BenchmarkResults, BenchError> {
        self.step.set(0);
        self.logger.log_run_started(
            self.config.profile.as_str(),
            self.config.planned_duration(),
            &self.config.test_dir,
        );

        let started = Instant::now();
        let results = BenchmarkResults {
            cpu: self.run_cpu()?,
            memory: self.run_memory()?,
            disk: self.run_disk()?,
        };

        debug!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "All probes finished"
        );
        Ok(results)
    }

    /// Publish the scored outcome of a finished run to metrics and logs
    pub fn record_outcome(&self, summary: &Summary, verdict: &Verdict) {
        self.metrics.record_summary(summary);
        self.logger.log_verdict(summary, verdict);
    }

    fn run_cpu(&self) -> Result<CpuResults, BenchError> {
        let budget = self.config.cpu_budget();
        Ok(CpuResults {
            keccak: self.run_probe("cpu", &KeccakProbe::new(), budget.keccak)?,
            ecdsa: self.run_probe("cpu", &EcdsaProbe, budget.ecdsa)?,
            bls: self.run_probe("cpu", &BlsProbe, budget.bls)?,
            bn256: self.run_probe("cpu", &Bn256Probe, budget.bn256)?,
        })
    }

    fn run_memory(&self) -> Result<MemoryResults, BenchError> {
        let budget = self.config.memory_budget();
        Ok(MemoryResults {
            trie: self.run_probe("memory", &TrieProbe::default(), budget.trie)?,
            pool: self.run_probe("memory", &PoolProbe, budget.pool)?,
            state_cache: self.run_probe("memory", &StateCacheProbe::default(), budget.state_cache)?,
        })
    }

    fn run_disk(&self) -> Result<DiskResults, BenchError> {
        let budget = self.config.disk_budget();
        let dir = &self.config.test_dir;
        let random = RandomProbe::new(dir).with_file_size(self.config.random_file_size);

        Ok(DiskResults {
            sequential: self.run_probe("disk", &SequentialProbe::new(dir), budget.sequential)?,
            random: self.run_probe("disk", &random, budget.random)?,
            batch: self.run_probe("disk", &BatchProbe::new(dir), budget.batch)?,
        })
    }

    fn run_probe<P: Probe>(
        &self,
        domain: &'static str,
        probe: &P,
        budget: Duration,
    ) -> Result<P::Output, BenchError> {
        let name = probe.name();
        if self.cancel.is_cancelled() {
            return Err(self.cancelled(name));
        }

        let step = self.step.get() + 1;
        self.step.set(step);
        self.logger
            .log_probe_started(step, PROBE_COUNT, domain, name, probe.label(), budget);

        let output = match probe.run(budget, &self.cancel) {
            Ok(output) => output,
            Err(e) => {
                self.logger.log_probe_failed(domain, name, &e.to_string());
                P::Output::failed(&e)
            }
        };

        self.metrics.record_probe(domain, name, output.meta());
        if self.cancel.is_cancelled() {
            return Err(self.cancelled(name));
        }
        self.logger.log_probe_completed(domain, name, output.meta());
        Ok(output)
    }

    fn cancelled(&self, probe: &'static str) -> BenchError {
        self.logger.log_run_cancelled(probe);
        self.metrics.inc_runs_cancelled();
        BenchError::Cancelled { probe }
    }
}

/// Builder for a [`BenchmarkRunner`]
pub struct BenchmarkRunnerBuilder {
    config: BenchConfig,
    cancel: Option<CancelToken>,
    metrics: Option<BenchMetrics>,
    host: String,
}

impl BenchmarkRunnerBuilder {
    /// Create a new builder with the default profile
    pub fn new() -> Self {
        Self {
            config: BenchConfig::default(),
            cancel: None,
            metrics: None,
            host: "localhost".to_string(),
        }
    }

    pub fn config(mut self, config: BenchConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing cancellation token, e.g. one wired to Ctrl-C
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn metrics(mut self, metrics: BenchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Host name attached to every structured log event
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn build(self) -> BenchmarkRunner {
        BenchmarkRunner {
            config: self.config,
            cancel: self.cancel.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            logger: StructuredLogger::new(self.host),
            step: Cell::new(0),
        }
    }
}

impl Default for BenchmarkRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
