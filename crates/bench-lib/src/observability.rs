//! Observability for benchmark runs
//!
//! Provides:
//! - Prometheus gauges (probe durations and failure counts, raw metric values,
//!   metric/category/overall scores) exportable as a textfile
//! - Structured logging with tracing

use crate::error::BenchError;
use crate::models::ProbeMeta;
use crate::scoring::{Summary, Verdict};
use prometheus::{register_gauge_vec, register_int_gauge, Encoder, GaugeVec, IntGauge, TextEncoder};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<BenchMetricsInner> = OnceLock::new();

struct BenchMetricsInner {
    probe_duration_seconds: GaugeVec,
    probe_failures: GaugeVec,
    metric_raw_value: GaugeVec,
    metric_score: GaugeVec,
    category_score: GaugeVec,
    overall_score: IntGauge,
    runs_cancelled: IntGauge,
}

impl BenchMetricsInner {
    fn new() -> Self {
        Self {
            probe_duration_seconds: register_gauge_vec!(
                "nodebench_probe_duration_seconds",
                "Wall time consumed by a probe, summed over its phases",
                &["domain", "probe"]
            )
            .expect("Failed to register probe_duration_seconds"),

            probe_failures: register_gauge_vec!(
                "nodebench_probe_failures",
                "Failed units of a probe; 1 when it could not be set up",
                &["domain", "probe"]
            )
            .expect("Failed to register probe_failures"),

            metric_raw_value: register_gauge_vec!(
                "nodebench_metric_raw_value",
                "Raw value fed into the scoring curve",
                &["category", "metric"]
            )
            .expect("Failed to register metric_raw_value"),

            metric_score: register_gauge_vec!(
                "nodebench_metric_score",
                "Metric score between 0 and 100",
                &["category", "metric"]
            )
            .expect("Failed to register metric_score"),

            category_score: register_gauge_vec!(
                "nodebench_category_score",
                "Weighted category score between 0 and 100",
                &["category"]
            )
            .expect("Failed to register category_score"),

            overall_score: register_int_gauge!(
                "nodebench_overall_score",
                "Overall readiness score between 0 and 100"
            )
            .expect("Failed to register overall_score"),

            runs_cancelled: register_int_gauge!(
                "nodebench_runs_cancelled_total",
                "Benchmark runs aborted before completion"
            )
            .expect("Failed to register runs_cancelled"),
        }
    }
}

/// Benchmark metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics; clones share the same gauges.
#[derive(Clone)]
pub struct BenchMetrics {
    inner: &'static BenchMetricsInner,
}

impl Default for BenchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BenchMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchMetrics").finish_non_exhaustive()
    }
}

impl BenchMetrics {
    pub fn new() -> Self {
        Self {
            inner: GLOBAL_METRICS.get_or_init(BenchMetricsInner::new),
        }
    }

    /// Record how long a probe ran and how many of its units failed
    pub fn record_probe(&self, domain: &str, probe: &str, meta: &ProbeMeta) {
        self.inner
            .probe_duration_seconds
            .with_label_values(&[domain, probe])
            .set(meta.duration.as_secs_f64());
        self.inner
            .probe_failures
            .with_label_values(&[domain, probe])
            .set(meta.failures as f64);
    }

    /// Record every metric, category and the overall score of a run
    pub fn record_summary(&self, summary: &Summary) {
        for category in &summary.categories {
            let category_label = category.category.as_str();
            self.inner
                .category_score
                .with_label_values(&[category_label])
                .set(f64::from(category.score));

            for metric in &category.metrics {
                let labels = [category_label, metric.metric.as_str()];
                self.inner
                    .metric_raw_value
                    .with_label_values(&labels)
                    .set(metric.raw_value);
                self.inner.metric_score.with_label_values(&labels).set(metric.score);
            }
        }
        self.inner.overall_score.set(i64::from(summary.total_score));
    }

    pub fn inc_runs_cancelled(&self) {
        self.inner.runs_cancelled.inc();
    }

    /// Encode the default registry in the text exposition format
    pub fn render(&self) -> Result<String, BenchError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| BenchError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| BenchError::Metrics(e.to_string()))
    }

    /// Write the metrics for a node-exporter textfile collector.
    ///
    /// The file is written next to `path` and renamed into place so the
    /// collector never reads a partial file.
    pub fn write_textfile(&self, path: &Path) -> Result<(), BenchError> {
        let body = self.render()?;
        let staging = path.with_extension("prom.tmp");
        let io_err = |source| BenchError::ReportIo {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&staging, body).map_err(io_err)?;
        fs::rename(&staging, path).map_err(io_err)
    }
}

/// Structured logger for benchmark events
///
/// Every event carries an `event` field so log pipelines can select on it.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    host: String,
}

impl StructuredLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn log_run_started(&self, profile: &str, planned: Duration, test_dir: &Path) {
        info!(
            event = "run_started",
            host = %self.host,
            profile = %profile,
            planned_secs = planned.as_secs_f64(),
            test_dir = %test_dir.display(),
            "Benchmark run started"
        );
    }

    pub fn log_probe_started(
        &self,
        step: usize,
        total: usize,
        domain: &str,
        probe: &str,
        label: &str,
        budget: Duration,
    ) {
        info!(
            event = "probe_started",
            host = %self.host,
            step = step,
            total = total,
            domain = %domain,
            probe = %probe,
            label = %label,
            budget_secs = budget.as_secs_f64(),
            "[{step}/{total}] Running {label}"
        );
    }

    pub fn log_probe_completed(&self, domain: &str, probe: &str, meta: &ProbeMeta) {
        info!(
            event = "probe_completed",
            host = %self.host,
            domain = %domain,
            probe = %probe,
            rating = %meta.rating,
            failures = meta.failures,
            elapsed_secs = meta.duration.as_secs_f64(),
            "Probe completed"
        );
    }

    pub fn log_probe_failed(&self, domain: &str, probe: &str, error: &str) {
        warn!(
            event = "probe_failed",
            host = %self.host,
            domain = %domain,
            probe = %probe,
            error = %error,
            "Probe failed, scoring it as zero"
        );
    }

    pub fn log_run_cancelled(&self, probe: &str) {
        warn!(
            event = "run_cancelled",
            host = %self.host,
            probe = %probe,
            "Benchmark cancelled"
        );
    }

    pub fn log_verdict(&self, summary: &Summary, verdict: &Verdict) {
        info!(
            event = "verdict_reached",
            host = %self.host,
            cpu_score = summary.cpu_score,
            memory_score = summary.memory_score,
            disk_score = summary.disk_score,
            overall_score = verdict.overall_score,
            tier = %verdict.tier,
            execution_client = %verdict.execution_client,
            consensus_client = %verdict.consensus_client,
            ready = verdict.is_ready(),
            advisories = verdict.advisories.len(),
            "Verdict reached"
        );
    }
}
