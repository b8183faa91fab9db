//! Durable batch writes with fsync

use super::scratch_file;
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop};
use crate::models::{BatchResult, Rating};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use rand::RngCore;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Key/value pairs per committed batch
pub const BATCH_ENTRIES: usize = 2000;

/// Average encoded key/value size
pub const ENTRY_SIZE: usize = 100;

pub const BATCH_BYTES: usize = BATCH_ENTRIES * ENTRY_SIZE;

/// Key/value store batch commits, each made durable before the next
#[derive(Debug, Clone)]
pub struct BatchProbe {
    dir: PathBuf,
}

impl BatchProbe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Probe for BatchProbe {
    type Output = BatchResult;

    fn name(&self) -> &'static str {
        "batch"
    }

    fn label(&self) -> &'static str {
        "Batch writes"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<BatchResult, ProbeError> {
        let scratch = scratch_file(&self.dir, "nodebench-batch-")?;
        let mut file = scratch.reopen()?;
        let mut rng = fixture_rng();
        let mut batch = vec![0u8; BATCH_BYTES];
        let mut commit_time = Duration::ZERO;

        let tally = TimedLoop::new(budget).cancel_on(cancel).run(|| {
            // Filling the batch is not part of the commit latency
            rng.fill_bytes(&mut batch);

            let commit_start = Instant::now();
            let result = file.write_all(&batch).and_then(|_| file.sync_data());
            match result {
                Ok(()) => {
                    commit_time += commit_start.elapsed();
                    Outcome::bytes(BATCH_BYTES as u64)
                }
                Err(_) => Outcome::Failed,
            }
        });

        let avg_batch_latency_ms = if tally.successes == 0 {
            0.0
        } else {
            commit_time.as_secs_f64() * 1e3 / tally.successes as f64
        };
        let throughput_mbps = tally.mb_per_second();
        let rating = Rating::classify(throughput_mbps, MetricId::Batch.curve());

        Ok(BatchResult {
            batches_per_second: tally.rate(),
            throughput_mbps,
            avg_batch_latency_ms,
            meta: finish(&[tally], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durable_batches() {
        let dir = tempfile::tempdir().unwrap();
        let result = BatchProbe::new(dir.path())
            .run(Duration::from_millis(50), &CancelToken::new())
            .unwrap();

        assert!(result.batches_per_second > 0.0);
        assert!(result.throughput_mbps > 0.0);
        assert!(result.avg_batch_latency_ms > 0.0);
        // Every batch moves the same number of bytes
        let expected = result.batches_per_second * BATCH_BYTES as f64 / crate::kernel::MIB;
        assert!((result.throughput_mbps - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn test_batch_size() {
        assert_eq!(BATCH_BYTES, 200_000);
    }
}
