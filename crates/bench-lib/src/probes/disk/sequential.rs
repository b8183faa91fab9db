//! Sequential write and read throughput

use super::{drop_page_cache, scratch_file};
use crate::budget::{allocate, Share};
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop};
use crate::models::{Rating, SequentialResult};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use rand::RngCore;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// write, read
const PHASES: [Share; 2] = [Share::new(1, 2); 2];

/// Table file flush and snapshot chunk sizes, written alternately
pub const WRITE_BLOCKS: [usize; 2] = [128 * 1024, 1024 * 1024];

pub const READ_BLOCK: usize = 1024 * 1024;

/// Streaming writes followed by uncached streaming reads of the same file
#[derive(Debug, Clone)]
pub struct SequentialProbe {
    dir: PathBuf,
}

impl SequentialProbe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes weigh slightly more than reads for a syncing node
    pub fn rating_input(write_mbps: f64, read_mbps: f64) -> f64 {
        0.6 * write_mbps + 0.4 * read_mbps
    }
}

impl Probe for SequentialProbe {
    type Output = SequentialResult;

    fn name(&self) -> &'static str {
        "sequential"
    }

    fn label(&self) -> &'static str {
        "Sequential I/O"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<SequentialResult, ProbeError> {
        let [write_budget, read_budget] = allocate(budget, &PHASES);

        let scratch = scratch_file(&self.dir, "nodebench-seq-")?;
        let mut block = vec![0u8; READ_BLOCK.max(WRITE_BLOCKS[1])];
        fixture_rng().fill_bytes(&mut block);

        let mut writer = scratch.reopen()?;
        let mut write = TimedLoop::new(write_budget).cancel_on(cancel).run(|| {
            let mut written = 0u64;
            for size in WRITE_BLOCKS {
                if writer.write_all(&block[..size]).is_err() {
                    return Outcome::Failed;
                }
                written += size as u64;
            }
            Outcome::Completed {
                ops: WRITE_BLOCKS.len() as u64,
                bytes: written,
            }
        });
        // The flush belongs to the write phase
        let sync_start = Instant::now();
        writer.sync_all()?;
        write.elapsed += sync_start.elapsed();
        drop(writer);

        let mut reader = File::open(scratch.path())?;
        drop_page_cache(&reader);
        let read = TimedLoop::new(read_budget).cancel_on(cancel).run(|| {
            match reader.read(&mut block[..READ_BLOCK]) {
                Ok(0) => {
                    // Wrap around and make sure the second pass is uncached too
                    if reader.seek(SeekFrom::Start(0)).is_err() {
                        return Outcome::Failed;
                    }
                    drop_page_cache(&reader);
                    Outcome::ops(0)
                }
                Ok(n) => Outcome::bytes(n as u64),
                Err(_) => Outcome::Failed,
            }
        });

        let write_speed_mbps = write.mb_per_second();
        let read_speed_mbps = read.mb_per_second();
        let rating = Rating::classify(
            Self::rating_input(write_speed_mbps, read_speed_mbps),
            MetricId::Sequential.curve(),
        );

        Ok(SequentialResult {
            write_speed_mbps,
            read_speed_mbps,
            meta: finish(&[write, read], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let result = SequentialProbe::new(dir.path())
            .run(Duration::from_millis(100), &CancelToken::new())
            .unwrap();

        assert!(result.write_speed_mbps > 0.0);
        assert!(result.read_speed_mbps > 0.0);
        assert!(!result.meta.is_error());
    }

    #[test]
    fn test_scratch_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        SequentialProbe::new(dir.path())
            .run(Duration::from_millis(10), &CancelToken::new())
            .unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let err = SequentialProbe::new(missing)
            .run(Duration::from_millis(10), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ProbeError::Io(_)));
    }
}
