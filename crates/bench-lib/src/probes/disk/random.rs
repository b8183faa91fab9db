//! Random 4 KiB reads and writes

use super::scratch_file;
use crate::budget::{allocate, Share, DEFAULT_RANDOM_FILE_SIZE};
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop};
use crate::models::{RandomResult, Rating};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use rand::{Rng, RngCore};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// reads, writes
const PHASES: [Share; 2] = [Share::new(3, 5), Share::new(2, 5)];

/// Trie node sized access
pub const BLOCK_SIZE: u64 = 4096;

/// Spacing of the seed blocks written while preparing the file
const SEED_STRIDE: u64 = 1024 * 1024;

/// Random 4 KiB reads and writes across a pre-sized file
#[derive(Debug, Clone)]
pub struct RandomProbe {
    dir: PathBuf,
    file_size: u64,
}

impl RandomProbe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_size: DEFAULT_RANDOM_FILE_SIZE,
        }
    }

    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size = bytes;
        self
    }

    /// Reads carry most of the weight, they back state lookups
    pub fn rating_input(read_iops: f64, write_iops: f64) -> f64 {
        0.7 * read_iops + 0.3 * write_iops
    }
}

fn prepare(file: &mut File, size: u64, block: &mut [u8], rng: &mut impl RngCore) -> std::io::Result<()> {
    file.set_len(size)?;
    let mut offset = 0;
    while offset + BLOCK_SIZE <= size {
        rng.fill_bytes(block);
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(block)?;
        offset += SEED_STRIDE;
    }
    file.sync_all()
}

impl Probe for RandomProbe {
    type Output = RandomResult;

    fn name(&self) -> &'static str {
        "random"
    }

    fn label(&self) -> &'static str {
        "Random I/O"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<RandomResult, ProbeError> {
        let blocks = self.file_size / BLOCK_SIZE;
        if blocks == 0 {
            return Err(ProbeError::Setup(format!(
                "random I/O file of {} bytes holds no {BLOCK_SIZE}-byte block",
                self.file_size
            )));
        }

        let scratch = scratch_file(&self.dir, "nodebench-random-")?;
        let mut file = scratch.reopen()?;
        let mut rng = fixture_rng();
        let mut block = vec![0u8; BLOCK_SIZE as usize];
        prepare(&mut file, self.file_size, &mut block, &mut rng)?;

        let [read_budget, write_budget] = allocate(budget, &PHASES);

        let read = TimedLoop::new(read_budget)
            .cancel_on(cancel)
            .track_latency()
            .run(|| {
                let offset = rng.gen_range(0..blocks) * BLOCK_SIZE;
                let result = file
                    .seek(SeekFrom::Start(offset))
                    .and_then(|_| file.read_exact(&mut block));
                Outcome::from_result(result)
            });

        let mut write = TimedLoop::new(write_budget)
            .cancel_on(cancel)
            .track_latency()
            .run(|| {
                let offset = rng.gen_range(0..blocks) * BLOCK_SIZE;
                rng.fill_bytes(&mut block);
                let result = file
                    .seek(SeekFrom::Start(offset))
                    .and_then(|_| file.write_all(&block));
                Outcome::from_result(result)
            });
        let sync_start = Instant::now();
        file.sync_all()?;
        write.elapsed += sync_start.elapsed();

        let completed = read.successes + write.successes;
        let avg_latency_us = if completed == 0 {
            0.0
        } else {
            (read.busy + write.busy).as_secs_f64() * 1e6 / completed as f64
        };

        let read_iops = read.rate();
        let write_iops = write.rate();
        let rating = Rating::classify(
            Self::rating_input(read_iops, write_iops),
            MetricId::RandomIops.curve(),
        );

        Ok(RandomResult {
            read_iops,
            write_iops,
            avg_latency_us,
            meta: finish(&[read, write], rating),
        })
    }
}
