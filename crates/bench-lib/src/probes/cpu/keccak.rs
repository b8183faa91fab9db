//! Keccak-256 hashing throughput

use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop, MIB};
use crate::models::{KeccakResult, Rating};
use crate::probes::{finish, fixture_rng, Probe, ScratchPool};
use crate::scoring::MetricId;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use std::hint::black_box;
use std::time::Duration;

/// Input lengths hashed by every unit: a hash, two concatenated hashes,
/// a small record and a maximal branch node encoding
pub const INPUT_SIZES: [usize; 4] = [32, 64, 128, 550];

/// Keccak-256 over the input sizes seen in state tries and transactions
#[derive(Debug, Clone)]
pub struct KeccakProbe {
    inputs: Vec<Vec<u8>>,
}

impl Default for KeccakProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl KeccakProbe {
    pub fn new() -> Self {
        let mut rng = fixture_rng();
        let inputs = INPUT_SIZES
            .iter()
            .map(|&size| {
                let mut buf = vec![0u8; size];
                rng.fill_bytes(&mut buf);
                buf
            })
            .collect();
        Self { inputs }
    }
}

impl Probe for KeccakProbe {
    type Output = KeccakResult;

    fn name(&self) -> &'static str {
        "keccak256"
    }

    fn label(&self) -> &'static str {
        "Keccak256 hashing"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<KeccakResult, ProbeError> {
        let mut hashers: ScratchPool<Keccak256> = ScratchPool::new(1);
        let mut digest = [0u8; 32];
        let hashes_per_unit = self.inputs.len() as u64;
        let bytes_per_unit: u64 = self.inputs.iter().map(|i| i.len() as u64).sum();

        let tally = TimedLoop::new(budget).cancel_on(cancel).run(|| {
            for input in &self.inputs {
                let mut hasher = hashers.take();
                hasher.update(input);
                digest.copy_from_slice(&hasher.finalize_reset());
                hashers.give(hasher);
            }
            black_box(&digest);
            Outcome::Completed {
                ops: hashes_per_unit,
                bytes: bytes_per_unit,
            }
        });

        let hashes_per_second = tally.rate();
        Ok(KeccakResult {
            hashes_per_second,
            total_hashes: tally.successes,
            data_processed_mb: tally.bytes as f64 / MIB,
            meta: finish(
                &[tally],
                Rating::classify(hashes_per_second, MetricId::Keccak.curve()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_run_counts_hashes() {
        let probe = KeccakProbe::new();
        let result = probe
            .run(Duration::from_millis(20), &CancelToken::new())
            .unwrap();

        assert!(result.total_hashes > 0);
        assert_eq!(result.total_hashes % INPUT_SIZES.len() as u64, 0);
        assert!(result.hashes_per_second > 0.0);
        assert!(result.data_processed_mb > 0.0);
        assert!(result.meta.duration >= Duration::from_millis(20));
        assert!(!result.meta.is_error());
    }

    #[test]
    fn test_zero_budget() {
        let result = KeccakProbe::new()
            .run(Duration::ZERO, &CancelToken::new())
            .unwrap();
        assert_eq!(result.total_hashes, 0);
        assert_eq!(result.hashes_per_second, 0.0);
        assert_eq!(result.meta.rating, Rating::Poor);
    }

    #[test]
    fn test_inputs_match_sizes() {
        let probe = KeccakProbe::new();
        let sizes: Vec<usize> = probe.inputs.iter().map(Vec::len).collect();
        assert_eq!(sizes, INPUT_SIZES);
    }

    #[test]
    fn test_known_digest() {
        // Keccak-256 of the empty string
        let digest = Keccak256::digest(b"");
        assert_eq!(
            digest[..4],
            [0xc5, 0xd2, 0x46, 0x01],
            "legacy Keccak padding expected, not SHA3-256"
        );
    }
}
