//! Time-boxed probes
//!
//! Each probe exercises one node workload (hashing, signature checks,
//! state access, storage I/O) through [`TimedLoop`](crate::kernel::TimedLoop)
//! and reports its rates in a typed result. Probes own every scratch
//! resource they touch and release it before returning.

pub mod cpu;
pub mod disk;
pub mod memory;
mod scratch;

pub use scratch::ScratchPool;

use crate::error::ProbeError;
use crate::kernel::{CancelToken, Tally};
use crate::models::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::time::Duration;

/// Seed for keys, scalars and payloads so every run exercises identical data
const FIXTURE_SEED: u64 = 0x6e6f_6465_6265_6e63;

pub(crate) fn fixture_rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(FIXTURE_SEED)
}

/// A single measurement unit run against a wall-clock budget
pub trait Probe {
    type Output: ProbeOutput;

    /// Stable identifier used in logs and metrics
    fn name(&self) -> &'static str;

    /// Human-readable label
    fn label(&self) -> &'static str;

    /// Run for roughly `budget`, stopping early if `cancel` fires.
    ///
    /// Errors are setup failures; per-iteration failures are counted
    /// inside the result instead.
    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<Self::Output, ProbeError>;
}

/// Common view over probe results
pub trait ProbeOutput: Default {
    fn meta(&self) -> &ProbeMeta;

    fn meta_mut(&mut self) -> &mut ProbeMeta;

    /// Zero-rate result rated `Error`
    fn failed(error: &ProbeError) -> Self {
        let mut output = Self::default();
        *output.meta_mut() = ProbeMeta::failed(error);
        output
    }
}

macro_rules! impl_probe_output {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ProbeOutput for $ty {
                fn meta(&self) -> &ProbeMeta {
                    &self.meta
                }

                fn meta_mut(&mut self) -> &mut ProbeMeta {
                    &mut self.meta
                }
            }
        )+
    };
}

impl_probe_output!(
    KeccakResult,
    EcdsaResult,
    BlsResult,
    Bn256Result,
    TrieResult,
    PoolResult,
    StateCacheResult,
    SequentialResult,
    RandomResult,
    BatchResult,
);

/// Metadata for a finished multi-phase probe.
///
/// The rating is `Error` only when every phase that ran recorded failures
/// and nothing succeeded.
pub(crate) fn finish(tallies: &[Tally], rating: Rating) -> ProbeMeta {
    let duration = crate::kernel::total_elapsed(tallies);
    let failures: u64 = tallies.iter().map(|t| t.failures).sum();
    let ran = tallies.iter().any(|t| t.iterations() > 0);
    let all_failed = ran && tallies.iter().all(|t| t.successes == 0);

    if all_failed {
        ProbeMeta {
            duration,
            rating: Rating::Error,
            failures,
            error: Some(format!("all {failures} iterations failed")),
        }
    } else {
        ProbeMeta {
            failures,
            ..ProbeMeta::new(duration, rating)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_output_is_zero_rate() {
        let err = ProbeError::Setup("no scratch space".into());
        let result = SequentialResult::failed(&err);

        assert_eq!(result.write_speed_mbps, 0.0);
        assert!(result.meta().is_error());
        assert!(result.meta().error.as_deref().unwrap().contains("no scratch space"));
    }

    #[test]
    fn test_finish_all_failed() {
        let tally = Tally {
            failures: 3,
            elapsed: Duration::from_millis(2),
            ..Default::default()
        };
        let meta = finish(&[tally], Rating::Poor);
        assert_eq!(meta.rating, Rating::Error);
        assert_eq!(meta.duration, Duration::from_millis(2));
        assert_eq!(meta.failures, 3);
    }

    #[test]
    fn test_finish_partial_failures_keep_rating() {
        let ok = Tally {
            successes: 10,
            failures: 2,
            ..Default::default()
        };
        let bad = Tally {
            failures: 5,
            ..Default::default()
        };
        let meta = finish(&[ok, bad], Rating::Good);
        assert_eq!(meta.rating, Rating::Good);
        assert_eq!(meta.failures, 7);
        assert!(meta.error.is_none());
    }

    #[test]
    fn test_finish_zero_iterations_is_not_error() {
        assert_eq!(finish(&[Tally::default()], Rating::Poor).rating, Rating::Poor);
    }
}
