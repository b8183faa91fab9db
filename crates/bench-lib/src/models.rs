//! Core data models for benchmark results

use crate::scoring::CalibrationCurve;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Qualitative label attached to every probe result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Adequate,
    Marginal,
    #[default]
    Poor,
    Error,
}

impl Rating {
    /// Rate a value against the breakpoints of a calibration curve.
    ///
    /// Reaching `marginal` is rated `Adequate` and reaching `poor` is rated
    /// `Marginal`: the labels describe the band the value has climbed into.
    pub fn classify(value: f64, curve: &CalibrationCurve) -> Self {
        if value >= curve.excellent {
            Rating::Excellent
        } else if value >= curve.good {
            Rating::Good
        } else if value >= curve.marginal {
            Rating::Adequate
        } else if value >= curve.poor {
            Rating::Marginal
        } else {
            Rating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Adequate => "Adequate",
            Rating::Marginal => "Marginal",
            Rating::Poor => "Poor",
            Rating::Error => "Error",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every probe result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeMeta {
    /// Wall time actually consumed, summed over phases
    #[serde(rename = "duration_ns", with = "duration_ns")]
    pub duration: Duration,
    pub rating: Rating,
    /// Units that failed (or 1 for a probe that could not be set up)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub failures: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl ProbeMeta {
    pub fn new(duration: Duration, rating: Rating) -> Self {
        Self {
            duration,
            rating,
            failures: 0,
            error: None,
        }
    }

    /// Metadata for a probe that could not run at all
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            duration: Duration::ZERO,
            rating: Rating::Error,
            failures: 1,
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.rating == Rating::Error
    }
}

/// Serialize a `Duration` as integer nanoseconds
pub mod duration_ns {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_nanos(u64::deserialize(deserializer)?))
    }
}

/// Keccak-256 hashing throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeccakResult {
    pub hashes_per_second: f64,
    pub total_hashes: u64,
    pub data_processed_mb: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// secp256k1 ECDSA throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcdsaResult {
    pub signatures_per_second: f64,
    pub verifications_per_second: f64,
    pub recoveries_per_second: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// BLS12-381 throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlsResult {
    pub signatures_per_second: f64,
    pub verifications_per_second: f64,
    pub aggregations_per_second: f64,
    pub batch_verifications_per_second: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// BN254 precompile throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bn256Result {
    pub g1_adds_per_second: f64,
    pub g1_scalar_muls_per_second: f64,
    pub pairings_per_second: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// Merkle-Patricia-trie style access throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrieResult {
    pub inserts_per_second: f64,
    pub lookups_per_second: f64,
    pub hashes_per_second: f64,
    pub peak_memory_mb: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// Scratch buffer pool throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolResult {
    pub allocations_per_second: f64,
    pub reuses_per_second: f64,
    pub memory_churn_mb: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// Account and storage cache throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateCacheResult {
    pub cache_hits_per_second: f64,
    pub cache_misses_per_second: f64,
    pub hit_ratio: f64,
    pub throughput_mb_per_sec: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// Sequential file I/O throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequentialResult {
    pub write_speed_mbps: f64,
    pub read_speed_mbps: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// Random 4 KiB I/O
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RandomResult {
    pub read_iops: f64,
    pub write_iops: f64,
    pub avg_latency_us: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

/// Durable batch writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batches_per_second: f64,
    pub throughput_mbps: f64,
    pub avg_batch_latency_ms: f64,
    #[serde(flatten)]
    pub meta: ProbeMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuResults {
    pub keccak: KeccakResult,
    pub ecdsa: EcdsaResult,
    pub bls: BlsResult,
    pub bn256: Bn256Result,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryResults {
    pub trie: TrieResult,
    pub pool: PoolResult,
    pub state_cache: StateCacheResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskResults {
    pub sequential: SequentialResult,
    pub random: RandomResult,
    pub batch: BatchResult,
}

/// Raw measurements from one complete run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResults {
    pub cpu: CpuResults,
    pub memory: MemoryResults,
    pub disk: DiskResults,
}
