//! Static calibration and weight table
//!
//! The one place where breakpoints and weights are defined. Probes use the
//! same curves for their qualitative rating.

use super::CalibrationCurve;
use crate::models::BenchmarkResults;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cpu,
    Memory,
    Disk,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Cpu, Category::Memory, Category::Disk];

    /// Weight of the category in the overall score, in percent
    pub const fn overall_percent(&self) -> u32 {
        match self {
            Category::Cpu => 40,
            Category::Memory => 25,
            Category::Disk => 35,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Memory => "memory",
            Category::Disk => "disk",
        }
    }

    /// Table rows belonging to this category, in declaration order
    pub fn metrics(&self) -> impl Iterator<Item = &'static MetricSpec> + '_ {
        METRIC_TABLE.iter().filter(move |spec| spec.category == *self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored metric identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Keccak,
    EcdsaVerify,
    BlsVerify,
    Bn256Pair,
    TrieInsert,
    PoolOps,
    CacheHits,
    Sequential,
    RandomIops,
    Batch,
}

impl MetricId {
    pub fn spec(&self) -> &'static MetricSpec {
        &METRIC_TABLE[*self as usize]
    }

    pub fn curve(&self) -> &'static CalibrationCurve {
        &self.spec().curve
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().name
    }

    /// Raw value this metric scores, extracted from a run
    pub fn raw_value(&self, results: &BenchmarkResults) -> f64 {
        (self.spec().extract)(results)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the scoring table
#[derive(Debug)]
pub struct MetricSpec {
    pub id: MetricId,
    pub name: &'static str,
    pub category: Category,
    /// Weight within the category, in percent
    pub weight_percent: u32,
    pub unit: &'static str,
    pub curve: CalibrationCurve,
    pub extract: fn(&BenchmarkResults) -> f64,
}

impl MetricSpec {
    pub fn weight(&self) -> f64 {
        f64::from(self.weight_percent) / 100.0
    }
}

fn mean(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

/// Rows are indexed by `MetricId as usize`
pub static METRIC_TABLE: [MetricSpec; 10] = [
    MetricSpec {
        id: MetricId::Keccak,
        name: "keccak",
        category: Category::Cpu,
        weight_percent: 25,
        unit: "hashes/s",
        curve: CalibrationCurve::new(50_000.0, 100_000.0, 200_000.0, 500_000.0),
        extract: |r| r.cpu.keccak.hashes_per_second,
    },
    MetricSpec {
        id: MetricId::EcdsaVerify,
        name: "ecdsa_verify",
        category: Category::Cpu,
        weight_percent: 35,
        unit: "verify/s",
        curve: CalibrationCurve::new(250.0, 500.0, 1_000.0, 2_000.0),
        extract: |r| r.cpu.ecdsa.verifications_per_second,
    },
    MetricSpec {
        id: MetricId::BlsVerify,
        name: "bls_verify",
        category: Category::Cpu,
        weight_percent: 25,
        unit: "verify/s",
        curve: CalibrationCurve::new(50.0, 100.0, 200.0, 500.0),
        extract: |r| r.cpu.bls.verifications_per_second,
    },
    MetricSpec {
        id: MetricId::Bn256Pair,
        name: "bn256_pair",
        category: Category::Cpu,
        weight_percent: 15,
        unit: "pairings/s",
        curve: CalibrationCurve::new(10.0, 25.0, 50.0, 100.0),
        extract: |r| r.cpu.bn256.pairings_per_second,
    },
    MetricSpec {
        id: MetricId::TrieInsert,
        name: "trie_insert",
        category: Category::Memory,
        weight_percent: 40,
        unit: "inserts/s",
        curve: CalibrationCurve::new(5_000.0, 10_000.0, 20_000.0, 50_000.0),
        extract: |r| r.memory.trie.inserts_per_second,
    },
    MetricSpec {
        id: MetricId::PoolOps,
        name: "pool_ops",
        category: Category::Memory,
        weight_percent: 30,
        unit: "ops/s",
        curve: CalibrationCurve::new(50_000.0, 100_000.0, 200_000.0, 500_000.0),
        extract: |r| r.memory.pool.allocations_per_second + r.memory.pool.reuses_per_second,
    },
    MetricSpec {
        id: MetricId::CacheHits,
        name: "cache_hits",
        category: Category::Memory,
        weight_percent: 30,
        unit: "hits/s",
        curve: CalibrationCurve::new(50_000.0, 100_000.0, 200_000.0, 500_000.0),
        extract: |r| r.memory.state_cache.cache_hits_per_second,
    },
    MetricSpec {
        id: MetricId::Sequential,
        name: "sequential",
        category: Category::Disk,
        weight_percent: 30,
        unit: "MB/s",
        curve: CalibrationCurve::new(50.0, 100.0, 200.0, 400.0),
        extract: |r| mean(r.disk.sequential.write_speed_mbps, r.disk.sequential.read_speed_mbps),
    },
    MetricSpec {
        id: MetricId::RandomIops,
        name: "random_iops",
        category: Category::Disk,
        weight_percent: 45,
        unit: "IOPS",
        curve: CalibrationCurve::new(5_000.0, 10_000.0, 20_000.0, 50_000.0),
        extract: |r| mean(r.disk.random.read_iops, r.disk.random.write_iops),
    },
    MetricSpec {
        id: MetricId::Batch,
        name: "batch",
        category: Category::Disk,
        weight_percent: 25,
        unit: "MB/s",
        curve: CalibrationCurve::new(10.0, 25.0, 50.0, 100.0),
        extract: |r| r.disk.batch.throughput_mbps,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_indexed_by_id() {
        for (index, spec) in METRIC_TABLE.iter().enumerate() {
            assert_eq!(spec.id as usize, index, "row {} out of place", spec.name);
        }
    }

    #[test]
    fn test_category_weights_sum_to_one() {
        for category in Category::ALL {
            let total: u32 = category.metrics().map(|m| m.weight_percent).sum();
            assert_eq!(total, 100, "{category} weights must sum to 100%");
        }
        let overall: u32 = Category::ALL.iter().map(|c| c.overall_percent()).sum();
        assert_eq!(overall, 100);
    }

    #[test]
    fn test_curves_valid() {
        for spec in &METRIC_TABLE {
            assert!(spec.curve.is_valid(), "curve for {} is degenerate", spec.name);
        }
    }

    #[test]
    fn test_metric_counts() {
        assert_eq!(Category::Cpu.metrics().count(), 4);
        assert_eq!(Category::Memory.metrics().count(), 3);
        assert_eq!(Category::Disk.metrics().count(), 3);
    }

    #[test]
    fn test_derived_raw_values() {
        let mut results = BenchmarkResults::default();
        results.memory.pool.allocations_per_second = 1_000.0;
        results.memory.pool.reuses_per_second = 2_000.0;
        results.disk.sequential.write_speed_mbps = 100.0;
        results.disk.sequential.read_speed_mbps = 300.0;
        results.disk.random.read_iops = 10_000.0;
        results.disk.random.write_iops = 2_000.0;

        assert_eq!(MetricId::PoolOps.raw_value(&results), 3_000.0);
        assert_eq!(MetricId::Sequential.raw_value(&results), 200.0);
        assert_eq!(MetricId::RandomIops.raw_value(&results), 6_000.0);
    }
}
