//! Category and overall aggregation
//!
//! Weights are carried as integer percentages so a category whose metrics
//! all score 100 lands on exactly 100 rather than 99.99999.

use super::table::{Category, MetricId};
use super::score;
use crate::models::BenchmarkResults;
use serde::{Deserialize, Serialize};

/// One scored metric, enumerable by renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub metric: MetricId,
    pub raw_value: f64,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u32,
    pub metrics: Vec<MetricScore>,
}

/// Category and overall scores for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub cpu_score: u32,
    pub memory_score: u32,
    pub disk_score: u32,
    pub total_score: u32,
    #[serde(default)]
    pub categories: Vec<CategoryScore>,
}

impl Summary {
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// `floor(Σ weight_i * score_i)` over `(weight percent, score)` pairs,
/// clamped to [0, 100]
pub fn category_score(weighted: &[(u32, f64)]) -> u32 {
    let sum: f64 = weighted
        .iter()
        .map(|&(percent, s)| f64::from(percent) * s.clamp(0.0, 100.0))
        .sum();
    let floored = (sum / 100.0).floor();
    if floored.is_nan() {
        return 0;
    }
    floored.clamp(0.0, 100.0) as u32
}

/// `floor(0.40 * cpu + 0.35 * disk + 0.25 * memory)`
pub fn overall_score(cpu: u32, memory: u32, disk: u32) -> u32 {
    let weighted = Category::Cpu.overall_percent() * cpu.min(100)
        + Category::Memory.overall_percent() * memory.min(100)
        + Category::Disk.overall_percent() * disk.min(100);
    weighted / 100
}

fn score_category(category: Category, results: &BenchmarkResults) -> CategoryScore {
    let metrics: Vec<MetricScore> = category
        .metrics()
        .map(|spec| {
            let raw_value = spec.id.raw_value(results);
            MetricScore {
                metric: spec.id,
                raw_value,
                score: score(raw_value, &spec.curve),
                weight: spec.weight(),
            }
        })
        .collect();

    let weighted: Vec<(u32, f64)> = category
        .metrics()
        .zip(&metrics)
        .map(|(spec, m)| (spec.weight_percent, m.score))
        .collect();

    CategoryScore {
        category,
        score: category_score(&weighted),
        metrics,
    }
}

/// Score every category and roll the results up into a [`Summary`]
pub fn summarize(results: &BenchmarkResults) -> Summary {
    let categories: Vec<CategoryScore> = Category::ALL
        .iter()
        .map(|&category| score_category(category, results))
        .collect();

    let score_of = |category: Category| {
        categories
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.score)
    };
    let cpu_score = score_of(Category::Cpu);
    let memory_score = score_of(Category::Memory);
    let disk_score = score_of(Category::Disk);

    Summary {
        cpu_score,
        memory_score,
        disk_score,
        total_score: overall_score(cpu_score, memory_score, disk_score),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn excellent_results() -> BenchmarkResults {
        let mut r = BenchmarkResults::default();
        r.cpu.keccak.hashes_per_second = 600_000.0;
        r.cpu.ecdsa.verifications_per_second = 2_500.0;
        r.cpu.bls.verifications_per_second = 600.0;
        r.cpu.bn256.pairings_per_second = 120.0;
        r.memory.trie.inserts_per_second = 60_000.0;
        r.memory.pool.allocations_per_second = 300_000.0;
        r.memory.pool.reuses_per_second = 300_000.0;
        r.memory.state_cache.cache_hits_per_second = 600_000.0;
        r.disk.sequential.write_speed_mbps = 500.0;
        r.disk.sequential.read_speed_mbps = 700.0;
        r.disk.random.read_iops = 80_000.0;
        r.disk.random.write_iops = 40_000.0;
        r.disk.batch.throughput_mbps = 150.0;
        r
    }

    #[test]
    fn test_all_excellent_scores_100() {
        let summary = summarize(&excellent_results());

        assert_eq!(summary.cpu_score, 100);
        assert_eq!(summary.memory_score, 100);
        assert_eq!(summary.disk_score, 100);
        assert_eq!(summary.total_score, 100);
        assert_eq!(summary.categories.len(), 3);
    }

    #[test]
    fn test_zero_rate_pulls_category_down_by_weight() {
        let mut results = excellent_results();
        results.cpu.ecdsa.verifications_per_second = 0.0;

        let summary = summarize(&results);
        assert_eq!(summary.cpu_score, 65);
        // 0.40 * 65 + 0.35 * 100 + 0.25 * 100 = 86
        assert_eq!(summary.total_score, 86);

        let cpu = summary.category(Category::Cpu).unwrap();
        let ecdsa = cpu
            .metrics
            .iter()
            .find(|m| m.metric == MetricId::EcdsaVerify)
            .unwrap();
        assert_eq!(ecdsa.score, 0.0);
        assert!((ecdsa.weight - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_results_score_zero() {
        let summary = summarize(&BenchmarkResults::default());
        assert_eq!(summary.total_score, 0);
        assert_eq!(summary.cpu_score, 0);
    }

    #[test]
    fn test_truncation() {
        assert_eq!(category_score(&[(50, 99.9), (50, 100.0)]), 99);
        assert_eq!(overall_score(99, 99, 99), 99);
        assert_eq!(overall_score(100, 0, 0), 40);
        assert_eq!(overall_score(1, 1, 1), 1);
        assert_eq!(overall_score(1, 0, 1), 0);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        assert_eq!(category_score(&[(100, 250.0)]), 100);
        assert_eq!(category_score(&[(100, -5.0)]), 0);
        assert_eq!(category_score(&[(100, f64::NAN)]), 0);
        assert_eq!(overall_score(500, 500, 500), 100);
    }

    #[test]
    fn test_summary_serializes_stable_fields() {
        let json = serde_json::to_value(summarize(&excellent_results())).unwrap();
        assert_eq!(json["total_score"], 100);
        assert_eq!(json["categories"][0]["category"], "cpu");
        assert_eq!(json["categories"][0]["metrics"][0]["metric"], "keccak");
    }

    fn weighted_scores() -> impl Strategy<Value = Vec<(u32, f64)>> {
        // Random split of 100 percent into four weights
        (0u32..=100, 0u32..=100, 0u32..=100, prop::array::uniform4(0.0f64..=100.0)).prop_map(
            |(a, b, c, scores)| {
                let mut cuts = [a, b, c];
                cuts.sort_unstable();
                let weights = [cuts[0], cuts[1] - cuts[0], cuts[2] - cuts[1], 100 - cuts[2]];
                weights.into_iter().zip(scores).collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_category_score_bounded(weighted in weighted_scores()) {
            let s = category_score(&weighted);
            prop_assert!(s <= 100);
        }

        #[test]
        fn prop_category_score_never_exceeds_max_input(weighted in weighted_scores()) {
            let max = weighted.iter().map(|&(_, s)| s).fold(0.0, f64::max);
            prop_assert!(f64::from(category_score(&weighted)) <= max.floor() + 1e-9);
        }

        #[test]
        fn prop_overall_bounded(cpu in 0u32..=100, mem in 0u32..=100, disk in 0u32..=100) {
            let overall = overall_score(cpu, mem, disk);
            prop_assert!(overall <= 100);
            prop_assert!(overall >= cpu.min(mem).min(disk));
            prop_assert!(overall <= cpu.max(mem).max(disk));
        }
    }
}
