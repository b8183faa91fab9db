//! End-to-end scoring: raw results through summary, verdict and report

use bench_lib::budget::{BenchConfig, CpuBudget, Profile};
use bench_lib::scoring::{Category, MetricId, METRIC_TABLE};
use bench_lib::{classify, summarize, BenchmarkResults, Readiness, Report, SystemInfo, Tier};
use std::time::Duration;

fn top_tier_results() -> BenchmarkResults {
    let mut r = BenchmarkResults::default();
    r.cpu.keccak.hashes_per_second = 1_000_000.0;
    r.cpu.ecdsa.verifications_per_second = 4_000.0;
    r.cpu.bls.verifications_per_second = 1_000.0;
    r.cpu.bn256.pairings_per_second = 200.0;
    r.memory.trie.inserts_per_second = 100_000.0;
    r.memory.pool.allocations_per_second = 400_000.0;
    r.memory.pool.reuses_per_second = 400_000.0;
    r.memory.state_cache.cache_hits_per_second = 1_000_000.0;
    r.disk.sequential.write_speed_mbps = 800.0;
    r.disk.sequential.read_speed_mbps = 1_200.0;
    r.disk.random.read_iops = 100_000.0;
    r.disk.random.write_iops = 60_000.0;
    r.disk.batch.throughput_mbps = 300.0;
    r
}

#[test]
fn top_tier_host_is_ready_without_conditional_advisories() {
    let results = top_tier_results();
    let summary = summarize(&results);
    let verdict = classify(summary.total_score, &results);

    assert_eq!(summary.total_score, 100);
    assert_eq!(verdict.tier, Tier::FullNode);
    assert_eq!(verdict.execution_client, Readiness::Ready);
    assert_eq!(verdict.consensus_client, Readiness::Ready);
    assert_eq!(
        verdict.advisories.len(),
        Tier::FullNode.baseline_advisories().len()
    );
}

#[test]
fn failed_probe_costs_exactly_its_weight() {
    let mut results = top_tier_results();
    // A disk probe that never completed an iteration
    results.disk.batch = Default::default();

    let summary = summarize(&results);
    let batch_weight = MetricId::Batch.spec().weight_percent;

    assert_eq!(summary.disk_score, 100 - batch_weight);
    assert_eq!(summary.cpu_score, 100);
    assert_eq!(summary.memory_score, 100);
    // 0.40 * 100 + 0.25 * 100 + 0.35 * 75 = 91.25
    assert_eq!(summary.total_score, 91);
}

#[test]
fn degenerate_run_scores_zero_and_collects_every_advisory() {
    let results = BenchmarkResults::default();
    let summary = summarize(&results);
    let verdict = classify(summary.total_score, &results);

    assert_eq!(summary.total_score, 0);
    assert_eq!(verdict.tier, Tier::Insufficient);
    assert_eq!(verdict.execution_client, Readiness::Unsuitable);
    assert_eq!(
        verdict.advisories.len(),
        Tier::Insufficient.baseline_advisories().len() + 3
    );
}

#[test]
fn summary_exposes_every_table_row() {
    let summary = summarize(&top_tier_results());

    let scored: usize = summary.categories.iter().map(|c| c.metrics.len()).sum();
    assert_eq!(scored, METRIC_TABLE.len());
    for category in Category::ALL {
        assert!(summary.category(category).is_some());
    }
}

#[test]
fn report_round_trips_through_json() {
    let root = tempfile::tempdir().unwrap();
    let report = Report::new(
        "0.1.0",
        SystemInfo::detect_from(root.path()),
        top_tier_results(),
        Duration::from_secs(180),
        Profile::Default,
    );

    let json = report.to_json().unwrap();
    let parsed: Report = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.verdict, report.verdict);
    assert_eq!(parsed.summary.total_score, 100);
    assert_eq!(parsed.metadata.profile, Profile::Default);
}

#[test]
fn profiles_share_budget_ratios() {
    let full = BenchConfig::for_profile(Profile::Default);
    let quick = BenchConfig::quick();

    assert_eq!(full.cpu_budget(), CpuBudget::split(Duration::from_secs(60)));
    assert_eq!(full.planned_duration(), Duration::from_secs(180));
    assert_eq!(quick.planned_duration(), Duration::from_secs(60));
    assert_eq!(quick.cpu_budget().keccak, Duration::from_secs(5));
}
