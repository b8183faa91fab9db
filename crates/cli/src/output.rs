//! Output formatting utilities

use bench_lib::report::Report;
use bench_lib::{Rating, Readiness, SystemInfo, Verdict};
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured tables (default)
    #[default]
    Text,
    /// Pretty-printed JSON report on stdout
    Json,
}

/// Log line format on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Tabled)]
struct MeasurementRow {
    #[tabled(rename = "Probe")]
    probe: &'static str,
    #[tabled(rename = "Measurement")]
    measurement: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Rating")]
    rating: String,
}

#[derive(Debug, Clone, Tabled)]
struct ScoreRow {
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Score")]
    score: String,
}

#[derive(Debug, Clone, Tabled)]
struct MetricScoreRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Raw value")]
    raw_value: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Score")]
    score: String,
}

/// Rows of one probe: the first row carries the probe name and rating
fn probe_rows(
    probe: &'static str,
    rating: Rating,
    measurements: Vec<(&'static str, String)>,
) -> Vec<MeasurementRow> {
    measurements
        .into_iter()
        .enumerate()
        .map(|(i, (measurement, value))| MeasurementRow {
            probe: if i == 0 { probe } else { "" },
            measurement,
            value,
            rating: if i == 0 { color_rating(rating) } else { String::new() },
        })
        .collect()
}

fn cpu_rows(report: &Report) -> Vec<MeasurementRow> {
    let cpu = &report.cpu;
    let mut rows = probe_rows(
        "Keccak256",
        cpu.keccak.meta.rating,
        vec![
            ("Throughput", format_rate(cpu.keccak.hashes_per_second, "hashes/s")),
            ("Data processed", format_mb(cpu.keccak.data_processed_mb)),
        ],
    );
    rows.extend(probe_rows(
        "ECDSA secp256k1",
        cpu.ecdsa.meta.rating,
        vec![
            ("Sign", format_rate(cpu.ecdsa.signatures_per_second, "sig/s")),
            ("Verify", format_rate(cpu.ecdsa.verifications_per_second, "verify/s")),
            ("Ecrecover", format_rate(cpu.ecdsa.recoveries_per_second, "recover/s")),
        ],
    ));
    rows.extend(probe_rows(
        "BLS12-381",
        cpu.bls.meta.rating,
        vec![
            ("Sign", format_rate(cpu.bls.signatures_per_second, "sig/s")),
            ("Verify", format_rate(cpu.bls.verifications_per_second, "verify/s")),
            ("Aggregate", format_rate(cpu.bls.aggregations_per_second, "agg/s")),
            (
                "Batch verify",
                format_rate(cpu.bls.batch_verifications_per_second, "batch/s"),
            ),
        ],
    ));
    rows.extend(probe_rows(
        "BN256",
        cpu.bn256.meta.rating,
        vec![
            ("G1 add", format_rate(cpu.bn256.g1_adds_per_second, "ops/s")),
            ("G1 scalar mul", format_rate(cpu.bn256.g1_scalar_muls_per_second, "ops/s")),
            ("Pairing", format_rate(cpu.bn256.pairings_per_second, "ops/s")),
        ],
    ));
    rows
}

fn memory_rows(report: &Report) -> Vec<MeasurementRow> {
    let memory = &report.memory;
    let mut rows = probe_rows(
        "State trie",
        memory.trie.meta.rating,
        vec![
            ("Insert", format_rate(memory.trie.inserts_per_second, "ops/s")),
            ("Lookup", format_rate(memory.trie.lookups_per_second, "ops/s")),
            ("Hash", format_rate(memory.trie.hashes_per_second, "ops/s")),
            ("Peak memory", format_mb(memory.trie.peak_memory_mb)),
        ],
    );
    rows.extend(probe_rows(
        "Scratch pool",
        memory.pool.meta.rating,
        vec![
            ("Allocations", format_rate(memory.pool.allocations_per_second, "alloc/s")),
            ("Reuses", format_rate(memory.pool.reuses_per_second, "reuse/s")),
            ("Memory churn", format_mb(memory.pool.memory_churn_mb)),
        ],
    ));
    rows.extend(probe_rows(
        "State cache",
        memory.state_cache.meta.rating,
        vec![
            ("Hits", format_rate(memory.state_cache.cache_hits_per_second, "ops/s")),
            ("Misses", format_rate(memory.state_cache.cache_misses_per_second, "ops/s")),
            ("Hit ratio", format_percent(memory.state_cache.hit_ratio)),
        ],
    ));
    rows
}

fn disk_rows(report: &Report) -> Vec<MeasurementRow> {
    let disk = &report.disk;
    let mut rows = probe_rows(
        "Sequential",
        disk.sequential.meta.rating,
        vec![
            ("Write", format_rate(disk.sequential.write_speed_mbps, "MB/s")),
            ("Read", format_rate(disk.sequential.read_speed_mbps, "MB/s")),
        ],
    );
    rows.extend(probe_rows(
        "Random 4K",
        disk.random.meta.rating,
        vec![
            ("Read IOPS", format!("{:.0}", disk.random.read_iops)),
            ("Write IOPS", format!("{:.0}", disk.random.write_iops)),
            ("Avg latency", format!("{:.2} us", disk.random.avg_latency_us)),
        ],
    ));
    rows.extend(probe_rows(
        "Batch write",
        disk.batch.meta.rating,
        vec![
            ("Batch rate", format_rate(disk.batch.batches_per_second, "batch/s")),
            ("Throughput", format_rate(disk.batch.throughput_mbps, "MB/s")),
            ("Avg latency", format!("{:.2} ms", disk.batch.avg_batch_latency_ms)),
        ],
    ));
    rows
}

fn score_rows(report: &Report) -> Vec<ScoreRow> {
    let summary = &report.summary;
    vec![
        ScoreRow {
            category: "CPU",
            score: color_score(summary.cpu_score),
        },
        ScoreRow {
            category: "Memory",
            score: color_score(summary.memory_score),
        },
        ScoreRow {
            category: "Disk",
            score: color_score(summary.disk_score),
        },
        ScoreRow {
            category: "Overall",
            score: color_score(summary.total_score),
        },
    ]
}

/// Every scored metric with its raw value, in-category weight and score
fn metric_score_rows(report: &Report) -> Vec<MetricScoreRow> {
    report
        .summary
        .categories
        .iter()
        .flat_map(|category| &category.metrics)
        .map(|metric| {
            let spec = metric.metric.spec();
            MetricScoreRow {
                metric: spec.name,
                raw_value: format_rate(metric.raw_value, spec.unit),
                weight: format!("{}%", spec.weight_percent),
                score: format!("{:.1}", metric.score),
            }
        })
        .collect()
}

fn print_section(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
}

fn print_table<T: Tabled>(rows: &[T]) {
    println!("{}", Table::new(rows).with(Style::rounded()));
}

pub fn print_banner(version: &str) {
    println!("{}", format!("nodebench v{version}").bold());
    println!("Blockchain node hardware readiness benchmark");
    println!();
}

pub fn print_system(system: &SystemInfo) {
    println!("  System:   {} {} ({})", system.os, system.os_version, system.architecture);
    println!("  CPU:      {} ({} cores)", system.cpu_model, system.cpu_cores);
    println!("  RAM:      {} MB", system.ram_total_mb);
    println!("  Storage:  {}", system.disk_model);
    if let Some(board) = &system.board_model {
        println!("  Board:    {board}");
    }
    if let Some(kernel) = &system.kernel_version {
        println!("  Kernel:   {kernel}");
    }
    if let (Some(governor), Some(mhz)) = (&system.cpu_governor, system.cpu_freq_mhz) {
        println!("  Governor: {governor} @ {mhz} MHz");
    }
    println!("  Serial:   {}", system.serial_number);
    println!();
}

/// Print the full text report
pub fn print_report(report: &Report) {
    print_section(&format!(
        "Benchmark report for {} ({})",
        report.system.hostname,
        report.metadata.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));

    print_section("CPU (execution layer critical)");
    print_table(&cpu_rows(report));

    print_section("Memory");
    print_table(&memory_rows(report));

    print_section("Disk I/O");
    print_table(&disk_rows(report));

    print_section("Scored metrics");
    print_table(&metric_score_rows(report));

    print_section("Summary");
    print_table(&score_rows(report));

    print_verdict(&report.verdict);

    println!();
    println!(
        "Benchmark completed in {:.1} seconds",
        report.metadata.duration_seconds
    );
}

fn print_verdict(verdict: &Verdict) {
    print_section("Verdict");
    println!("  Overall score:     {}", color_score(verdict.overall_score));
    println!("  Execution client:  {}", color_readiness(verdict.execution_client));
    println!("  Consensus client:  {}", color_readiness(verdict.consensus_client));

    println!();
    println!("{}", "Recommendations:".bold());
    for advisory in &verdict.advisories {
        println!("  - {advisory}");
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a rate with two decimals and a unit
pub fn format_rate(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}")
}

pub fn format_mb(mb: f64) -> String {
    format!("{mb:.2} MB")
}

/// Format a ratio in [0, 1] as a percentage
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Color a rating label
pub fn color_rating(rating: Rating) -> String {
    let label = rating.as_str();
    match rating {
        Rating::Excellent | Rating::Good => label.green().to_string(),
        Rating::Adequate | Rating::Marginal => label.yellow().to_string(),
        Rating::Poor | Rating::Error => label.red().to_string(),
    }
}

/// Color a readiness label
pub fn color_readiness(readiness: Readiness) -> String {
    let label = readiness.as_str();
    match readiness {
        Readiness::Ready => label.green().bold().to_string(),
        Readiness::Marginal => label.yellow().bold().to_string(),
        Readiness::Unsuitable => label.red().bold().to_string(),
    }
}

/// Color a 0-100 score using the verdict bands
pub fn color_score(score: u32) -> String {
    let formatted = format!("{score}/100");
    if score >= 80 {
        formatted.green().to_string()
    } else if score >= 40 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}
