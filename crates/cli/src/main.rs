//! nodebench CLI
//!
//! Measures whether a host can run a blockchain execution and consensus
//! client: runs the probe suite, scores it and prints a readiness verdict.

mod config;
mod output;

use anyhow::{Context, Result};
use bench_lib::system::check_prerequisites;
use bench_lib::{BenchmarkRunnerBuilder, CancelToken, Profile, Report, SystemInfo};
use clap::Parser;
use crate::config::{Overrides, Settings};
use output::{LogFormat, OutputFormat};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Blockchain node hardware readiness benchmark
#[derive(Parser)]
#[command(name = "nodebench")]
#[command(author, version, about = "Blockchain node hardware readiness benchmark", long_about = None)]
pub struct Cli {
    /// Directory for disk I/O tests (default: executable directory)
    #[arg(long)]
    pub test_dir: Option<PathBuf>,

    /// Directory for the JSON report (default: executable directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Quick mode: about one minute instead of three
    #[arg(long, short)]
    pub quick: bool,

    /// Show debug-level progress
    #[arg(long, short)]
    pub verbose: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Report format on stdout
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log format on stderr
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Do not save the JSON report
    #[arg(long)]
    pub no_save: bool,

    /// Write Prometheus metrics to this textfile after the run
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            quick: self.quick,
            test_dir: self.test_dir.clone(),
            output_dir: self.output.clone(),
            no_save: self.no_save,
            metrics_file: self.metrics_file.clone(),
        }
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(&cli.overrides());
    let default_dir = crate::config::executable_dir();
    let bench_config = settings.bench_config(&default_dir);
    let output_dir = settings.output_dir(&default_dir);
    let text = cli.format == OutputFormat::Text;

    if text {
        output::print_banner(VERSION);
        output::print_info("Detecting system information...");
    }
    let system = SystemInfo::detect();
    if text {
        output::print_system(&system);
        output::print_info(&format!(
            "Testing write access to {}...",
            bench_config.test_dir.display()
        ));
    }

    check_prerequisites(&bench_config.test_dir)
        .with_context(|| format!("Cannot run disk probes in {}", bench_config.test_dir.display()))?;

    if text {
        output::print_success("Test directory is writable");
        let mode = match bench_config.profile {
            Profile::Quick => "Quick mode",
            Profile::Default => "Full benchmark",
        };
        output::print_info(&format!(
            "{mode}: approximately {} seconds",
            bench_config.planned_duration().as_secs()
        ));
        println!();
    }

    let cancel = CancelToken::new();
    let runner = BenchmarkRunnerBuilder::new()
        .config(bench_config.clone())
        .cancel_token(cancel.clone())
        .host(system.hostname.clone())
        .build();

    // Ctrl-C stops the probes at their next iteration boundary
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping benchmark");
            signal_token.cancel();
        }
    });

    let started = Instant::now();
    let (runner, results) = tokio::task::spawn_blocking(move || {
        let results = runner.run();
        (runner, results)
    })
    .await
    .context("Benchmark worker panicked")?;
    let results = results.context("Benchmark did not complete")?;

    let report = Report::new(VERSION, system, results, started.elapsed(), bench_config.profile);
    runner.record_outcome(&report.summary, &report.verdict);

    match cli.format {
        OutputFormat::Text => output::print_report(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if settings.save_json {
        match report.save_json(&output_dir) {
            Ok(path) if text => {
                println!();
                output::print_success(&format!("JSON report saved to {}", path.display()));
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Could not save JSON report");
                if text {
                    output::print_warning(&format!("Could not save JSON report: {e}"));
                }
            }
        }
    }

    if let Some(path) = &settings.metrics_file {
        match runner.metrics().write_textfile(path) {
            Ok(()) => info!(path = %path.display(), "Metrics textfile written"),
            Err(e) => {
                warn!(error = %e, "Could not write metrics textfile");
                if text {
                    output::print_warning(&format!("Could not write metrics textfile: {e}"));
                }
            }
        }
    }

    Ok(())
}
