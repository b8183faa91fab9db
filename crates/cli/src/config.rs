//! Configuration management for the CLI
//!
//! Sources, lowest to highest precedence: built-in defaults,
//! `~/.config/nodebench/config.toml`, an explicit `--config` file,
//! `NODEBENCH_*` environment variables, then command-line flags.

use anyhow::{Context, Result};
use bench_lib::{BenchConfig, Profile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "NODEBENCH";

/// Resolved CLI settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Run length profile (`default` or `quick`)
    #[serde(default)]
    pub profile: Profile,

    /// Per-domain overrides of the profile duration, in seconds
    #[serde(default)]
    pub cpu_secs: Option<u64>,
    #[serde(default)]
    pub memory_secs: Option<u64>,
    #[serde(default)]
    pub disk_secs: Option<u64>,

    /// Directory for disk I/O tests (default: executable directory)
    #[serde(default)]
    pub test_dir: Option<PathBuf>,

    /// Directory for the JSON report (default: executable directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Size of the random I/O test file
    #[serde(default = "default_random_file_size_mb")]
    pub random_file_size_mb: u64,

    #[serde(default = "default_save_json")]
    pub save_json: bool,

    /// Prometheus textfile to write after the run
    #[serde(default)]
    pub metrics_file: Option<PathBuf>,
}

fn default_random_file_size_mb() -> u64 {
    256
}

fn default_save_json() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: Profile::Default,
            cpu_secs: None,
            memory_secs: None,
            disk_secs: None,
            test_dir: None,
            output_dir: None,
            random_file_size_mb: default_random_file_size_mb(),
            save_json: default_save_json(),
            metrics_file: None,
        }
    }
}

/// Values given on the command line; `None`/`false` leave settings untouched
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub quick: bool,
    pub test_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub no_save: bool,
    pub metrics_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the user config file, `explicit` and the environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(user_config_path().as_deref(), explicit)
    }

    fn load_from(user_file: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = user_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let config = builder.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Apply command-line flags on top of the loaded settings
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if overrides.quick {
            self.profile = Profile::Quick;
        }
        if let Some(dir) = &overrides.test_dir {
            self.test_dir = Some(dir.clone());
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = Some(dir.clone());
        }
        if overrides.no_save {
            self.save_json = false;
        }
        if let Some(path) = &overrides.metrics_file {
            self.metrics_file = Some(path.clone());
        }
        self
    }

    /// Benchmark configuration, with unset directories resolved to `default_dir`
    pub fn bench_config(&self, default_dir: &Path) -> BenchConfig {
        let mut config = BenchConfig::for_profile(self.profile).with_test_dir(
            self.test_dir
                .clone()
                .unwrap_or_else(|| default_dir.to_path_buf()),
        );

        if let Some(secs) = self.cpu_secs {
            config.cpu_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = self.memory_secs {
            config.memory_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = self.disk_secs {
            config.disk_duration = Duration::from_secs(secs);
        }
        config.random_file_size = self.random_file_size_mb.saturating_mul(1024 * 1024);
        config
    }

    pub fn output_dir(&self, default_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| default_dir.to_path_buf())
    }
}

/// `~/.config/nodebench/config.toml`
fn user_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("nodebench").join("config.toml"))
}

/// Directory holding the running executable, or `.` if it cannot be found
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
