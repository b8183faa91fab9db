//! Time budget allocation
//!
//! Each domain (CPU, memory, disk) receives a total duration which is split
//! across its probes by fixed integer ratios. Every share is computed
//! independently with truncating division, so the parts may fall a few
//! nanoseconds short of the total. That residual is not redistributed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Per-domain duration of a full run
pub const DEFAULT_DOMAIN_DURATION: Duration = Duration::from_secs(60);

/// Per-domain duration of a quick run
pub const QUICK_DOMAIN_DURATION: Duration = Duration::from_secs(20);

/// Default size of the random I/O scratch file
pub const DEFAULT_RANDOM_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Proportional share expressed as `num / den`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub num: u32,
    pub den: u32,
}

impl Share {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// `total * num / den`, truncated to whole nanoseconds
    pub fn of(&self, total: Duration) -> Duration {
        if self.den == 0 {
            return Duration::ZERO;
        }
        match total.checked_mul(self.num) {
            Some(scaled) => scaled / self.den,
            None => (total / self.den).saturating_mul(self.num),
        }
    }
}

/// Split `total` by `shares`, one independent truncating division per entry
pub fn allocate<const N: usize>(total: Duration, shares: &[Share; N]) -> [Duration; N] {
    shares.map(|share| share.of(total))
}

pub const CPU_SHARES: [Share; 4] = [
    Share::new(15, 60), // keccak256
    Share::new(20, 60), // ecdsa
    Share::new(15, 60), // bls
    Share::new(10, 60), // bn256
];

pub const MEMORY_SHARES: [Share; 3] = [
    Share::new(25, 60), // trie
    Share::new(15, 60), // pool
    Share::new(20, 60), // state cache
];

pub const DISK_SHARES: [Share; 3] = [
    Share::new(20, 60), // sequential
    Share::new(25, 60), // random
    Share::new(15, 60), // batch
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuBudget {
    pub keccak: Duration,
    pub ecdsa: Duration,
    pub bls: Duration,
    pub bn256: Duration,
}

impl CpuBudget {
    pub fn split(total: Duration) -> Self {
        let [keccak, ecdsa, bls, bn256] = allocate(total, &CPU_SHARES);
        Self {
            keccak,
            ecdsa,
            bls,
            bn256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    pub trie: Duration,
    pub pool: Duration,
    pub state_cache: Duration,
}

impl MemoryBudget {
    pub fn split(total: Duration) -> Self {
        let [trie, pool, state_cache] = allocate(total, &MEMORY_SHARES);
        Self {
            trie,
            pool,
            state_cache,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskBudget {
    pub sequential: Duration,
    pub random: Duration,
    pub batch: Duration,
}

impl DiskBudget {
    pub fn split(total: Duration) -> Self {
        let [sequential, random, batch] = allocate(total, &DISK_SHARES);
        Self {
            sequential,
            random,
            batch,
        }
    }
}

/// Canonical run length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Default,
    Quick,
}

impl Profile {
    pub fn domain_duration(&self) -> Duration {
        match self {
            Profile::Default => DEFAULT_DOMAIN_DURATION,
            Profile::Quick => QUICK_DOMAIN_DURATION,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Default => "default",
            Profile::Quick => "quick",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "full" => Ok(Profile::Default),
            "quick" => Ok(Profile::Quick),
            other => Err(format!("unknown profile '{other}' (expected default or quick)")),
        }
    }
}

/// Benchmark run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub profile: Profile,
    pub cpu_duration: Duration,
    pub memory_duration: Duration,
    pub disk_duration: Duration,
    /// Directory receiving the disk probes' scratch files
    pub test_dir: PathBuf,
    pub random_file_size: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Default)
    }
}

impl BenchConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let total = profile.domain_duration();
        Self {
            profile,
            cpu_duration: total,
            memory_duration: total,
            disk_duration: total,
            test_dir: PathBuf::from("."),
            random_file_size: DEFAULT_RANDOM_FILE_SIZE,
        }
    }

    pub fn quick() -> Self {
        Self::for_profile(Profile::Quick)
    }

    pub fn with_test_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_dir = dir.into();
        self
    }

    pub fn cpu_budget(&self) -> CpuBudget {
        CpuBudget::split(self.cpu_duration)
    }

    pub fn memory_budget(&self) -> MemoryBudget {
        MemoryBudget::split(self.memory_duration)
    }

    pub fn disk_budget(&self) -> DiskBudget {
        DiskBudget::split(self.disk_duration)
    }

    /// Planned wall time of a run, ignoring per-unit overrun
    pub fn planned_duration(&self) -> Duration {
        self.cpu_duration
            .saturating_add(self.memory_duration)
            .saturating_add(self.disk_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cpu_split_is_exact() {
        let budget = CpuBudget::split(Duration::from_secs(60));
        assert_eq!(budget.keccak, Duration::from_secs(15));
        assert_eq!(budget.ecdsa, Duration::from_secs(20));
        assert_eq!(budget.bls, Duration::from_secs(15));
        assert_eq!(budget.bn256, Duration::from_secs(10));
    }

    #[test]
    fn test_quick_cpu_split_truncates() {
        let budget = CpuBudget::split(Duration::from_secs(20));
        assert_eq!(budget.keccak, Duration::from_secs(5));
        assert_eq!(budget.ecdsa, Duration::from_nanos(6_666_666_666));
        assert_eq!(budget.bls, Duration::from_secs(5));
        assert_eq!(budget.bn256, Duration::from_nanos(3_333_333_333));

        // One nanosecond of slack is left unallocated.
        let sum = budget.keccak + budget.ecdsa + budget.bls + budget.bn256;
        assert_eq!(Duration::from_secs(20) - sum, Duration::from_nanos(1));
    }

    #[test]
    fn test_ratios_identical_across_profiles() {
        let full = MemoryBudget::split(Profile::Default.domain_duration());
        let quick = MemoryBudget::split(Profile::Quick.domain_duration());
        let ratio = |a: Duration, b: Duration| a.as_secs_f64() / b.as_secs_f64();

        assert!((ratio(full.trie, full.pool) - ratio(quick.trie, quick.pool)).abs() < 1e-8);
        assert!(
            (ratio(full.state_cache, full.pool) - ratio(quick.state_cache, quick.pool)).abs()
                < 1e-8
        );
        assert_eq!(full.pool, quick.pool * 3);
    }

    #[test]
    fn test_disk_split() {
        let budget = DiskBudget::split(Duration::from_secs(60));
        assert_eq!(budget.sequential, Duration::from_secs(20));
        assert_eq!(budget.random, Duration::from_secs(25));
        assert_eq!(budget.batch, Duration::from_secs(15));
    }

    #[test]
    fn test_phase_split() {
        let [a, b, c] = allocate(
            Duration::from_secs(10),
            &[Share::new(3, 10), Share::new(3, 10), Share::new(4, 10)],
        );
        assert_eq!(a, Duration::from_secs(3));
        assert_eq!(b, Duration::from_secs(3));
        assert_eq!(c, Duration::from_secs(4));
    }

    #[test]
    fn test_share_degenerate() {
        assert_eq!(Share::new(1, 0).of(Duration::from_secs(5)), Duration::ZERO);
        assert_eq!(Share::new(1, 4).of(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_share_overflow_falls_back() {
        let total = Duration::MAX;
        let part = Share::new(20, 60).of(total);
        assert!(part > Duration::ZERO);
    }

    #[test]
    fn test_planned_duration_saturates() {
        let mut config = BenchConfig::quick();
        config.cpu_duration = Duration::from_secs(u64::MAX);
        assert_eq!(config.planned_duration(), Duration::MAX);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("quick".parse::<Profile>().unwrap(), Profile::Quick);
        assert_eq!("DEFAULT".parse::<Profile>().unwrap(), Profile::Default);
        assert!("slow".parse::<Profile>().is_err());
    }

    #[test]
    fn test_config_profiles() {
        let quick = BenchConfig::quick();
        assert_eq!(quick.cpu_duration, Duration::from_secs(20));
        assert_eq!(quick.planned_duration(), Duration::from_secs(60));

        let full = BenchConfig::default();
        assert_eq!(full.planned_duration(), Duration::from_secs(180));
        assert_eq!(full.random_file_size, DEFAULT_RANDOM_FILE_SIZE);
    }
}
