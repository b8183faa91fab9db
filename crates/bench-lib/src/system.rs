//! Host introspection and run prerequisites
//!
//! Everything is read from procfs, sysfs and `/etc`. A missing or
//! unreadable source leaves the field as `"unknown"` (or `None`); detection
//! never fails.

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const UNKNOWN: &str = "unknown";

/// Name of the file written to prove the test directory is writable
const WRITE_PROBE_FILE: &str = ".nodebench_write_test";

/// Hardware and OS description of the benchmarked host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub serial_number: String,
    pub os: String,
    pub os_version: String,
    pub architecture: String,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub ram_total_mb: u64,
    pub disk_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_governor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_freq_mhz: Option<u32>,
}

impl SystemInfo {
    /// Inspect the running host
    pub fn detect() -> Self {
        Self::detect_from(Path::new("/"))
    }

    /// Inspect a host whose filesystem is rooted at `root`
    pub fn detect_from(root: &Path) -> Self {
        let probe = HostFs::new(root);
        let cpuinfo = probe.read("proc/cpuinfo").unwrap_or_default();
        let (os, os_version) = probe.os_release();

        let info = Self {
            hostname: probe.hostname(),
            serial_number: probe.serial_number(&cpuinfo),
            os,
            os_version,
            architecture: std::env::consts::ARCH.to_string(),
            cpu_model: cpu_model(&cpuinfo),
            cpu_cores: cpu_cores(&cpuinfo),
            ram_total_mb: probe
                .read("proc/meminfo")
                .and_then(|m| mem_total_mb(&m))
                .unwrap_or(0),
            disk_model: probe.disk_model(),
            board_model: probe.read_trimmed("proc/device-tree/model"),
            kernel_version: probe.read("proc/version").and_then(|v| kernel_version(&v)),
            cpu_governor: probe.read_trimmed("sys/devices/system/cpu/cpu0/cpufreq/scaling_governor"),
            cpu_freq_mhz: probe
                .read_trimmed("sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq")
                .and_then(|khz| khz.parse::<u32>().ok())
                .map(|khz| khz / 1000),
        };

        debug!(
            hostname = %info.hostname,
            cpu_model = %info.cpu_model,
            cpu_cores = info.cpu_cores,
            ram_total_mb = info.ram_total_mb,
            disk_model = %info.disk_model,
            "Detected host"
        );
        info
    }
}

/// Read-only view of a host filesystem
struct HostFs {
    root: PathBuf,
}

impl HostFs {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn read(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.root.join(relative)).ok()
    }

    /// Device tree strings are NUL terminated
    fn read_trimmed(&self, relative: &str) -> Option<String> {
        let raw = fs::read(self.root.join(relative)).ok()?;
        let text = String::from_utf8_lossy(&raw).replace('\0', "");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn hostname(&self) -> String {
        self.read_trimmed("proc/sys/kernel/hostname")
            .or_else(|| self.read_trimmed("etc/hostname"))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn os_release(&self) -> (String, String) {
        let mut name = None;
        let mut version = String::new();

        if let Some(content) = self.read("etc/os-release") {
            for line in content.lines() {
                if let Some(value) = line.strip_prefix("NAME=") {
                    name = Some(value.trim_matches('"').to_string());
                } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
                    version = value.trim_matches('"').to_string();
                }
            }
        }

        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        (name, version)
    }

    fn serial_number(&self, cpuinfo: &str) -> String {
        ["sys/firmware/devicetree/base/serial-number", "proc/device-tree/serial-number"]
            .iter()
            .find_map(|path| self.read_trimmed(path))
            .or_else(|| cpuinfo_field(cpuinfo, &["Serial"]))
            .or_else(|| self.read_trimmed("etc/machine-id"))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Block devices under `/sys/block` whose name starts with `prefix`
    fn block_devices(&self, prefix: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(self.root.join("sys/block")) else {
            return Vec::new();
        };
        let mut devices: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
            .map(|e| e.path())
            .collect();
        devices.sort();
        devices
    }

    fn first_device_file(&self, prefix: &str, file: &str) -> Option<String> {
        self.block_devices(prefix).iter().find_map(|dev| {
            let text = fs::read_to_string(dev.join("device").join(file)).ok()?;
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
    }

    /// NVMe first, then SD/MMC cards, then SATA/SCSI disks
    fn disk_model(&self) -> String {
        self.first_device_file("nvme", "model")
            .or_else(|| {
                self.first_device_file("mmcblk", "name")
                    .map(|name| format!("SD Card: {name}"))
            })
            .or_else(|| self.first_device_file("sd", "model"))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

fn cpuinfo_field(cpuinfo: &str, keys: &[&str]) -> Option<String> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (keys.contains(&key.trim()) && !value.is_empty()).then(|| value.to_string())
    })
}

fn cpu_model(cpuinfo: &str) -> String {
    cpuinfo_field(cpuinfo, &["model name", "Model", "Hardware"]).unwrap_or_else(|| {
        if std::env::consts::ARCH == "aarch64" {
            "ARM64 Processor".to_string()
        } else {
            UNKNOWN.to_string()
        }
    })
}

fn cpu_cores(cpuinfo: &str) -> usize {
    let listed = cpuinfo
        .lines()
        .filter(|line| line.split(':').next().map(str::trim) == Some("processor"))
        .count();
    if listed > 0 {
        return listed;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn mem_total_mb(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024)
}

/// `Linux version 6.1.0-rpi7-rpi-v8 (...)` yields `6.1.0-rpi7-rpi-v8`
fn kernel_version(proc_version: &str) -> Option<String> {
    let mut fields = proc_version.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(_), Some(_), Some(version)) => Some(version.to_string()),
        _ => {
            let trimmed = proc_version.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Create `test_dir` if needed and prove it accepts writes
pub fn check_prerequisites(test_dir: &Path) -> Result<(), BenchError> {
    let prerequisite = |source| BenchError::Prerequisite {
        path: test_dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(test_dir).map_err(prerequisite)?;

    let probe_file = test_dir.join(WRITE_PROBE_FILE);
    fs::write(&probe_file, b"nodebench").map_err(prerequisite)?;
    fs::remove_file(&probe_file).map_err(prerequisite)?;

    debug!(test_dir = %test_dir.display(), "Test directory is writable");
    Ok(())
}
