//! Benchmark report
//!
//! Bundles host information, raw results, scores and the verdict into one
//! serializable document.

use crate::budget::Profile;
use crate::error::BenchError;
use crate::models::{BenchmarkResults, CpuResults, DiskResults, MemoryResults};
use crate::scoring::{classify, summarize, Summary, Verdict};
use crate::system::SystemInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: f64,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub system: SystemInfo,
    pub cpu: CpuResults,
    pub memory: MemoryResults,
    pub disk: DiskResults,
    pub summary: Summary,
    pub verdict: Verdict,
}

impl Report {
    /// Score `results` and assemble the report, timestamped now
    pub fn new(
        version: impl Into<String>,
        system: SystemInfo,
        results: BenchmarkResults,
        duration: Duration,
        profile: Profile,
    ) -> Self {
        let summary = summarize(&results);
        let verdict = classify(summary.total_score, &results);
        let BenchmarkResults { cpu, memory, disk } = results;

        Self {
            metadata: ReportMetadata {
                version: version.into(),
                timestamp: Utc::now(),
                duration_seconds: duration.as_secs_f64(),
                profile,
            },
            system,
            cpu,
            memory,
            disk,
            summary,
            verdict,
        }
    }

    /// Raw results reassembled from the report sections
    pub fn results(&self) -> BenchmarkResults {
        BenchmarkResults {
            cpu: self.cpu.clone(),
            memory: self.memory.clone(),
            disk: self.disk.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, BenchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `nodebench-YYYY-MM-DD_HH-MM-SS.json`, from the report timestamp
    pub fn file_name(&self) -> String {
        format!(
            "nodebench-{}.json",
            self.metadata.timestamp.format("%Y-%m-%d_%H-%M-%S")
        )
    }

    /// Write the report into `dir`, creating it if needed. Returns the path
    /// of the written file.
    pub fn save_json(&self, dir: &Path) -> Result<PathBuf, BenchError> {
        fs::create_dir_all(dir).map_err(|source| BenchError::ReportIo {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(self.file_name());
        let body = self.to_json()?;
        fs::write(&path, body).map_err(|source| BenchError::ReportIo {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), "Report saved");
        Ok(path)
    }
}
