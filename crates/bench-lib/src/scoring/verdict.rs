//! Readiness verdict
//!
//! Four score bands, each fixing a readiness label for the execution client
//! and the consensus client. Baseline advisories for the band come first,
//! followed by advisories triggered by individual raw measurements.

use crate::models::BenchmarkResults;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random read IOPS below which NVMe storage is advised
pub const RANDOM_READ_IOPS_FLOOR: f64 = 10_000.0;

/// secp256k1 verifications/s below which transaction validation lags
pub const ECDSA_VERIFY_FLOOR: f64 = 500.0;

/// BLS verifications/s below which the consensus layer lags
pub const BLS_VERIFY_FLOOR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    Ready,
    Marginal,
    Unsuitable,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Ready => "Ready",
            Readiness::Marginal => "Marginal",
            Readiness::Unsuitable => "Unsuitable",
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall score band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 80 and above
    FullNode,
    /// 60 to 79
    ConsensusOnly,
    /// 40 to 59
    BelowSpec,
    /// below 40
    Insufficient,
}

impl Tier {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            Tier::FullNode
        } else if score >= 60 {
            Tier::ConsensusOnly
        } else if score >= 40 {
            Tier::BelowSpec
        } else {
            Tier::Insufficient
        }
    }

    /// Execution client readiness
    pub fn execution_client(&self) -> Readiness {
        match self {
            Tier::FullNode => Readiness::Ready,
            Tier::ConsensusOnly | Tier::BelowSpec => Readiness::Marginal,
            Tier::Insufficient => Readiness::Unsuitable,
        }
    }

    /// Consensus client readiness
    pub fn consensus_client(&self) -> Readiness {
        match self {
            Tier::FullNode | Tier::ConsensusOnly => Readiness::Ready,
            Tier::BelowSpec | Tier::Insufficient => Readiness::Marginal,
        }
    }

    pub fn baseline_advisories(&self) -> &'static [&'static str] {
        match self {
            Tier::FullNode => &[
                "Hardware meets the requirements for running a full node.",
                "Both execution and consensus clients should run well on this system.",
            ],
            Tier::ConsensusOnly => &[
                "The consensus client should run well.",
                "The execution client may struggle during periods of high network activity.",
                "Use checkpoint sync to shorten the initial sync.",
            ],
            Tier::BelowSpec => &[
                "Hardware is below the recommended specification.",
                "Initial sync will be slow, possibly taking weeks.",
                "Consider pointing the consensus client at an external execution RPC.",
            ],
            Tier::Insufficient => &[
                "Hardware does not meet the minimum requirements for an execution client.",
                "Upgrading to NVMe storage is recommended.",
                "A more powerful single-board computer is recommended.",
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::FullNode => "full_node",
            Tier::ConsensusOnly => "consensus_only",
            Tier::BelowSpec => "below_spec",
            Tier::Insufficient => "insufficient",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub overall_score: u32,
    pub tier: Tier,
    pub execution_client: Readiness,
    pub consensus_client: Readiness,
    /// Baseline advisories first, then conditional ones in fixed order
    pub advisories: Vec<String>,
}

impl Verdict {
    pub fn is_ready(&self) -> bool {
        self.execution_client == Readiness::Ready && self.consensus_client == Readiness::Ready
    }
}

/// Advisories triggered by weak raw measurements, independent of the tier
fn conditional_advisories(results: &BenchmarkResults) -> Vec<&'static str> {
    let checks: [(bool, &'static str); 3] = [
        (
            results.disk.random.read_iops < RANDOM_READ_IOPS_FLOOR,
            "Random I/O performance is low; an NVMe SSD is strongly recommended.",
        ),
        (
            results.cpu.ecdsa.verifications_per_second < ECDSA_VERIFY_FLOOR,
            "ECDSA verification is slow and may delay transaction validation.",
        ),
        (
            results.cpu.bls.verifications_per_second < BLS_VERIFY_FLOOR,
            "BLS signature verification is slow; the consensus layer may lag.",
        ),
    ];

    checks
        .into_iter()
        .filter_map(|(triggered, advisory)| triggered.then_some(advisory))
        .collect()
}

/// Classify an overall score into a verdict, inspecting `results` for
/// conditional advisories
pub fn classify(overall_score: u32, results: &BenchmarkResults) -> Verdict {
    let tier = Tier::from_score(overall_score);

    let advisories = tier
        .baseline_advisories()
        .iter()
        .copied()
        .chain(conditional_advisories(results))
        .map(String::from)
        .collect();

    Verdict {
        overall_score,
        tier,
        execution_client: tier.execution_client(),
        consensus_client: tier.consensus_client(),
        advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_results() -> BenchmarkResults {
        let mut r = BenchmarkResults::default();
        r.disk.random.read_iops = 60_000.0;
        r.cpu.ecdsa.verifications_per_second = 2_500.0;
        r.cpu.bls.verifications_per_second = 600.0;
        r
    }

    #[test]
    fn test_tier_boundaries() {
        let strong = strong_results();

        let v = classify(80, &strong);
        assert_eq!(v.execution_client, Readiness::Ready);
        assert_eq!(v.consensus_client, Readiness::Ready);

        let v = classify(79, &strong);
        assert_eq!(v.execution_client, Readiness::Marginal);
        assert_eq!(v.consensus_client, Readiness::Ready);

        let v = classify(40, &strong);
        assert_eq!(v.execution_client, Readiness::Marginal);
        assert_eq!(v.consensus_client, Readiness::Marginal);

        let v = classify(39, &strong);
        assert_eq!(v.execution_client, Readiness::Unsuitable);
        assert_eq!(v.consensus_client, Readiness::Marginal);
    }

    #[test]
    fn test_tier_from_score() {
        assert_eq!(Tier::from_score(100), Tier::FullNode);
        assert_eq!(Tier::from_score(60), Tier::ConsensusOnly);
        assert_eq!(Tier::from_score(59), Tier::BelowSpec);
        assert_eq!(Tier::from_score(0), Tier::Insufficient);
    }

    #[test]
    fn test_top_tier_without_conditionals() {
        let v = classify(100, &strong_results());

        assert!(v.is_ready());
        assert_eq!(v.tier, Tier::FullNode);
        assert_eq!(v.advisories.len(), Tier::FullNode.baseline_advisories().len());
    }

    #[test]
    fn test_conditionals_follow_baseline_in_order() {
        let v = classify(85, &BenchmarkResults::default());

        let baseline = Tier::FullNode.baseline_advisories();
        assert_eq!(v.advisories.len(), baseline.len() + 3);
        assert_eq!(&v.advisories[..baseline.len()], baseline);
        assert!(v.advisories[baseline.len()].contains("NVMe"));
        assert!(v.advisories[baseline.len() + 1].contains("ECDSA"));
        assert!(v.advisories[baseline.len() + 2].contains("BLS"));
    }

    #[test]
    fn test_conditionals_trigger_independently() {
        let mut results = strong_results();
        results.cpu.bls.verifications_per_second = 99.9;

        let v = classify(10, &results);
        let baseline = Tier::Insufficient.baseline_advisories();
        assert_eq!(v.advisories.len(), baseline.len() + 1);
        assert!(v.advisories.last().unwrap().contains("BLS"));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut results = strong_results();
        results.disk.random.read_iops = RANDOM_READ_IOPS_FLOOR;
        results.cpu.ecdsa.verifications_per_second = ECDSA_VERIFY_FLOOR;
        results.cpu.bls.verifications_per_second = BLS_VERIFY_FLOOR;

        assert!(conditional_advisories(&results).is_empty());
    }

    #[test]
    fn test_no_dedup_with_baseline() {
        // The lowest tier already suggests NVMe; the conditional still fires
        let v = classify(0, &BenchmarkResults::default());
        let nvme = v.advisories.iter().filter(|a| a.contains("NVMe")).count();
        assert_eq!(nvme, 2);
    }

    #[test]
    fn test_verdict_json() {
        let json = serde_json::to_value(classify(65, &strong_results())).unwrap();
        assert_eq!(json["tier"], "consensus_only");
        assert_eq!(json["execution_client"], "Marginal");
        assert_eq!(json["consensus_client"], "Ready");
        assert_eq!(json["overall_score"], 65);
    }
}
