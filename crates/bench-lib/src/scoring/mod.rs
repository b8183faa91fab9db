//! Scoring pipeline
//!
//! Raw probe rates are mapped onto 0-100 by per-metric calibration curves,
//! combined into category scores by the static weight table, rolled up into
//! one overall score and finally classified into a readiness verdict.

mod aggregate;
mod curve;
pub mod table;
mod verdict;

pub use aggregate::{category_score, overall_score, summarize, CategoryScore, MetricScore, Summary};
pub use curve::{score, CalibrationCurve};
pub use table::{Category, MetricId, MetricSpec, METRIC_TABLE};
pub use verdict::{classify, Readiness, Tier, Verdict};
