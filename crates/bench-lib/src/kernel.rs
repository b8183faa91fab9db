//! Probe execution kernel
//!
//! Runs a unit of work back to back until a wall-clock budget is spent,
//! counting completed operations, failures and bytes. The deadline and the
//! cancellation flag are only checked between units, so a loop may overrun
//! its budget by the latency of one unit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Bytes per mebibyte, used for every MB figure in results
pub const MIB: f64 = 1024.0 * 1024.0;

/// Cooperative cancellation flag shared between the caller and running probes
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that running loops stop at their next iteration boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of one unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The unit finished `ops` countable operations touching `bytes` bytes
    Completed { ops: u64, bytes: u64 },
    /// The unit failed; it is counted but excluded from rates
    Failed,
}

impl Outcome {
    /// A single completed operation
    pub const fn op() -> Self {
        Outcome::Completed { ops: 1, bytes: 0 }
    }

    pub const fn ops(ops: u64) -> Self {
        Outcome::Completed { ops, bytes: 0 }
    }

    /// A single completed operation that moved `bytes` bytes
    pub const fn bytes(bytes: u64) -> Self {
        Outcome::Completed { ops: 1, bytes }
    }

    pub fn from_result<T, E>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Outcome::op(),
            Err(_) => Outcome::Failed,
        }
    }
}

/// Counters accumulated by one timed loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub successes: u64,
    pub failures: u64,
    pub bytes: u64,
    /// Actual wall time of the loop, including any overrun
    pub elapsed: Duration,
    /// Time spent inside successful units (only when latency is tracked)
    pub busy: Duration,
    pub cancelled: bool,
}

impl Tally {
    /// Successful operations per elapsed second; 0 when nothing ran
    pub fn rate(&self) -> f64 {
        per_second(self.successes as f64, self.elapsed)
    }

    pub fn byte_rate(&self) -> f64 {
        per_second(self.bytes as f64, self.elapsed)
    }

    pub fn mb_per_second(&self) -> f64 {
        self.byte_rate() / MIB
    }

    /// Mean latency of a successful unit, zero when none completed
    pub fn mean_latency(&self) -> Duration {
        match u32::try_from(self.successes) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.busy / n,
            Err(_) => Duration::from_secs_f64(self.busy.as_secs_f64() / self.successes as f64),
        }
    }

    pub fn iterations(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }

    /// True when the loop ran but every unit failed
    pub fn all_failed(&self) -> bool {
        self.successes == 0 && self.failures > 0
    }
}

/// `count / elapsed` in per-second units, guarded against empty loops
pub fn per_second(count: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if count <= 0.0 || secs <= 0.0 {
        return 0.0;
    }
    count / secs
}

/// Sum of elapsed time over several phases
pub fn total_elapsed(tallies: &[Tally]) -> Duration {
    tallies.iter().map(|t| t.elapsed).sum()
}

/// Builder for one deadline-bounded measurement loop
pub struct TimedLoop<'a> {
    budget: Duration,
    cancel: Option<&'a CancelToken>,
    track_latency: bool,
}

impl<'a> TimedLoop<'a> {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            cancel: None,
            track_latency: false,
        }
    }

    /// Stop early once `token` is cancelled
    pub fn cancel_on(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Measure each unit individually (adds two clock reads per unit)
    pub fn track_latency(mut self) -> Self {
        self.track_latency = true;
        self
    }

    /// Run `unit` until the budget is spent or the loop is cancelled
    pub fn run<F>(self, mut unit: F) -> Tally
    where
        F: FnMut() -> Outcome,
    {
        let mut tally = Tally::default();
        let start = Instant::now();

        while start.elapsed() < self.budget {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                tally.cancelled = true;
                break;
            }

            let op_start = self.track_latency.then(Instant::now);
            match unit() {
                Outcome::Completed { ops, bytes } => {
                    tally.successes = tally.successes.saturating_add(ops);
                    tally.bytes = tally.bytes.saturating_add(bytes);
                    if let Some(op_start) = op_start {
                        tally.busy += op_start.elapsed();
                    }
                }
                Outcome::Failed => {
                    tally.failures = tally.failures.saturating_add(1);
                }
            }
        }

        tally.elapsed = start.elapsed();
        tally
    }
}
