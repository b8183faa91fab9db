//! Buffer and stack pool churn

use crate::error::ProbeError;
use crate::kernel::{per_second, CancelToken, Outcome, TimedLoop, MIB};
use crate::models::{PoolResult, Rating};
use crate::probes::{finish, fixture_rng, Probe, ScratchPool};
use crate::scoring::MetricId;
use rand::RngCore;
use std::hint::black_box;
use std::time::Duration;

/// Smallest memory expansion target
pub const MIN_BUFFER: usize = 1024;

/// Buffers that grew past this are dropped instead of pooled
pub const MAX_POOLED_BUFFER: usize = 16 * 1024;

/// Stack words pushed per unit
pub const STACK_DEPTH: usize = 16;

const INITIAL_BUFFER: usize = 4096;
const STACK_CAPACITY: usize = 1024;

type Word = [u8; 32];

/// Interpreter-style memory and stack reuse through scratch pools
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolProbe;

impl Probe for PoolProbe {
    type Output = PoolResult;

    fn name(&self) -> &'static str {
        "pool"
    }

    fn label(&self) -> &'static str {
        "Object pooling"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<PoolResult, ProbeError> {
        let mut rng = fixture_rng();
        let mut buffers: ScratchPool<Vec<u8>> = ScratchPool::new(4);
        let mut stacks: ScratchPool<Vec<Word>> = ScratchPool::new(4);

        let mut allocations = 0u64;
        let mut reuses = 0u64;
        let mut churn = 0u64;

        let tally = TimedLoop::new(budget).cancel_on(cancel).run(|| {
            let mut memory = buffers.take_or_else(|| Vec::with_capacity(INITIAL_BUFFER));
            let mut stack = stacks.take_or_else(|| Vec::with_capacity(STACK_CAPACITY));

            // Deterministic target between 1 KiB and 16 KiB
            let target = MIN_BUFFER + (churn % (MAX_POOLED_BUFFER - MIN_BUFFER) as u64) as usize;
            if memory.capacity() < target {
                memory = vec![0u8; target];
                allocations += 1;
            } else {
                memory.resize(target, 0);
                reuses += 1;
            }
            churn += target as u64;

            for word in memory.chunks_exact_mut(32) {
                rng.fill_bytes(&mut word[..4]);
            }

            stack.clear();
            stack.extend(std::iter::repeat([0u8; 32]).take(STACK_DEPTH));
            black_box(&stack);

            memory.clear();
            buffers.give_if(memory, |m| m.capacity() <= MAX_POOLED_BUFFER);
            stacks.give(stack);

            Outcome::bytes(target as u64)
        });

        let allocations_per_second = per_second(allocations as f64, tally.elapsed);
        let reuses_per_second = per_second(reuses as f64, tally.elapsed);
        let rating = Rating::classify(
            allocations_per_second + reuses_per_second,
            MetricId::PoolOps.curve(),
        );

        Ok(PoolResult {
            allocations_per_second,
            reuses_per_second,
            memory_churn_mb: churn as f64 / MIB,
            meta: finish(&[tally], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_and_reuses() {
        let result = PoolProbe
            .run(Duration::from_millis(30), &CancelToken::new())
            .unwrap();

        assert!(result.allocations_per_second > 0.0);
        assert!(result.reuses_per_second > 0.0);
        assert!(result.memory_churn_mb > 0.0);
    }

    #[test]
    fn test_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let result = PoolProbe.run(Duration::from_secs(10), &token).unwrap();

        assert_eq!(result.allocations_per_second, 0.0);
        assert_eq!(result.memory_churn_mb, 0.0);
    }
}
