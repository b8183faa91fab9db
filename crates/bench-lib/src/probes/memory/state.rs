//! Layered account and storage slot cache lookups

use crate::error::ProbeError;
use crate::kernel::{per_second, CancelToken, Outcome, TimedLoop, MIB};
use crate::models::{Rating, StateCacheResult};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use rand::RngCore;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ACCOUNTS: usize = 10_000;
pub const DEFAULT_SLOTS: usize = 50;

/// One in five accesses goes to an address outside the cache
const MISS_EVERY: u64 = 5;

const SLOT_BYTES: u64 = 32;
const ACCOUNT_BYTES: usize = 100;

type Address = [u8; 20];
type Slot = [u8; 32];

/// Cached account with layered storage: dirty writes, pending commits,
/// then values loaded from the database
#[derive(Debug, Default)]
struct CachedAccount {
    data: Vec<u8>,
    origin: HashMap<Slot, Slot>,
    pending: HashMap<Slot, Slot>,
    dirty: HashMap<Slot, Slot>,
    slot_keys: Vec<Slot>,
}

impl CachedAccount {
    /// Layered storage read; origin hits are promoted into the dirty layer
    fn read(&mut self, key: &Slot) -> Option<Slot> {
        if let Some(value) = self.dirty.get(key) {
            return Some(*value);
        }
        if let Some(value) = self.pending.get(key) {
            return Some(*value);
        }
        let value = *self.origin.get(key)?;
        self.dirty.insert(*key, value);
        Some(value)
    }
}

/// Account and storage slot cache under a block-processing access mix
#[derive(Debug, Clone, Copy)]
pub struct StateCacheProbe {
    accounts: usize,
    slots: usize,
}

impl Default for StateCacheProbe {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNTS, DEFAULT_SLOTS)
    }
}

impl StateCacheProbe {
    pub fn new(accounts: usize, slots: usize) -> Self {
        Self { accounts, slots }
    }
}

impl Probe for StateCacheProbe {
    type Output = StateCacheResult;

    fn name(&self) -> &'static str {
        "state_cache"
    }

    fn label(&self) -> &'static str {
        "State cache"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<StateCacheResult, ProbeError> {
        if self.accounts == 0 || self.slots == 0 {
            return Err(ProbeError::Setup(format!(
                "state cache needs accounts and slots, got {}x{}",
                self.accounts, self.slots
            )));
        }

        let mut rng = fixture_rng();
        let mut cache: HashMap<Address, CachedAccount> = HashMap::with_capacity(self.accounts);
        let mut addresses: Vec<Address> = Vec::with_capacity(self.accounts);

        for _ in 0..self.accounts {
            let mut address = Address::default();
            rng.fill_bytes(&mut address);

            let mut account = CachedAccount {
                data: vec![0u8; ACCOUNT_BYTES],
                slot_keys: Vec::with_capacity(self.slots),
                ..Default::default()
            };
            rng.fill_bytes(&mut account.data);
            for _ in 0..self.slots {
                let (mut key, mut value) = (Slot::default(), Slot::default());
                rng.fill_bytes(&mut key);
                rng.fill_bytes(&mut value);
                account.origin.insert(key, value);
                account.slot_keys.push(key);
            }

            cache.insert(address, account);
            addresses.push(address);
        }

        let mut hits = 0u64;
        let mut misses = 0u64;

        let tally = TimedLoop::new(budget).cancel_on(cancel).run(|| {
            let index = hits + misses;

            if index % MISS_EVERY < MISS_EVERY - 1 {
                let address = addresses[(index % addresses.len() as u64) as usize];
                let Some(account) = cache.get_mut(&address) else {
                    misses += 1;
                    return Outcome::bytes(SLOT_BYTES);
                };
                let key = account.slot_keys[(index % account.slot_keys.len() as u64) as usize];
                match account.read(&key) {
                    Some(_) => hits += 1,
                    None => misses += 1,
                }
                Outcome::bytes(SLOT_BYTES)
            } else {
                let mut address = Address::default();
                rng.fill_bytes(&mut address);
                match cache.get(&address) {
                    Some(account) => {
                        hits += 1;
                        Outcome::bytes(account.data.len() as u64)
                    }
                    None => {
                        misses += 1;
                        Outcome::bytes(ACCOUNT_BYTES as u64)
                    }
                }
            }
        });

        let cache_hits_per_second = per_second(hits as f64, tally.elapsed);
        let accesses = hits + misses;
        let hit_ratio = if accesses == 0 {
            0.0
        } else {
            hits as f64 / accesses as f64
        };
        let rating = Rating::classify(cache_hits_per_second, MetricId::CacheHits.curve());

        Ok(StateCacheResult {
            cache_hits_per_second,
            cache_misses_per_second: per_second(misses as f64, tally.elapsed),
            hit_ratio,
            throughput_mb_per_sec: tally.byte_rate() / MIB,
            meta: finish(&[tally], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_near_eighty_percent() {
        let result = StateCacheProbe::new(100, 10)
            .run(Duration::from_millis(30), &CancelToken::new())
            .unwrap();

        assert!(result.cache_hits_per_second > 0.0);
        assert!(result.cache_misses_per_second > 0.0);
        assert!(result.hit_ratio > 0.75 && result.hit_ratio < 0.85, "{}", result.hit_ratio);
        assert!(result.throughput_mb_per_sec > 0.0);
    }

    #[test]
    fn test_origin_reads_are_promoted() {
        let mut account = CachedAccount::default();
        account.origin.insert([1; 32], [2; 32]);

        assert_eq!(account.read(&[1; 32]), Some([2; 32]));
        assert!(account.dirty.contains_key(&[1; 32]));
        assert_eq!(account.read(&[9; 32]), None);
    }

    #[test]
    fn test_empty_cache_is_setup_error() {
        let err = StateCacheProbe::new(0, 50)
            .run(Duration::from_millis(1), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ProbeError::Setup(_)));
    }
}
