//! State trie node insert, lookup and rehash

use crate::budget::{allocate, Share};
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop, MIB};
use crate::models::{Rating, TrieResult};
use crate::probes::{finish, fixture_rng, Probe, ScratchPool};
use crate::scoring::MetricId;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::hint::black_box;
use std::mem::size_of;
use std::time::Duration;

/// insert, lookup, root hash
const PHASES: [Share; 3] = [Share::new(2, 5), Share::new(2, 5), Share::new(1, 5)];

/// Upper bound on live nodes; further inserts overwrite existing keys
pub const DEFAULT_NODE_CAP: usize = 2_000_000;

pub const KEY_LEN: usize = 20;
pub const VALUE_LEN: usize = 100;

type Key = [u8; KEY_LEN];

#[derive(Debug)]
struct Node {
    hash: [u8; 32],
    value: Box<[u8; VALUE_LEN]>,
    dirty: bool,
}

/// Account-keyed node map standing in for a Merkle-Patricia trie
#[derive(Debug, Clone, Copy)]
pub struct TrieProbe {
    node_cap: usize,
}

impl Default for TrieProbe {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_CAP)
    }
}

impl TrieProbe {
    pub fn new(node_cap: usize) -> Self {
        Self {
            node_cap: node_cap.max(1),
        }
    }

    /// Inserts dominate the rating; lookups are three orders of magnitude
    /// more frequent and scaled down accordingly
    pub fn rating_input(insert_rate: f64, lookup_rate: f64) -> f64 {
        0.4 * insert_rate + 0.0006 * lookup_rate
    }
}

fn node_hash(hasher: &mut Keccak256, key: &Key, value: &[u8], out: &mut [u8; 32]) {
    hasher.update(key);
    hasher.update(value);
    out.copy_from_slice(&hasher.finalize_reset());
}

fn estimated_size_mb(nodes: usize, keys: usize) -> f64 {
    let per_node = size_of::<Key>() + size_of::<Node>() + VALUE_LEN;
    let bytes = nodes * per_node + keys * size_of::<Key>();
    bytes as f64 / MIB
}

impl Probe for TrieProbe {
    type Output = TrieResult;

    fn name(&self) -> &'static str {
        "trie"
    }

    fn label(&self) -> &'static str {
        "Trie operations"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<TrieResult, ProbeError> {
        let mut rng = fixture_rng();
        let mut hashers: ScratchPool<Keccak256> = ScratchPool::new(1);
        let mut nodes: HashMap<Key, Node> = HashMap::new();
        let mut keys: Vec<Key> = Vec::with_capacity(10_000);

        let [insert_budget, lookup_budget, hash_budget] = allocate(budget, &PHASES);

        let mut overwrites = 0usize;
        let insert = TimedLoop::new(insert_budget).cancel_on(cancel).run(|| {
            let mut value = Box::new([0u8; VALUE_LEN]);
            rng.fill_bytes(&mut value[..]);

            let key = if keys.len() < self.node_cap {
                let mut key = [0u8; KEY_LEN];
                rng.fill_bytes(&mut key);
                keys.push(key);
                key
            } else {
                let key = keys[overwrites % keys.len()];
                overwrites += 1;
                key
            };

            let mut hasher = hashers.take();
            let mut hash = [0u8; 32];
            node_hash(&mut hasher, &key, &value[..], &mut hash);
            hashers.give(hasher);

            nodes.insert(
                key,
                Node {
                    hash,
                    value,
                    dirty: true,
                },
            );
            Outcome::op()
        });

        let mut cursor = 0usize;
        let lookup = TimedLoop::new(lookup_budget).cancel_on(cancel).run(|| {
            if keys.is_empty() {
                return Outcome::Failed;
            }
            let key = &keys[cursor % keys.len()];
            cursor = cursor.wrapping_add(1);
            match nodes.get(key) {
                Some(node) => {
                    black_box(node.value[0]);
                    Outcome::op()
                }
                None => Outcome::Failed,
            }
        });

        let mut root = [0u8; 32];
        let hash_pass = TimedLoop::new(hash_budget).cancel_on(cancel).run(|| {
            let mut hasher = hashers.take();
            for node in nodes.values().filter(|n| n.dirty) {
                hasher.update(node.hash);
            }
            root.copy_from_slice(&hasher.finalize_reset());
            hashers.give(hasher);
            black_box(&root);
            Outcome::op()
        });

        let inserts_per_second = insert.rate();
        let lookups_per_second = lookup.rate();
        let peak_memory_mb = estimated_size_mb(nodes.len(), keys.capacity());
        let rating = Rating::classify(
            Self::rating_input(inserts_per_second, lookups_per_second),
            MetricId::TrieInsert.curve(),
        );

        Ok(TrieResult {
            inserts_per_second,
            lookups_per_second,
            hashes_per_second: hash_pass.rate(),
            peak_memory_mb,
            meta: finish(&[insert, lookup, hash_pass], rating),
        })
    }
}
