//! Memory probes: state trie, interpreter scratch pools and the state cache

mod pool;
mod state;
mod trie;

pub use pool::PoolProbe;
pub use state::StateCacheProbe;
pub use trie::TrieProbe;
