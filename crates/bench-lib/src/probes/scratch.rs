//! Per-invocation scratch object pool
//!
//! A probe creates its own pool, draws from it inside the measurement loop
//! and drops it when it returns. Nothing is shared across probes or runs.

/// LIFO free list of reusable scratch objects
#[derive(Debug)]
pub struct ScratchPool<T> {
    free: Vec<T>,
    max_idle: usize,
}

impl<T> ScratchPool<T> {
    /// Pool that keeps at most `max_idle` returned objects
    pub fn new(max_idle: usize) -> Self {
        Self {
            free: Vec::with_capacity(max_idle.min(64)),
            max_idle,
        }
    }

    /// Take an idle object, or build a fresh one with `make`
    pub fn take_or_else(&mut self, make: impl FnOnce() -> T) -> T {
        self.free.pop().unwrap_or_else(make)
    }

    /// Return an object; dropped when the pool is full
    pub fn give(&mut self, item: T) {
        if self.free.len() < self.max_idle {
            self.free.push(item);
        }
    }

    /// Return an object only if `keep` accepts it
    pub fn give_if(&mut self, item: T, keep: impl FnOnce(&T) -> bool) {
        if keep(&item) {
            self.give(item);
        }
    }

    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

impl<T: Default> ScratchPool<T> {
    pub fn take(&mut self) -> T {
        self.take_or_else(T::default)
    }
}
