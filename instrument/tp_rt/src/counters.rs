//! Persistent per-function call counters.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Call-counter table: function name to monotonically increasing count.
///
/// Counters are created lazily, zero-initialized, on first reference to a
/// name, and persist for the lifetime of the table (the running
/// instrumented program). The increment is atomic, so concurrent
/// invocations of the same function never lose counts.
#[derive(Debug, Default)]
pub struct CallCounterState {
    counters: DashMap<String, AtomicU64>,
}

impl CallCounterState {
    pub fn new() -> CallCounterState {
        CallCounterState::default()
    }

    /// Increment `name`'s counter and return the post-increment value.
    /// The first bump of a name returns 1.
    pub fn bump(&self, name: &str) -> u64 {
        if let Some(counter) = self.counters.get(name) {
            return counter.fetch_add(1, Ordering::Relaxed) + 1;
        }
        self.counters
            .entry(name.to_owned())
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }

    /// Current count for `name`; 0 when the counter was never referenced.
    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map_or(0, |counter| counter.load(Ordering::Relaxed))
    }
}
