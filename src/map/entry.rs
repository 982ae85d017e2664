//! Dated Value Module
//!
//! A stored value paired with the instant it was last set.

use std::time::{Duration, Instant};

// == Dated Value ==
/// A single map entry. Never handed out by reference; callers get clones.
#[derive(Debug, Clone)]
pub(crate) struct DatedValue<T> {
    /// The stored value
    pub value: T,
    /// Instant of the most recent `set` for this key
    pub timestamp: Instant,
}

impl<T> DatedValue<T> {
    // == Constructor ==
    /// Wraps a value with the current instant.
    pub fn new(value: T) -> Self {
        Self {
            value,
            timestamp: Instant::now(),
        }
    }

    // == Elapsed ==
    /// Time since the entry was set.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `age`.
    ///
    /// An entry whose elapsed time equals `age` exactly is still live; it
    /// expires once the elapsed time is strictly greater.
    pub fn is_expired(&self, age: Duration) -> bool {
        self.elapsed() > age
    }
}
