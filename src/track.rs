//! Stale-result tracking for overlapping async requests.
//!
//! Each request is tagged with a monotonically increasing generation number at
//! initiation. A completion is applied only when its tag still equals the
//! latest-initiated generation, so the result shown to the caller is always
//! that of the most recently started request, not whichever resolved last.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A single current-result slot with last-initiated-wins semantics.
#[derive(Debug)]
pub struct ResultSlot<T> {
    latest: AtomicU64,
    value: Mutex<Option<T>>,
}

impl<T> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            value: Mutex::new(None),
        }
    }

    /// Register a new request and return its generation tag.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a completed request's value if it is still the latest-initiated
    /// one. Returns whether the value was stored; stale completions are
    /// discarded untouched.
    pub fn complete(&self, tag: u64, value: T) -> bool {
        if self.latest.load(Ordering::SeqCst) != tag {
            tracing::debug!("Discarding stale result for generation {}", tag);
            return false;
        }
        *self.value.lock().unwrap() = Some(value);
        true
    }

    /// Current value, if any request has completed while still latest.
    pub fn current(&self) -> Option<T>
    where
        T: Clone,
    {
        self.value.lock().unwrap().clone()
    }

    /// Drop the stored value, e.g. when the caller resets after a failure.
    pub fn clear(&self) {
        *self.value.lock().unwrap() = None;
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
