//! Shared counters without adaptive backoff.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;

use super::{Timestamp, TimestampSource, MIN_TIMESTAMP};

/// Epoch counter bumped with a plain load/store pair.
///
/// There is no read-modify-write arbitration: two concurrent advancers can
/// both publish the same value and one bump is lost. Correct only when an
/// outside protocol guarantees a single advancing thread (for example one
/// epoch announcer); this type does not enforce that.
#[derive(Debug)]
pub struct MonotonicEpochCounter {
    epoch: CachePadded<AtomicU64>,
}

impl MonotonicEpochCounter {
    pub fn new() -> Self {
        Self {
            epoch: CachePadded::new(AtomicU64::new(MIN_TIMESTAMP)),
        }
    }
}

impl Default for MonotonicEpochCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampSource for MonotonicEpochCounter {
    type Local = ();

    #[inline]
    fn read(&self) -> Timestamp {
        self.epoch.load(Ordering::Acquire)
    }

    #[inline]
    fn advance(&self, _: &mut ()) -> Timestamp {
        let next = self.epoch.load(Ordering::Relaxed) + 1;
        self.epoch.store(next, Ordering::Release);
        next
    }
}

/// Baseline: every advance is an unconditional `fetch_add`.
#[derive(Debug)]
pub struct AtomicIncrementCounter {
    value: CachePadded<AtomicU64>,
}

impl AtomicIncrementCounter {
    pub fn new() -> Self {
        Self {
            value: CachePadded::new(AtomicU64::new(MIN_TIMESTAMP)),
        }
    }
}

impl Default for AtomicIncrementCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampSource for AtomicIncrementCounter {
    type Local = ();

    #[inline]
    fn read(&self) -> Timestamp {
        self.value.load(Ordering::SeqCst)
    }

    #[inline]
    fn advance(&self, _: &mut ()) -> Timestamp {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }
}
