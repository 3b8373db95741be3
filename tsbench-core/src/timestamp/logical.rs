//! Shared logical clock with contention-adaptive advancing.
//!
//! Every advancer snapshots the counter, spins for its own backoff magnitude,
//! and only then tries to bump it. Threads that keep losing spin longer, which
//! spreads out a retry storm on the hot cache line. Successful bumps form a
//! total order; a thread that loses does not retry, it simply reuses the value
//! some other thread already published.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;

use super::{Backoff, Timestamp, TimestampSource, MIN_TIMESTAMP};

/// Which value `advance` hands back to the caller.
///
/// This is the linearization point seen by the downstream algorithm, so the
/// two choices are separate, named clock configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linearization {
    /// Return the snapshot taken before the bump (`ts`).
    ReadBeforeBump,
    /// Return the value the bump produces (`ts + 1`).
    ReadAfterBump,
}

#[derive(Debug)]
pub struct AdaptiveLogicalClock {
    current: CachePadded<AtomicU64>,
    linearization: Linearization,
}

impl AdaptiveLogicalClock {
    pub fn new(linearization: Linearization) -> Self {
        Self {
            current: CachePadded::new(AtomicU64::new(MIN_TIMESTAMP)),
            linearization,
        }
    }

    pub fn linearization(&self) -> Linearization {
        self.linearization
    }
}

impl TimestampSource for AdaptiveLogicalClock {
    type Local = Backoff;

    #[inline]
    fn read(&self) -> Timestamp {
        self.current.load(Ordering::SeqCst)
    }

    #[inline]
    fn advance(&self, backoff: &mut Backoff) -> Timestamp {
        let ts = self.current.load(Ordering::SeqCst);
        backoff.spin();

        let won = self.current.load(Ordering::SeqCst) == ts
            && self
                .current
                .compare_exchange(ts, ts + 1, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok();

        if won {
            backoff.on_win();
        } else {
            backoff.on_loss();
        }

        match self.linearization {
            Linearization::ReadBeforeBump => ts,
            Linearization::ReadAfterBump => ts + 1,
        }
    }
}
