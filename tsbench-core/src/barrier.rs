//! ## tsbench-core::barrier
//! **Busy-wait start barrier for a fixed worker pool**
//!
//! Workers announce themselves and spin on a release flag; the controller
//! spins until every worker has arrived, records whatever it needs (the start
//! instant), then releases them all at once. Nothing here blocks in the
//! kernel or yields, so the measured window starts without scheduler wakeups.
//!
//! There is no timeout: a worker that never arrives leaves the controller
//! spinning forever.

use std::hint;
use std::sync::atomic::{fence, AtomicBool, AtomicUsize, Ordering};

use crossbeam::utils::CachePadded;

#[derive(Debug)]
pub struct SpinBarrier {
    parties: usize,
    arrived: CachePadded<AtomicUsize>,
    released: CachePadded<AtomicBool>,
}

impl SpinBarrier {
    /// Creates a barrier for `parties` workers (the controller is not counted).
    pub fn new(parties: usize) -> Self {
        Self {
            parties,
            arrived: CachePadded::new(AtomicUsize::new(0)),
            released: CachePadded::new(AtomicBool::new(false)),
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Number of workers that have called [`SpinBarrier::arrive_and_wait`].
    pub fn arrived(&self) -> usize {
        self.arrived.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Worker side: register arrival, then spin until released.
    #[inline]
    pub fn arrive_and_wait(&self) {
        self.arrived.fetch_add(1, Ordering::SeqCst);
        fence(Ordering::SeqCst);

        while !self.released.load(Ordering::Acquire) {
            fence(Ordering::SeqCst);
            hint::spin_loop();
        }
        fence(Ordering::SeqCst);
    }

    /// Controller side: spin until all parties have arrived.
    #[inline]
    pub fn wait_for_arrivals(&self) {
        while self.arrived.load(Ordering::Acquire) < self.parties {
            fence(Ordering::SeqCst);
            hint::spin_loop();
        }
        fence(Ordering::SeqCst);
    }

    /// Controller side: let every waiting worker proceed. Single writer.
    #[inline]
    pub fn release(&self) {
        fence(Ordering::SeqCst);
        self.released.store(true, Ordering::Release);
    }

    /// Controller side: wait for all arrivals, run `at_start` while every
    /// worker is still held, then release. Returns what `at_start` produced.
    pub fn release_when_ready<T>(&self, at_start: impl FnOnce() -> T) -> T {
        self.wait_for_arrivals();
        let value = at_start();
        self.release();
        value
    }
}
