//! ## tsbench-core::work
//! **Splitting a trial's operation count over its workers**

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the configured operation count refers to.
///
/// The two meanings are kept apart on purpose; a trial must name one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// The count is the total across all workers.
    #[default]
    Total,
    /// Every worker performs the full count.
    PerThread,
}

impl CountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountMode::Total => "total",
            CountMode::PerThread => "per_thread",
        }
    }
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-worker operation counts for one trial.
///
/// In [`CountMode::Total`] every worker gets `count / threads` operations and
/// the last one also absorbs the remainder, so the loads always sum to the
/// configured count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSplit {
    operation_count: u64,
    thread_count: usize,
    mode: CountMode,
}

impl WorkSplit {
    /// `thread_count` must be positive.
    pub fn new(operation_count: u64, thread_count: usize, mode: CountMode) -> Self {
        debug_assert!(thread_count > 0, "work split needs at least one thread");
        Self {
            operation_count,
            thread_count,
            mode,
        }
    }

    pub fn mode(&self) -> CountMode {
        self.mode
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Baseline load of every worker but the last (in total mode).
    pub fn ops_per_thread(&self) -> u64 {
        match self.mode {
            CountMode::Total => self.operation_count / self.thread_count as u64,
            CountMode::PerThread => self.operation_count,
        }
    }

    /// Operations assigned to worker `index`.
    pub fn ops_for(&self, index: usize) -> u64 {
        let per_thread = self.ops_per_thread();
        match self.mode {
            CountMode::Total if index + 1 == self.thread_count => {
                self.operation_count - index as u64 * per_thread
            }
            _ => per_thread,
        }
    }

    /// Sum of all worker loads, or `None` if it does not fit in a `u64`.
    pub fn checked_total(&self) -> Option<u64> {
        match self.mode {
            CountMode::Total => Some(self.operation_count),
            CountMode::PerThread => self.operation_count.checked_mul(self.thread_count as u64),
        }
    }

    /// Sum of all worker loads, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.checked_total().unwrap_or(u64::MAX)
    }

    pub fn loads(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.thread_count).map(|index| self.ops_for(index))
    }
}
