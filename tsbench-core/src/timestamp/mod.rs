//! ## tsbench-core::timestamp
//! **Interchangeable logical and hardware clocks**
//!
//! Downstream algorithms (range queries, snapshots, epoch reclamation) see a
//! clock only through [`TimestampSource::read`] and
//! [`TimestampSource::advance`]. Each variant trades consistency for cost:
//!
//! | Variant | Shared state | Ordering |
//! |---|---|---|
//! | [`HardwareCycleCounter`] | none | per core only |
//! | [`SerializedHardwareCycleCounter`] | none | per core, no reordering across the sample |
//! | [`RdtscpHardwareCycleCounter`] | none | per core, earlier instructions retired first |
//! | [`AdaptiveLogicalClock`] | one counter | total order of successful advances |
//! | [`MonotonicEpochCounter`] | one counter | single advancer only |
//! | [`AtomicIncrementCounter`] | one counter | total order, no backoff |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod backoff;
mod counter;
mod hardware;
mod logical;

pub use backoff::Backoff;
pub use counter::{AtomicIncrementCounter, MonotonicEpochCounter};
pub use hardware::{
    HardwareCycleCounter, RdtscpHardwareCycleCounter, SerializedHardwareCycleCounter,
};
pub use logical::{AdaptiveLogicalClock, Linearization};

/// A logical or hardware clock value.
pub type Timestamp = u64;

/// Initial value of every shared logical counter.
pub const MIN_TIMESTAMP: Timestamp = 1;

/// A clock shared by all workers of a trial.
///
/// `Local` is the calling thread's private state (for example its backoff
/// magnitude). Each thread owns one `Local` and passes it to every
/// [`advance`](TimestampSource::advance) call; the source itself never keeps
/// per-thread state.
pub trait TimestampSource: Send + Sync {
    type Local: Default + Send;

    /// Observes the current timestamp without changing it.
    fn read(&self) -> Timestamp;

    /// Produces a timestamp with the variant's monotonicity guarantee.
    fn advance(&self, local: &mut Self::Local) -> Timestamp;
}

/// Selector for the clock a trial exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceVariant {
    HardwareCycle,
    HardwareCycleSerialized,
    HardwareCycleRdtscp,
    AdaptiveClockReadBeforeBump,
    AdaptiveClockReadAfterBump,
    EpochCounter,
    /// Plain `fetch_add` on a shared counter, the uncontrolled baseline.
    AtomicIncrement,
}

impl SourceVariant {
    pub const ALL: [SourceVariant; 7] = [
        SourceVariant::HardwareCycle,
        SourceVariant::HardwareCycleSerialized,
        SourceVariant::HardwareCycleRdtscp,
        SourceVariant::AdaptiveClockReadBeforeBump,
        SourceVariant::AdaptiveClockReadAfterBump,
        SourceVariant::EpochCounter,
        SourceVariant::AtomicIncrement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceVariant::HardwareCycle => "hardware_cycle",
            SourceVariant::HardwareCycleSerialized => "hardware_cycle_serialized",
            SourceVariant::HardwareCycleRdtscp => "hardware_cycle_rdtscp",
            SourceVariant::AdaptiveClockReadBeforeBump => "adaptive_clock_read_before_bump",
            SourceVariant::AdaptiveClockReadAfterBump => "adaptive_clock_read_after_bump",
            SourceVariant::EpochCounter => "epoch_counter",
            SourceVariant::AtomicIncrement => "atomic_increment",
        }
    }

    /// Whether the variant keeps a counter shared by every worker.
    pub fn has_shared_state(&self) -> bool {
        !matches!(
            self,
            SourceVariant::HardwareCycle
                | SourceVariant::HardwareCycleSerialized
                | SourceVariant::HardwareCycleRdtscp
        )
    }
}

impl fmt::Display for SourceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a selector name that matches no variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timestamp source `{0}`")]
pub struct UnknownSourceVariant(pub String);

impl FromStr for SourceVariant {
    type Err = UnknownSourceVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| UnknownSourceVariant(s.to_string()))
    }
}
