//! # tsbench-core
//!
//! Timestamp sources and the lock-free building blocks of the benchmark.
//!
//! ### Expectations:
//! - No locks and no blocking system calls on any measured path
//! - Shared counters live on their own cache line
//! - Hardware counters are only reachable through a detected capability
//!
//! ### Key Submodules:
//! - `timestamp`: `TimestampSource` trait and its variants
//! - `platform`: cycle-counter sampling for the running target
//! - `topology`: thread index to core id placement
//! - `barrier`: busy-wait start barrier for a fixed worker pool
//! - `work`: splitting an operation count across workers

pub mod barrier;
pub mod error;
pub mod platform;
pub mod timestamp;
pub mod topology;
pub mod work;

pub mod prelude {
    pub use crate::barrier::SpinBarrier;
    pub use crate::error::*;
    pub use crate::timestamp::*;
    pub use crate::topology::{PlacementPolicy, ThreadPlacement, Topology};
    pub use crate::work::{CountMode, WorkSplit};
}

pub use error::CoreError;
