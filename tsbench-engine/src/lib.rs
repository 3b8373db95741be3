//! # tsbench-engine
//!
//! Runs one benchmark trial end to end: plans thread placement, spawns a
//! fresh pool of pinned workers, releases them together through a spin
//! barrier, joins them, and reports elapsed time and throughput.

mod affinity;
pub mod error;
pub mod harness;
pub mod result;
pub mod trial;
mod worker;

pub use error::EngineError;
pub use harness::{run_trial, BenchmarkHarness};
pub use result::{TrialResult, WorkerReport};
pub use trial::TrialConfig;

pub mod prelude {
    pub use crate::{run_trial, BenchmarkHarness, EngineError, TrialConfig, TrialResult};
}
