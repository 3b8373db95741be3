//! # tsbench Telemetry
//!
//! Logging bootstrap and trial metrics for the benchmark tools.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
