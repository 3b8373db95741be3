//! Trial outcome and its plain-text rendering.

use std::fmt;
use std::time::{Duration, Instant};

use tsbench_core::timestamp::Timestamp;

/// What a single worker did during the trial.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub index: usize,
    /// Core the worker was actually pinned to.
    pub core: Option<usize>,
    pub operations: u64,
    /// First instant the worker observed after the barrier released it.
    pub released_at: Instant,
    /// Value returned by the worker's final `advance` (0 if it had no work).
    pub last_timestamp: Timestamp,
}

/// Measured outcome of one trial.
#[derive(Debug, Clone)]
pub struct TrialResult {
    /// From `started_at` to the return of the last worker join. Includes the
    /// store that releases the barrier and the workers' wake-up from it.
    pub elapsed: Duration,
    pub operations: u64,
    pub operations_per_second: f64,
    /// Instant the controller captured once every worker had arrived, just
    /// before the release flag was stored. No worker starts its loop before it.
    pub started_at: Instant,
    pub workers: Vec<WorkerReport>,
}

impl TrialResult {
    pub(crate) fn new(
        started_at: Instant,
        finished_at: Instant,
        operations: u64,
        workers: Vec<WorkerReport>,
    ) -> Self {
        let elapsed = finished_at.duration_since(started_at);
        let seconds = elapsed.max(Duration::from_nanos(1)).as_secs_f64();
        Self {
            elapsed,
            operations,
            operations_per_second: operations as f64 / seconds,
            started_at,
            workers,
        }
    }

    /// Throughput in millions of operations per second.
    pub fn mops(&self) -> f64 {
        self.operations_per_second / 1_000_000.0
    }

    /// Sum of the operations every worker reports.
    pub fn executed_operations(&self) -> u64 {
        self.workers.iter().map(|worker| worker.operations).sum()
    }
}

impl fmt::Display for TrialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total time micro-seconds: {}", self.elapsed.as_micros())?;
        writeln!(f, "Total time seconds: {:.6}", self.elapsed.as_secs_f64())?;
        write!(f, "ops/second (in millions): {:.3}", self.mops())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_from_elapsed_time() {
        let start = Instant::now();
        let result = TrialResult::new(start, start + Duration::from_millis(500), 2_000_000, vec![]);
        assert_eq!(result.elapsed, Duration::from_millis(500));
        assert!((result.operations_per_second - 4_000_000.0).abs() < 1e-6);
        assert!((result.mops() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn zero_elapsed_stays_finite() {
        let start = Instant::now();
        let result = TrialResult::new(start, start, 10, vec![]);
        assert!(result.operations_per_second.is_finite());
    }

    #[test]
    fn renders_text_report() {
        let start = Instant::now();
        let result = TrialResult::new(start, start + Duration::from_micros(1_500_000), 3_000_000, vec![]);
        let text = result.to_string();
        assert!(text.contains("Total time micro-seconds: 1500000"));
        assert!(text.contains("Total time seconds: 1.500000"));
        assert!(text.contains("ops/second (in millions): 2.000"));
    }
}
