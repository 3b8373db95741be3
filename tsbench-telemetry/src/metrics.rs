//! ## tsbench-telemetry::metrics
//! **Prometheus registry for completed trials**

use std::time::Duration;

use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub trials: Counter,
    pub operations: Counter,
    pub throughput_mops: Gauge,
    pub trial_duration: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let trials = Counter::new("tsbench_trials_total", "Completed benchmark trials")?;
        let operations = Counter::new(
            "tsbench_operations_total",
            "Timestamp operations executed across all trials",
        )?;
        let throughput_mops = Gauge::new(
            "tsbench_throughput_mops",
            "Throughput of the most recent trial in millions of operations per second",
        )?;
        let trial_duration = Histogram::with_opts(
            HistogramOpts::new("tsbench_trial_duration_seconds", "Measured trial wall time")
                .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0, 100.0]),
        )?;

        registry.register(Box::new(trials.clone()))?;
        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(throughput_mops.clone()))?;
        registry.register(Box::new(trial_duration.clone()))?;

        Ok(Self {
            registry,
            trials,
            operations,
            throughput_mops,
            trial_duration,
        })
    }

    pub fn record_trial(&self, operations: u64, elapsed: Duration, ops_per_second: f64) {
        self.trials.inc();
        self.operations.inc_by(operations as f64);
        self.throughput_mops.set(ops_per_second / 1_000_000.0);
        self.trial_duration.observe(elapsed.as_secs_f64());
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_a_trial() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_trial(2_000_000, Duration::from_millis(500), 4_000_000.0);

        assert_eq!(metrics.trials.get(), 1.0);
        assert_eq!(metrics.operations.get(), 2_000_000.0);
        assert_eq!(metrics.throughput_mops.get(), 4.0);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("tsbench_trials_total 1"));
        assert!(text.contains("tsbench_trial_duration_seconds_count 1"));
    }
}
