/*!
# Benchmark Harness

Executes one trial: a fresh pool of OS threads, one per worker, each bound
to its planned core, all released by a spin barrier at the instant the
controller starts the clock. The clock stops after the last join.

The inner loop is monomorphized per timestamp source, so the measured path
never goes through dynamic dispatch.
*/

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use tsbench_core::barrier::SpinBarrier;
use tsbench_core::timestamp::{
    AdaptiveLogicalClock, AtomicIncrementCounter, HardwareCycleCounter, Linearization,
    MonotonicEpochCounter, RdtscpHardwareCycleCounter, SerializedHardwareCycleCounter,
    SourceVariant, TimestampSource,
};
use tsbench_telemetry::{EventLogger, MetricsRecorder};

use crate::affinity;
use crate::error::EngineError;
use crate::result::TrialResult;
use crate::trial::TrialConfig;
use crate::worker::{self, WorkerPlan};

/// Owns a trial's configuration and runs it.
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    config: TrialConfig,
    metrics: Option<MetricsRecorder>,
}

impl BenchmarkHarness {
    pub fn new(config: TrialConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Records every completed trial into `metrics`.
    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Runs the trial once. No retries.
    #[instrument(
        level = "info",
        name = "trial",
        skip(self),
        fields(
            source = %self.config.source(),
            threads = self.config.thread_count(),
            operations = self.config.operation_count(),
            count_mode = %self.config.count_mode(),
            placement = %self.config.placement(),
        )
    )]
    pub fn run(&self) -> Result<TrialResult, EngineError> {
        let result = match self.config.source() {
            SourceVariant::HardwareCycle => drive(&self.config, HardwareCycleCounter::new()?),
            SourceVariant::HardwareCycleSerialized => {
                drive(&self.config, SerializedHardwareCycleCounter::new()?)
            }
            SourceVariant::HardwareCycleRdtscp => {
                drive(&self.config, RdtscpHardwareCycleCounter::new()?)
            }
            SourceVariant::AdaptiveClockReadBeforeBump => drive(
                &self.config,
                AdaptiveLogicalClock::new(Linearization::ReadBeforeBump),
            ),
            SourceVariant::AdaptiveClockReadAfterBump => drive(
                &self.config,
                AdaptiveLogicalClock::new(Linearization::ReadAfterBump),
            ),
            SourceVariant::EpochCounter => drive(&self.config, MonotonicEpochCounter::new()),
            SourceVariant::AtomicIncrement => drive(&self.config, AtomicIncrementCounter::new()),
        }?;

        info!(
            elapsed_us = result.elapsed.as_micros() as u64,
            mops = result.mops(),
            "Trial complete"
        );
        EventLogger::log_event(
            "trial_complete",
            &[
                ("source", self.config.source().to_string()),
                ("threads", self.config.thread_count().to_string()),
                ("operations", result.operations.to_string()),
                ("elapsed_us", result.elapsed.as_micros().to_string()),
            ],
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_trial(
                result.operations,
                result.elapsed,
                result.operations_per_second,
            );
        }
        Ok(result)
    }
}

/// Runs one trial of `config` without metrics.
pub fn run_trial(config: &TrialConfig) -> Result<TrialResult, EngineError> {
    BenchmarkHarness::new(config.clone()).run()
}

fn drive<S>(config: &TrialConfig, source: S) -> Result<TrialResult, EngineError>
where
    S: TimestampSource + 'static,
{
    let thread_count = config.thread_count();
    let split = config.split();
    let placement = config.plan_placement();
    let cores = affinity::resolve(&placement, affinity::host_cores().as_deref());

    let online = num_cpus::get();
    if thread_count > online {
        warn!(
            threads = thread_count,
            online, "More workers than online CPUs; spinning workers will share cores"
        );
    }

    let source = Arc::new(source);
    let barrier = Arc::new(SpinBarrier::new(thread_count));
    let mut handles = Vec::with_capacity(thread_count);

    for (index, core) in cores.into_iter().enumerate() {
        let plan = WorkerPlan {
            index,
            core,
            operations: split.ops_for(index),
        };
        debug!(worker = index, core = ?plan.core, operations = plan.operations, "Spawning worker");

        let worker_source = Arc::clone(&source);
        let worker_barrier = Arc::clone(&barrier);
        let spawned = thread::Builder::new()
            .name(format!("tsbench-worker-{}", index))
            .spawn(move || worker::run(plan, &*worker_source, &worker_barrier));

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                // Workers already spawned are parked on the barrier; let them
                // finish before reporting.
                barrier.release();
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(EngineError::Spawn { index, source: err });
            }
        }
    }

    let started_at = barrier.release_when_ready(Instant::now);

    let mut workers = Vec::with_capacity(thread_count);
    let mut panicked = None;
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(report) => workers.push(report),
            Err(_) => {
                panicked.get_or_insert(index);
            }
        }
    }
    let finished_at = Instant::now();

    if let Some(index) = panicked {
        return Err(EngineError::WorkerPanicked(index));
    }

    Ok(TrialResult::new(
        started_at,
        finished_at,
        split.total(),
        workers,
    ))
}
