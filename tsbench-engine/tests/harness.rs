use proptest::prelude::*;

use tsbench_core::timestamp::{SourceVariant, MIN_TIMESTAMP};
use tsbench_core::topology::{PlacementPolicy, Topology};
use tsbench_core::work::CountMode;
use tsbench_engine::{run_trial, BenchmarkHarness, EngineError, TrialConfig};
use tsbench_telemetry::MetricsRecorder;

#[test]
fn remainder_is_absorbed_by_last_worker() {
    let config = TrialConfig::new(7, 3, SourceVariant::AtomicIncrement).unwrap();
    let result = run_trial(&config).unwrap();

    let loads: Vec<u64> = result.workers.iter().map(|w| w.operations).collect();
    assert_eq!(loads, vec![2, 2, 3]);
    assert_eq!(result.operations, 7);
    assert_eq!(result.executed_operations(), 7);

    // The globally last fetch_add is some worker's last advance.
    let highest = result.workers.iter().map(|w| w.last_timestamp).max();
    assert_eq!(highest, Some(MIN_TIMESTAMP + 7));
}

#[test]
fn even_split_across_four_workers() {
    let config = TrialConfig::new(1_000_000, 4, SourceVariant::AtomicIncrement).unwrap();
    let result = run_trial(&config).unwrap();
    assert!(result.workers.iter().all(|w| w.operations == 250_000));
    assert_eq!(result.executed_operations(), 1_000_000);
}

#[test]
fn per_thread_mode_runs_full_count_on_every_worker() {
    let config = TrialConfig::new(100, 4, SourceVariant::AtomicIncrement)
        .unwrap()
        .with_count_mode(CountMode::PerThread)
        .unwrap();
    let result = run_trial(&config).unwrap();
    assert!(result.workers.iter().all(|w| w.operations == 100));
    assert_eq!(result.operations, 400);
    let highest = result.workers.iter().map(|w| w.last_timestamp).max();
    assert_eq!(highest, Some(MIN_TIMESTAMP + 400));
}

#[test]
fn workers_never_start_before_controller_instant() {
    for _ in 0..10 {
        let config = TrialConfig::new(1_000, 4, SourceVariant::EpochCounter).unwrap();
        let result = run_trial(&config).unwrap();
        for worker in &result.workers {
            assert!(
                worker.released_at >= result.started_at,
                "worker {} started before the controller's start instant",
                worker.index
            );
        }
    }
}

#[test]
fn elapsed_window_spans_every_worker_release() {
    for _ in 0..10 {
        let config = TrialConfig::new(2_000, 3, SourceVariant::AtomicIncrement).unwrap();
        let result = run_trial(&config).unwrap();
        let finished_at = result.started_at + result.elapsed;
        for worker in &result.workers {
            assert!(worker.released_at >= result.started_at);
            assert!(worker.released_at <= finished_at);
        }
    }
}

#[test]
fn adaptive_clocks_complete_under_contention() {
    for source in [
        SourceVariant::AdaptiveClockReadBeforeBump,
        SourceVariant::AdaptiveClockReadAfterBump,
    ] {
        let config = TrialConfig::new(40_000, 4, source).unwrap();
        let result = run_trial(&config).unwrap();
        assert_eq!(result.executed_operations(), 40_000);
        for worker in &result.workers {
            assert!(worker.last_timestamp >= MIN_TIMESTAMP);
            assert!(worker.last_timestamp <= MIN_TIMESTAMP + 40_000);
        }
    }
}

#[test]
fn pinned_placement_still_completes() {
    let topology = Topology::new(1, 2, 1).unwrap();
    for policy in [
        PlacementPolicy::ZoneSaturateFirst,
        PlacementPolicy::PairSaturateFirst,
    ] {
        // Three workers on a two-slot topology: the third is never pinned.
        let config = TrialConfig::new(3_000, 3, SourceVariant::AtomicIncrement)
            .unwrap()
            .with_placement(policy, topology);
        let result = run_trial(&config).unwrap();
        assert_eq!(result.executed_operations(), 3_000);
        assert_eq!(result.workers[2].core, None);
        for worker in &result.workers[..2] {
            if let Some(core) = worker.core {
                assert_eq!(core, worker.index);
            }
        }
    }
}

#[test]
fn zero_threads_produces_no_result() {
    let err = TrialConfig::new(10, 0, SourceVariant::HardwareCycle).unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("thread_count"));
}

#[test]
fn metrics_are_recorded_for_completed_trials() {
    let metrics = MetricsRecorder::new().unwrap();
    let config = TrialConfig::new(500, 2, SourceVariant::EpochCounter).unwrap();
    let harness = BenchmarkHarness::new(config).with_metrics(metrics.clone());
    harness.run().unwrap();
    harness.run().unwrap();
    assert_eq!(metrics.trials.get(), 2.0);
    assert_eq!(metrics.operations.get(), 1_000.0);
}

#[cfg(target_arch = "x86_64")]
#[test]
fn hardware_cycle_end_to_end() {
    let config = TrialConfig::new(10_000_000, 8, SourceVariant::HardwareCycle).unwrap();
    let result = run_trial(&config).unwrap();

    assert!(result.elapsed.as_nanos() > 0);
    assert_eq!(result.operations, 10_000_000);
    let expected = 10_000_000.0 / result.elapsed.as_secs_f64();
    assert!((result.operations_per_second - expected).abs() <= expected * 1e-9);
    assert!(result.workers.iter().all(|w| w.last_timestamp > 0));
}

#[cfg(target_arch = "x86_64")]
#[test]
fn serialized_hardware_cycle_runs() {
    let config = TrialConfig::new(100_000, 2, SourceVariant::HardwareCycleSerialized).unwrap();
    let result = run_trial(&config).unwrap();
    assert_eq!(result.executed_operations(), 100_000);
}

#[cfg(target_arch = "x86_64")]
#[test]
fn rdtscp_hardware_cycle_runs_when_available() {
    let config = TrialConfig::new(100_000, 2, SourceVariant::HardwareCycleRdtscp).unwrap();
    match run_trial(&config) {
        Ok(result) => {
            assert_eq!(result.executed_operations(), 100_000);
            assert!(result.workers.iter().all(|w| w.last_timestamp > 0));
        }
        Err(err) => assert!(matches!(err, EngineError::Core(_))),
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[test]
fn hardware_cycle_unsupported_off_x86_64() {
    let config = TrialConfig::new(10, 1, SourceVariant::HardwareCycle).unwrap();
    assert!(matches!(run_trial(&config), Err(EngineError::Core(_))));
}

#[test]
fn configuration_errors_are_distinguished() {
    let err = EngineError::WorkerPanicked(3);
    assert!(!err.is_configuration_error());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn executed_operations_match_configured_total(ops in 1u64..20_000, threads in 1usize..6) {
        let config = TrialConfig::new(ops, threads, SourceVariant::AtomicIncrement).unwrap();
        let result = run_trial(&config).unwrap();
        prop_assert_eq!(result.executed_operations(), ops);
        prop_assert_eq!(result.workers.len(), threads);
        let highest = result.workers.iter().map(|w| w.last_timestamp).max();
        prop_assert_eq!(highest, Some(MIN_TIMESTAMP + ops));
    }
}
