use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::error;

use tsbench_config::{BenchConfig, Overrides};
use tsbench_core::topology::ThreadPlacement;
use tsbench_engine::{BenchmarkHarness, TrialConfig};
use tsbench_telemetry::{EventLogger, MetricsRecorder};

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "tsbench", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one timed trial of a timestamp source
    Run(RunArgs),
    /// Print the worker to core mapping for a placement policy
    Plan(PlanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of timestamp operations
    #[arg(short = 'n', long = "operations")]
    pub operations: Option<u64>,
    /// Timestamp source: hardware_cycle, hardware_cycle_serialized,
    /// hardware_cycle_rdtscp,
    /// adaptive_clock_read_before_bump, adaptive_clock_read_after_bump,
    /// epoch_counter or atomic_increment
    #[arg(short = 'm', long = "method")]
    pub method: Option<String>,
    /// Number of worker threads
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,
    /// Whether -n is split across workers (total) or run by each (per_thread)
    #[arg(long)]
    pub count_mode: Option<String>,
    /// unpinned, zone_saturate_first or pair_saturate_first
    #[arg(long)]
    pub placement: Option<String>,
    /// Configuration file; defaults to config/tsbench.yaml when present
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print Prometheus metrics after the trial
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Number of worker threads
    #[arg(short = 't', long = "threads", default_value_t = num_cpus::get())]
    pub threads: usize,
    /// unpinned, zone_saturate_first or pair_saturate_first
    #[arg(long)]
    pub placement: Option<String>,
    /// Configuration file; defaults to config/tsbench.yaml when present
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::default();
        overrides.trial.operation_count = self.operations;
        overrides.trial.thread_count = self.threads;
        overrides.trial.source = self.method.clone();
        overrides.trial.count_mode = self.count_mode.clone();
        overrides.topology.placement = self.placement.clone();
        if self.metrics {
            overrides.telemetry.emit_metrics = Some(true);
        }
        overrides
    }
}

pub fn run_benchmark(args: RunArgs) -> CliResult {
    let config = match BenchConfig::load_with(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(err) => {
            EventLogger::init("info");
            error!(error = %err, "Rejected benchmark configuration");
            return Err(err.into());
        }
    };
    EventLogger::init(&config.telemetry.log_level);

    let trial = TrialConfig::from_bench_config(&config)?;
    let mut harness = BenchmarkHarness::new(trial);
    let metrics = if config.telemetry.emit_metrics {
        let recorder = MetricsRecorder::new()?;
        harness = harness.with_metrics(recorder.clone());
        Some(recorder)
    } else {
        None
    };

    let result = harness.run()?;
    println!("{}", result);

    if let Some(metrics) = metrics {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

pub fn show_plan(args: PlanArgs) -> CliResult {
    EventLogger::init("warn");

    let mut overrides = Overrides::default();
    overrides.topology.placement = args.placement.clone();
    let topology_config = BenchConfig::load_topology(args.config.as_deref(), &overrides)?;
    let topology = topology_config.topology()?;
    let placement = ThreadPlacement::plan(&topology, topology_config.placement, args.threads);

    println!(
        "placement: {} (zones={}, slots per zone={}, sibling distance={})",
        placement.policy(),
        topology.zone_count(),
        topology.zone_slots(),
        topology.sibling_distance()
    );
    for (index, core) in placement.iter() {
        match core {
            Some(core) => println!("worker {:>4} -> core {}", index, core),
            None => println!("worker {:>4} -> unpinned", index),
        }
    }
    Ok(())
}
