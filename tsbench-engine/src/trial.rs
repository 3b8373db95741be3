//! Validated, immutable description of one trial.

use tsbench_config::BenchConfig;
use tsbench_core::timestamp::SourceVariant;
use tsbench_core::topology::{PlacementPolicy, ThreadPlacement, Topology};
use tsbench_core::work::{CountMode, WorkSplit};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct TrialConfig {
    operation_count: u64,
    thread_count: usize,
    source: SourceVariant,
    count_mode: CountMode,
    placement: PlacementPolicy,
    topology: Topology,
}

impl TrialConfig {
    /// Total-count, unpinned trial on the default topology.
    pub fn new(
        operation_count: u64,
        thread_count: usize,
        source: SourceVariant,
    ) -> Result<Self, EngineError> {
        if operation_count == 0 {
            return Err(EngineError::InvalidTrial(
                "operation_count must be greater than 0".into(),
            ));
        }
        if thread_count == 0 {
            return Err(EngineError::InvalidTrial(
                "thread_count must be greater than 0".into(),
            ));
        }
        Ok(Self {
            operation_count,
            thread_count,
            source,
            count_mode: CountMode::default(),
            placement: PlacementPolicy::default(),
            topology: Topology::default(),
        })
    }

    /// Fails if the trial's total work does not fit in a `u64`.
    pub fn with_count_mode(mut self, count_mode: CountMode) -> Result<Self, EngineError> {
        self.count_mode = count_mode;
        if self.split().checked_total().is_none() {
            return Err(EngineError::InvalidTrial(format!(
                "{} operations per thread on {} threads overflows the operation total",
                self.operation_count, self.thread_count
            )));
        }
        Ok(self)
    }

    pub fn with_placement(mut self, placement: PlacementPolicy, topology: Topology) -> Self {
        self.placement = placement;
        self.topology = topology;
        self
    }

    /// Builds a trial from a loaded configuration, re-checking it first.
    pub fn from_bench_config(config: &BenchConfig) -> Result<Self, EngineError> {
        config.ensure_valid()?;

        let trial = &config.trial;
        let operation_count = trial
            .operation_count
            .ok_or_else(|| EngineError::InvalidTrial("operation_count is missing".into()))?;
        let thread_count = trial
            .thread_count
            .ok_or_else(|| EngineError::InvalidTrial("thread_count is missing".into()))?;
        let source = trial
            .source
            .ok_or_else(|| EngineError::InvalidTrial("source is missing".into()))?;
        let topology = config.topology.topology()?;

        Ok(Self::new(operation_count, thread_count, source)?
            .with_count_mode(trial.count_mode)?
            .with_placement(config.topology.placement, topology))
    }

    pub fn operation_count(&self) -> u64 {
        self.operation_count
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn source(&self) -> SourceVariant {
        self.source
    }

    pub fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    pub fn placement(&self) -> PlacementPolicy {
        self.placement
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn split(&self) -> WorkSplit {
        WorkSplit::new(self.operation_count, self.thread_count, self.count_mode)
    }

    pub fn plan_placement(&self) -> ThreadPlacement {
        ThreadPlacement::plan(&self.topology, self.placement, self.thread_count)
    }
}
