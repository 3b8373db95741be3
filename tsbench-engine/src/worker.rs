//! Worker routine: pin, arrive at the barrier, run the measured loop.

use std::hint::black_box;
use std::time::Instant;

use tsbench_core::barrier::SpinBarrier;
use tsbench_core::timestamp::TimestampSource;

use crate::affinity;
use crate::result::WorkerReport;

/// Fixed assignment handed to one worker before it is spawned.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerPlan {
    pub index: usize,
    pub core: Option<usize>,
    pub operations: u64,
}

/// Runs on the worker's own thread. Everything before
/// [`SpinBarrier::arrive_and_wait`] is setup and is not measured.
pub(crate) fn run<S: TimestampSource>(
    plan: WorkerPlan,
    source: &S,
    barrier: &SpinBarrier,
) -> WorkerReport {
    let core = plan
        .core
        .filter(|&core| affinity::pin_current_thread(plan.index, core));
    let mut local = S::Local::default();
    let mut last_timestamp = 0;

    barrier.arrive_and_wait();
    let released_at = Instant::now();

    for _ in 0..plan.operations {
        last_timestamp = black_box(source.advance(&mut local));
    }

    WorkerReport {
        index: plan.index,
        core,
        operations: plan.operations,
        released_at,
        last_timestamp,
    }
}
