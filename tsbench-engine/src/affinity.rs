//! Core pinning for worker threads.
//!
//! Placement problems are never fatal: a worker whose core cannot be used
//! runs wherever the scheduler puts it, and a warning says so.

use core_affinity::CoreId;
use tracing::warn;
use tsbench_core::topology::ThreadPlacement;

/// Logical core ids this process may run on, if the OS reports them.
pub(crate) fn host_cores() -> Option<Vec<usize>> {
    core_affinity::get_core_ids().map(|ids| ids.into_iter().map(|core| core.id).collect())
}

/// Checks every planned core against the host and drops the unusable ones.
pub(crate) fn resolve(placement: &ThreadPlacement, host: Option<&[usize]>) -> Vec<Option<usize>> {
    let overflow: Vec<usize> = placement.overflow().collect();
    if let (Some(&first), Some(&last)) = (overflow.first(), overflow.last()) {
        warn!(
            first_worker = first,
            last_worker = last,
            policy = %placement.policy(),
            "Topology has no core for these workers; running them unpinned"
        );
    }

    placement
        .iter()
        .map(|(index, core)| {
            let core = core?;
            match host {
                Some(available) if available.contains(&core) => Some(core),
                Some(_) => {
                    warn!(
                        worker = index,
                        core, "Core id not present on this host; running unpinned"
                    );
                    None
                }
                None => {
                    warn!(
                        worker = index,
                        core, "Host core list unavailable; running unpinned"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Pins the calling thread. Returns whether the OS accepted the request.
pub(crate) fn pin_current_thread(index: usize, core: usize) -> bool {
    let pinned = core_affinity::set_for_current(CoreId { id: core });
    if !pinned {
        warn!(
            worker = index,
            core, "Failed to set thread affinity; running unpinned"
        );
    }
    pinned
}
