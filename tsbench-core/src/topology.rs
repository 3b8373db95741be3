//! ## tsbench-core::topology
//! **Thread index to core id placement**
//!
//! The host is described by `zone_count` NUMA zones, `zone_slots` logical
//! threads per zone, and the `sibling_distance` between a core id and its
//! hyperthread sibling. Logical ids below `sibling_distance` are first
//! siblings, interleaved across zones (`core % zone_count == zone`), and
//! `core + sibling_distance` is the second sibling of `core`.
//!
//! Placement runs once, before any worker exists, and is read-only afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How worker indices are spread over the topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// No pinning; the scheduler decides.
    #[default]
    Unpinned,
    /// Walk a zone's first siblings, then its second siblings, then move on
    /// to the next zone.
    ZoneSaturateFirst,
    /// Place each physical core's two siblings back to back, zone by zone.
    PairSaturateFirst,
}

impl PlacementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementPolicy::Unpinned => "unpinned",
            PlacementPolicy::ZoneSaturateFirst => "zone_saturate_first",
            PlacementPolicy::PairSaturateFirst => "pair_saturate_first",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware layout the planner maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    zone_count: usize,
    zone_slots: usize,
    sibling_distance: usize,
}

impl Topology {
    pub const DEFAULT_ZONE_COUNT: usize = 4;
    pub const DEFAULT_ZONE_SLOTS: usize = 48;
    pub const DEFAULT_SIBLING_DISTANCE: usize = 96;

    pub fn new(
        zone_count: usize,
        zone_slots: usize,
        sibling_distance: usize,
    ) -> Result<Self, CoreError> {
        if zone_count == 0 || zone_slots == 0 || sibling_distance == 0 {
            return Err(CoreError::InvalidTopology(
                "zone count, zone slots and sibling distance must be positive".into(),
            ));
        }
        if sibling_distance % zone_count != 0 {
            return Err(CoreError::InvalidTopology(format!(
                "sibling distance {} is not divisible by zone count {}",
                sibling_distance, zone_count
            )));
        }
        let physical = sibling_distance / zone_count;
        if zone_slots > 2 * physical {
            return Err(CoreError::InvalidTopology(format!(
                "{} slots per zone exceed two siblings on each of {} physical cores",
                zone_slots, physical
            )));
        }
        Ok(Self {
            zone_count,
            zone_slots,
            sibling_distance,
        })
    }

    pub fn zone_count(&self) -> usize {
        self.zone_count
    }

    pub fn zone_slots(&self) -> usize {
        self.zone_slots
    }

    pub fn sibling_distance(&self) -> usize {
        self.sibling_distance
    }

    /// Number of thread indices that can receive a core.
    pub fn capacity(&self) -> usize {
        self.zone_count * self.zone_slots
    }

    fn physical_per_zone(&self) -> usize {
        self.sibling_distance / self.zone_count
    }

    /// Core id for `index` under `policy`, or `None` when the policy does not
    /// pin or the index is beyond [`Topology::capacity`].
    pub fn core_for(&self, policy: PlacementPolicy, index: usize) -> Option<usize> {
        if index >= self.capacity() {
            return None;
        }
        let zone = index / self.zone_slots;
        let local = index % self.zone_slots;

        match policy {
            PlacementPolicy::Unpinned => None,
            PlacementPolicy::ZoneSaturateFirst => {
                let physical = self.physical_per_zone();
                let sibling = local / physical;
                Some((local % physical) * self.zone_count + zone + sibling * self.sibling_distance)
            }
            PlacementPolicy::PairSaturateFirst => {
                let sibling = local % 2;
                Some((local / 2) * self.zone_count + zone + sibling * self.sibling_distance)
            }
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            zone_count: Self::DEFAULT_ZONE_COUNT,
            zone_slots: Self::DEFAULT_ZONE_SLOTS,
            sibling_distance: Self::DEFAULT_SIBLING_DISTANCE,
        }
    }
}

/// Core assignment for every worker of one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPlacement {
    policy: PlacementPolicy,
    cores: Vec<Option<usize>>,
}

impl ThreadPlacement {
    pub fn plan(topology: &Topology, policy: PlacementPolicy, thread_count: usize) -> Self {
        let cores = (0..thread_count)
            .map(|index| topology.core_for(policy, index))
            .collect();
        Self { policy, cores }
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn core_for(&self, index: usize) -> Option<usize> {
        self.cores.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
        self.cores.iter().copied().enumerate()
    }

    /// Indices a pinning policy could not place because the topology is full.
    pub fn overflow(&self) -> impl Iterator<Item = usize> + '_ {
        let pinning = self.policy != PlacementPolicy::Unpinned;
        self.cores
            .iter()
            .enumerate()
            .filter(move |(_, core)| pinning && core.is_none())
            .map(|(index, _)| index)
    }
}
