//! Host topology and placement configuration.
//!
//! Defaults describe the four-zone, 192-thread machine the benchmark was
//! tuned on: 48 logical threads per zone, siblings 96 ids apart.

use serde::{Deserialize, Serialize};
use tsbench_core::topology::{PlacementPolicy, Topology};
use tsbench_core::CoreError;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TopologyConfig {
    /// Number of NUMA zones.
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_zone_count")]
    pub zone_count: usize,

    /// Logical threads available in each zone.
    #[validate(range(min = 1, max = 1024))]
    #[serde(default = "default_zone_slots")]
    pub zone_slots: usize,

    /// Distance between a core id and its hyperthread sibling.
    #[validate(range(min = 1, max = 8192))]
    #[serde(default = "default_sibling_distance")]
    pub sibling_distance: usize,

    /// Placement policy for worker threads.
    #[serde(default)]
    pub placement: PlacementPolicy,
}

fn default_zone_count() -> usize {
    Topology::DEFAULT_ZONE_COUNT
}

fn default_zone_slots() -> usize {
    Topology::DEFAULT_ZONE_SLOTS
}

fn default_sibling_distance() -> usize {
    Topology::DEFAULT_SIBLING_DISTANCE
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            zone_count: default_zone_count(),
            zone_slots: default_zone_slots(),
            sibling_distance: default_sibling_distance(),
            placement: PlacementPolicy::default(),
        }
    }
}

impl TopologyConfig {
    /// Builds the planner's topology, checking that the values fit together.
    pub fn topology(&self) -> Result<Topology, CoreError> {
        Topology::new(self.zone_count, self.zone_slots, self.sibling_distance)
    }
}
