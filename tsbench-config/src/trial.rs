//! Trial configuration.
//!
//! Describes a single measured run: how much work, how many workers, and which
//! timestamp source they hammer. Counts have no defaults; a trial must name
//! them explicitly.

use serde::{Deserialize, Serialize};
use tsbench_core::timestamp::SourceVariant;
use tsbench_core::work::CountMode;
use validator::Validate;

/// Parameters of one benchmark trial.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TrialSettings {
    /// Number of `advance` calls, total or per worker depending on `count_mode`.
    #[validate(
        required(message = "operation_count must be set"),
        range(min = 1, message = "operation_count must be greater than 0")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_count: Option<u64>,

    /// Number of worker threads.
    #[validate(
        required(message = "thread_count must be set"),
        range(min = 1, message = "thread_count must be greater than 0")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<usize>,

    /// Timestamp source exercised by the workers.
    #[validate(required(message = "source must be set"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceVariant>,

    /// Whether `operation_count` is the trial total or each worker's share.
    #[serde(default)]
    pub count_mode: CountMode,
}
