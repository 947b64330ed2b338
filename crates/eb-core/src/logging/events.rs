//! Event names and pipeline stages attached to log records.

use serde::{Deserialize, Serialize};

/// Pipeline stages, recorded as the `stage` field on log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Configuration and input loading.
    Load,
    /// Per-key burst detection.
    Detect,
    /// Time slicing of the global range.
    Slice,
    /// Per-slice graph construction.
    Snapshot,
    /// Degree ranking.
    Rank,
    /// Report rendering.
    Export,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Load => "load",
            Stage::Detect => "detect",
            Stage::Slice => "slice",
            Stage::Snapshot => "snapshot",
            Stage::Rank => "rank",
            Stage::Export => "export",
        })
    }
}

/// Stable event names for the `event` field.
pub mod event_names {
    // Config/input
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const INPUT_LOADED: &str = "input.loaded";

    // Burst batch
    pub const BATCH_STARTED: &str = "batch.started";
    pub const BATCH_COMPLETED: &str = "batch.completed";
    pub const BATCH_CANCELLED: &str = "batch.cancelled";
    pub const BATCH_ABORTED: &str = "batch.aborted";
    pub const KEY_SKIPPED: &str = "batch.key_skipped";

    // Temporal analysis
    pub const SLICES_BUILT: &str = "slice.built";
    pub const SNAPSHOT_BUILT: &str = "snapshot.built";
    pub const RANKING_FINISHED: &str = "rank.finished";

    // Output
    pub const REPORT_WRITTEN: &str = "export.report_written";
}
