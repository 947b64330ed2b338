//! Temporal view of burst results.
//!
//! ```text
//! OffsetStore ──► TimeSlicer ──► [TimeSlice]
//!                                    │
//! hierarchies ──► GraphSnapshotBuilder ──► [GraphSnapshot] ──► DegreeRanker
//! ```

pub mod ranking;
pub mod slicer;
pub mod snapshot;

pub use ranking::{DegreeRanker, DegreeRanking, RankedNode, SliceRanking};
pub use slicer::{SliceLabels, TimeSlice, TimeSlicer};
pub use snapshot::{ActiveEdge, GraphSnapshot, GraphSnapshotBuilder};

use crate::logging::event_names;
use eb_common::{BurstHierarchy, EdgeKey};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One snapshot per slice, built in parallel and returned in slice order.
pub fn build_snapshots<K: EdgeKey>(
    builder: &GraphSnapshotBuilder<K>,
    hierarchies: &BTreeMap<K, BurstHierarchy>,
    slices: &[TimeSlice],
) -> Vec<GraphSnapshot<K>> {
    slices
        .par_iter()
        .map(|slice| builder.build(hierarchies, slice))
        .collect()
}

/// Rank every slice's snapshot.
///
/// Snapshots are built and ranked per slice on the rayon pool; nothing but
/// the ranking is kept.
pub fn rank_over_time<K: EdgeKey>(
    builder: &GraphSnapshotBuilder<K>,
    hierarchies: &BTreeMap<K, BurstHierarchy>,
    slices: &[TimeSlice],
    ranker: &DegreeRanker,
) -> DegreeRanking<K::Node> {
    let ranked: Vec<SliceRanking<K::Node>> = slices
        .par_iter()
        .map(|slice| {
            let snapshot = builder.build(hierarchies, slice);
            SliceRanking {
                slice: slice.clone(),
                ranked: ranker.rank(&snapshot),
            }
        })
        .collect();

    tracing::info!(
        event = event_names::RANKING_FINISHED,
        slices = ranked.len(),
        nodes = builder.node_count(),
        mode = %ranker.mode(),
        top_k = ranker.top_k(),
        "Degree ranking finished"
    );

    DegreeRanking {
        mode: ranker.mode(),
        top_k: ranker.top_k(),
        slices: ranked,
    }
}
