//! End-to-end analysis: bursts per key, then degree ranking over time.

use crate::burst::{BurstBatch, CancelToken};
use crate::logging::Stage;
use crate::report::BurstReport;
use crate::temporal::{
    build_snapshots, rank_over_time, DegreeRanker, DegreeRanking, GraphSnapshot,
    GraphSnapshotBuilder, TimeSlice, TimeSlicer,
};
use eb_common::{EdgeKey, OffsetStore, Result};
use eb_config::AnalysisConfig;
use std::fmt;

/// Holds the configured components and runs them in order.
#[derive(Debug, Clone)]
pub struct Analyzer {
    batch: BurstBatch,
    slicer: TimeSlicer,
    ranker: DegreeRanker,
}

impl Analyzer {
    pub fn new(batch: BurstBatch, slicer: TimeSlicer, ranker: DegreeRanker) -> Self {
        Self {
            batch,
            slicer,
            ranker,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self::new(
            BurstBatch::from_config(config)?,
            TimeSlicer::from_settings(&config.slicing)?,
            DegreeRanker::from_settings(&config.ranking)?,
        ))
    }

    pub fn batch(&self) -> &BurstBatch {
        &self.batch
    }

    pub fn slicer(&self) -> &TimeSlicer {
        &self.slicer
    }

    pub fn ranker(&self) -> &DegreeRanker {
        &self.ranker
    }

    /// Detect bursts for every key of `store`.
    pub fn detect_bursts<K>(&self, store: OffsetStore<K>) -> Result<BurstReport<K>>
    where
        K: Ord + Clone + Send + Sync + fmt::Debug,
    {
        self.detect_bursts_with_cancel(store, &CancelToken::new())
    }

    pub fn detect_bursts_with_cancel<K>(
        &self,
        store: OffsetStore<K>,
        token: &CancelToken,
    ) -> Result<BurstReport<K>>
    where
        K: Ord + Clone + Send + Sync + fmt::Debug,
    {
        let _span = tracing::info_span!("stage", stage = %Stage::Detect).entered();
        let outcome = self.batch.run_with_cancel(&store, token)?;
        Ok(BurstReport::new(self.batch.params(), store, outcome))
    }

    /// Slices over the report's global time range.
    pub fn slices<K: Ord + fmt::Debug>(&self, report: &BurstReport<K>) -> Result<Vec<TimeSlice>> {
        let _span = tracing::debug_span!("stage", stage = %Stage::Slice).entered();
        self.slicer.slice_store(&report.store)
    }

    /// One graph per slice, keyed on every endpoint in the store.
    pub fn snapshots<K>(&self, report: &BurstReport<K>) -> Result<Vec<GraphSnapshot<K>>>
    where
        K: EdgeKey + fmt::Debug,
    {
        let slices = self.slices(report)?;
        let _span = tracing::debug_span!("stage", stage = %Stage::Snapshot).entered();
        let builder = GraphSnapshotBuilder::new(report.store.keys());
        Ok(build_snapshots(&builder, &report.hierarchies, &slices))
    }

    /// Top-k degree ranking for each slice.
    pub fn degree_over_time<K>(&self, report: &BurstReport<K>) -> Result<DegreeRanking<K::Node>>
    where
        K: EdgeKey + fmt::Debug,
    {
        let slices = self.slices(report)?;
        let _span = tracing::info_span!("stage", stage = %Stage::Rank).entered();
        let builder = GraphSnapshotBuilder::new(report.store.keys());
        Ok(rank_over_time(
            &builder,
            &report.hierarchies,
            &slices,
            &self.ranker,
        ))
    }
}
