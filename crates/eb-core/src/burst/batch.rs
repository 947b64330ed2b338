//! Burst detection across every key of an [`OffsetStore`].
//!
//! Keys are independent, so the batch fans them out over the rayon pool and
//! then folds the results back in key order. Folding in key order keeps the
//! outcome (including which error aborts a batch) independent of scheduling.

use super::detector::{BurstDetector, DetectorConfig};
use crate::logging::event_names;
use eb_common::{BurstHierarchy, BurstParams, Error, OffsetStore, Result};
use eb_config::{AnalysisConfig, BatchErrorPolicy};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and a running batch.
///
/// Checked before each key starts; keys already in flight finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A key left out of the results under [`BatchErrorPolicy::Skip`].
#[derive(Debug, Clone, Serialize)]
pub struct SkippedKey<K> {
    pub key: K,
    pub label: String,
    pub error: eb_common::StructuredError,
}

/// Result of one batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome<K: Ord> {
    pub hierarchies: BTreeMap<K, BurstHierarchy>,
    pub skipped: Vec<SkippedKey<K>>,
    /// The run was cancelled; `hierarchies` holds only the keys that finished.
    pub cancelled: bool,
}

impl<K: Ord> BatchOutcome<K> {
    fn empty() -> Self {
        Self {
            hierarchies: BTreeMap::new(),
            skipped: Vec::new(),
            cancelled: false,
        }
    }
}

/// Runs one [`BurstDetector`] over many keys.
#[derive(Debug, Clone)]
pub struct BurstBatch {
    detector: BurstDetector,
    on_error: BatchErrorPolicy,
    parallel: bool,
}

impl BurstBatch {
    pub fn new(detector: BurstDetector) -> Self {
        Self {
            detector,
            on_error: BatchErrorPolicy::Abort,
            parallel: true,
        }
    }

    /// Build from a loaded configuration.
    ///
    /// Fails with `InvalidParameter` if the config lists several values for
    /// `s` or `gamma`.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let detector = BurstDetector::new(
            config.burst.params()?,
            DetectorConfig::from(&config.burst),
        )?;
        Ok(Self::new(detector)
            .with_error_policy(config.batch.on_error)
            .with_parallel(config.batch.parallel))
    }

    pub fn with_error_policy(mut self, on_error: BatchErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn params(&self) -> BurstParams {
        self.detector.params()
    }

    pub fn detector(&self) -> &BurstDetector {
        &self.detector
    }

    /// Detect bursts for every key.
    pub fn run<K>(&self, store: &OffsetStore<K>) -> Result<BatchOutcome<K>>
    where
        K: Ord + Clone + Send + Sync + fmt::Debug,
    {
        self.run_with_cancel(store, &CancelToken::new())
    }

    /// Detect bursts for every key, stopping early once `token` is cancelled.
    ///
    /// An empty store yields an empty outcome.
    pub fn run_with_cancel<K>(
        &self,
        store: &OffsetStore<K>,
        token: &CancelToken,
    ) -> Result<BatchOutcome<K>>
    where
        K: Ord + Clone + Send + Sync + fmt::Debug,
    {
        let params = self.detector.params();
        tracing::info!(
            event = event_names::BATCH_STARTED,
            keys = store.len(),
            events = store.event_count(),
            s = params.s,
            gamma = params.gamma,
            parallel = self.parallel,
            "Burst batch started"
        );

        if store.is_empty() {
            return Ok(BatchOutcome::empty());
        }

        let entries: Vec<(&K, &[f64])> = store.iter().collect();
        let detect_one = |(key, offsets): &(&K, &[f64])| -> Option<Result<BurstHierarchy>> {
            if token.is_cancelled() {
                return None;
            }
            Some(self.detector.detect_key(&store.label(key), offsets))
        };

        let results: Vec<Option<Result<BurstHierarchy>>> = if self.parallel {
            entries.par_iter().map(detect_one).collect()
        } else {
            entries.iter().map(detect_one).collect()
        };

        let mut outcome = BatchOutcome::empty();
        for ((key, _), result) in entries.into_iter().zip(results) {
            match result {
                None => outcome.cancelled = true,
                Some(Ok(hierarchy)) => {
                    outcome.hierarchies.insert(key.clone(), hierarchy);
                }
                Some(Err(err)) => self.handle_failure(store, key, err, &mut outcome)?,
            }
        }

        if outcome.cancelled {
            tracing::warn!(
                event = event_names::BATCH_CANCELLED,
                completed = outcome.hierarchies.len(),
                keys = store.len(),
                "Burst batch cancelled"
            );
        } else {
            tracing::info!(
                event = event_names::BATCH_COMPLETED,
                keys = outcome.hierarchies.len(),
                skipped = outcome.skipped.len(),
                "Burst batch completed"
            );
        }

        Ok(outcome)
    }

    fn handle_failure<K>(
        &self,
        store: &OffsetStore<K>,
        key: &K,
        err: Error,
        outcome: &mut BatchOutcome<K>,
    ) -> Result<()>
    where
        K: Ord + Clone + fmt::Debug,
    {
        let label = store.label(key);
        match self.on_error {
            BatchErrorPolicy::Abort => {
                tracing::error!(
                    event = event_names::BATCH_ABORTED,
                    key = %label,
                    error = %err,
                    "Burst batch aborted"
                );
                Err(err)
            }
            BatchErrorPolicy::Skip => {
                tracing::warn!(
                    event = event_names::KEY_SKIPPED,
                    key = %label,
                    error = %err,
                    "Skipping key"
                );
                outcome.skipped.push(SkippedKey {
                    key: key.clone(),
                    label,
                    error: err.to_structured(),
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eb_common::BurstInterval;

    fn store() -> OffsetStore<(&'static str, &'static str)> {
        vec![
            (("a", "b"), vec![0.0, 1.0, 2.0, 3.0, 20.0, 21.0, 22.0, 23.0]),
            (("a", "c"), vec![0.0, 5.0, 10.0, 15.0]),
            (("b", "c"), vec![7.0]),
        ]
        .into_iter()
        .collect()
    }

    fn batch() -> BurstBatch {
        BurstBatch::new(BurstDetector::with_params(BurstParams::default()).unwrap())
    }

    #[test]
    fn test_abort_policy_returns_key_error() {
        let err = batch().run(&store()).unwrap_err();
        match err {
            Error::InsufficientData { subject, .. } => assert!(subject.contains("\"b\"")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_skip_policy_records_failures() {
        let outcome = batch()
            .with_error_policy(BatchErrorPolicy::Skip)
            .run(&store())
            .unwrap();
        assert_eq!(outcome.hierarchies.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].key, ("b", "c"));
        assert_eq!(outcome.skipped[0].error.kind, "insufficient_data");
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let b = batch().with_error_policy(BatchErrorPolicy::Skip);
        let par = b.clone().with_parallel(true).run(&store()).unwrap();
        let seq = b.with_parallel(false).run(&store()).unwrap();
        assert_eq!(par.hierarchies, seq.hierarchies);
    }

    #[test]
    fn test_keys_are_independent() {
        let full = batch()
            .with_error_policy(BatchErrorPolicy::Skip)
            .run(&store())
            .unwrap();
        let single: OffsetStore<(&str, &str)> =
            vec![(("a", "c"), vec![0.0, 5.0, 10.0, 15.0])].into_iter().collect();
        let alone = batch().run(&single).unwrap();
        assert_eq!(
            full.hierarchies.get(&("a", "c")),
            alone.hierarchies.get(&("a", "c"))
        );
        assert_eq!(
            alone.hierarchies[&("a", "c")].intervals(),
            &[BurstInterval::new(0, 0.0, 15.0)]
        );
    }

    #[test]
    fn test_cancelled_before_start_returns_nothing() {
        let token = CancelToken::new();
        token.cancel();
        let outcome = batch().run_with_cancel(&store(), &token).unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.hierarchies.is_empty());
    }

    #[test]
    fn test_empty_store_is_empty_outcome() {
        let empty: OffsetStore<(&str, &str)> = OffsetStore::new();
        let outcome = batch().run(&empty).unwrap();
        assert!(outcome.hierarchies.is_empty());
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_from_config_rejects_parameter_lists() {
        let mut config = AnalysisConfig::default();
        config.burst.gamma = eb_config::ParamValue::Many(vec![0.5, 1.0]);
        let err = BurstBatch::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }
}
