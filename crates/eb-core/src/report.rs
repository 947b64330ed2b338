//! Burst report bundle and export helpers.
//!
//! A [`BurstReport`] keeps everything one detection run produced together:
//! the input store, the hierarchy per key, the parameters, and the keys that
//! were skipped. Export is done by free functions over the report so callers
//! pick only the shape they need.

use crate::burst::{BatchOutcome, SkippedKey};
use eb_common::{BurstHierarchy, BurstParams, OffsetStore, StructuredError, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result of detecting bursts over one offset store.
#[derive(Debug, Clone)]
pub struct BurstReport<K: Ord> {
    pub params: BurstParams,
    pub store: OffsetStore<K>,
    pub hierarchies: BTreeMap<K, BurstHierarchy>,
    pub skipped: Vec<SkippedKey<K>>,
    /// Detection stopped early; `hierarchies` is partial.
    pub cancelled: bool,
}

impl<K: Ord + fmt::Debug> BurstReport<K> {
    pub fn new(params: BurstParams, store: OffsetStore<K>, outcome: BatchOutcome<K>) -> Self {
        Self {
            params,
            store,
            hierarchies: outcome.hierarchies,
            skipped: outcome.skipped,
            cancelled: outcome.cancelled,
        }
    }

    pub fn from_svos(&self) -> bool {
        self.store.from_svos()
    }

    pub fn hierarchy(&self, key: &K) -> Option<&BurstHierarchy> {
        self.hierarchies.get(key)
    }

    /// Hierarchies keyed by display label.
    pub fn rendered_bursts(&self) -> BTreeMap<String, BurstHierarchy> {
        self.hierarchies
            .iter()
            .map(|(k, h)| (self.store.label(k), h.clone()))
            .collect()
    }

    /// Serializable form with every key rendered through the label lookup.
    pub fn render(&self) -> RenderedReport {
        RenderedReport {
            schema_version: SCHEMA_VERSION.to_string(),
            params: self.params,
            from_svos: self.from_svos(),
            offsets: self.store.rendered(),
            bursts: self.rendered_bursts(),
            skipped: self
                .skipped
                .iter()
                .map(|s| RenderedSkip {
                    key: s.label.clone(),
                    error: s.error.clone(),
                })
                .collect(),
            cancelled: self.cancelled,
        }
    }
}

/// [`BurstReport`] with labels in place of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedReport {
    pub schema_version: String,
    pub params: BurstParams,
    pub from_svos: bool,
    pub offsets: BTreeMap<String, Vec<f64>>,
    pub bursts: BTreeMap<String, BurstHierarchy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<RenderedSkip>,
    #[serde(default)]
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSkip {
    pub key: String,
    pub error: StructuredError,
}

/// One flat row per burst interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstRow {
    pub key: String,
    pub level: u32,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Flatten a report into rows, ordered by key then start.
///
/// With `nested`, rows are the nested bursts (levels `>= 1` only) instead
/// of the flat interval sequence.
pub fn burst_rows<K: Ord + fmt::Debug>(report: &BurstReport<K>, nested: bool) -> Vec<BurstRow> {
    let mut rows = Vec::new();
    for (key, hierarchy) in &report.hierarchies {
        let label = report.store.label(key);
        if nested {
            rows.extend(hierarchy.nested().into_iter().map(|b| BurstRow {
                key: label.clone(),
                level: b.level,
                start: b.start,
                end: b.end,
                duration: b.end - b.start,
            }));
        } else {
            rows.extend(hierarchy.intervals().iter().map(|iv| BurstRow {
                key: label.clone(),
                level: iv.level,
                start: iv.start,
                end: iv.end,
                duration: iv.duration(),
            }));
        }
    }
    rows
}
