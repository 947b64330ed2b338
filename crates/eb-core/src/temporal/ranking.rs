//! Top-k degree ranking per snapshot.

use super::slicer::TimeSlice;
use super::snapshot::GraphSnapshot;
use eb_common::{EdgeKey, Error, Result};
use eb_config::{DegreeMode, RankSettings};
use serde::Serialize;

/// A node and its degree in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedNode<N> {
    pub node: N,
    pub degree: usize,
}

/// Ranks snapshot nodes by degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeRanker {
    mode: DegreeMode,
    top_k: usize,
}

impl DegreeRanker {
    pub fn new(mode: DegreeMode, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::invalid_parameter("top_k", top_k, "must be at least 1"));
        }
        Ok(Self { mode, top_k })
    }

    /// Parse the mode from a string (`in`, `out`, `total` and aliases).
    pub fn parse(mode: &str, top_k: usize) -> Result<Self> {
        Self::new(mode.parse()?, top_k)
    }

    pub fn from_settings(settings: &RankSettings) -> Result<Self> {
        Self::new(settings.mode, settings.top_k)
    }

    pub fn mode(&self) -> DegreeMode {
        self.mode
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The `top_k` highest-degree nodes.
    ///
    /// Ordered by degree descending, then node ascending, so ties resolve
    /// the same way on every run.
    pub fn rank<K: EdgeKey>(&self, snapshot: &GraphSnapshot<K>) -> Vec<RankedNode<K::Node>> {
        let mut ranked: Vec<RankedNode<K::Node>> = snapshot
            .degrees(self.mode)
            .into_iter()
            .map(|(node, degree)| RankedNode { node, degree })
            .collect();
        ranked.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.node.cmp(&b.node)));
        ranked.truncate(self.top_k);
        ranked
    }
}

/// Ranking for one slice.
#[derive(Debug, Clone, Serialize)]
pub struct SliceRanking<N> {
    pub slice: TimeSlice,
    pub ranked: Vec<RankedNode<N>>,
}

/// Rankings for every slice, in slice order.
#[derive(Debug, Clone, Serialize)]
pub struct DegreeRanking<N> {
    pub mode: DegreeMode,
    pub top_k: usize,
    pub slices: Vec<SliceRanking<N>>,
}

impl<N> DegreeRanking<N> {
    /// Ranking for the slice with the given label (first match).
    pub fn get(&self, label: &str) -> Option<&[RankedNode<N>]> {
        self.slices
            .iter()
            .find(|s| s.slice.label == label)
            .map(|s| s.ranked.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|s| s.slice.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}
