//! Per-slice directed graphs of bursting relationships.
//!
//! Every snapshot shares one node set: all endpoints of all keys, so a node
//! that is quiet in a slice still shows up with degree 0. The node-only
//! graph is built once and cloned per slice; a slice then gains the edge
//! `source -> target` for every key whose burst level inside the slice is
//! above baseline. Keys sharing both endpoints (`alice emails bob`,
//! `alice calls bob`) collapse into a single edge.

use super::slicer::TimeSlice;
use eb_common::{BurstHierarchy, EdgeKey};
use eb_config::DegreeMode;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Edge weight: the bursting keys behind an edge and their highest level.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdge<K> {
    /// In key order.
    pub keys: Vec<K>,
    pub level: u32,
}

impl<K> ActiveEdge<K> {
    fn merge(&mut self, key: K, level: u32) {
        self.keys.push(key);
        self.level = self.level.max(level);
    }
}

/// Node-only template plus the node → index lookup shared by all snapshots.
#[derive(Debug, Clone)]
pub struct GraphSnapshotBuilder<K: EdgeKey> {
    template: DiGraph<K::Node, ActiveEdge<K>>,
    index: Arc<BTreeMap<K::Node, NodeIndex>>,
}

impl<K: EdgeKey> GraphSnapshotBuilder<K> {
    /// Collect every endpoint of `keys`; nodes are inserted in sorted order.
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a K>) -> Self
    where
        K: 'a,
    {
        let mut nodes: BTreeMap<K::Node, NodeIndex> = BTreeMap::new();
        for key in keys {
            nodes.insert(key.source(), NodeIndex::end());
            nodes.insert(key.target(), NodeIndex::end());
        }

        let mut template = DiGraph::with_capacity(nodes.len(), 0);
        for (node, idx) in nodes.iter_mut() {
            *idx = template.add_node(node.clone());
        }

        Self {
            template,
            index: Arc::new(nodes),
        }
    }

    pub fn node_count(&self) -> usize {
        self.template.node_count()
    }

    /// Build the snapshot for one slice.
    ///
    /// Keys missing from `hierarchies` (e.g. skipped by a batch) never
    /// produce an edge.
    pub fn build(
        &self,
        hierarchies: &BTreeMap<K, BurstHierarchy>,
        slice: &TimeSlice,
    ) -> GraphSnapshot<K> {
        let mut graph = self.template.clone();
        for (key, hierarchy) in hierarchies {
            let level = hierarchy.max_level_in(slice.lower, slice.upper);
            if level == 0 {
                continue;
            }
            let (Some(&from), Some(&to)) = (
                self.index.get(&key.source()),
                self.index.get(&key.target()),
            ) else {
                continue;
            };
            match graph.find_edge(from, to) {
                Some(edge) => graph[edge].merge(key.clone(), level),
                None => {
                    graph.add_edge(
                        from,
                        to,
                        ActiveEdge {
                            keys: vec![key.clone()],
                            level,
                        },
                    );
                }
            }
        }

        tracing::trace!(
            event = crate::logging::event_names::SNAPSHOT_BUILT,
            slice = slice.index,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Snapshot built"
        );

        GraphSnapshot {
            slice: slice.clone(),
            graph,
            index: Arc::clone(&self.index),
        }
    }
}

/// Directed graph of the relationships bursting within one slice.
#[derive(Debug, Clone)]
pub struct GraphSnapshot<K: EdgeKey> {
    pub slice: TimeSlice,
    graph: DiGraph<K::Node, ActiveEdge<K>>,
    index: Arc<BTreeMap<K::Node, NodeIndex>>,
}

impl<K: EdgeKey> GraphSnapshot<K> {
    pub fn graph(&self) -> &DiGraph<K::Node, ActiveEdge<K>> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &K::Node> {
        self.index.keys()
    }

    /// Active edges as `(source, target, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (&K::Node, &K::Node, &ActiveEdge<K>)> {
        self.graph.raw_edges().iter().map(move |e| {
            (
                &self.graph[e.source()],
                &self.graph[e.target()],
                &e.weight,
            )
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.graph
            .raw_edges()
            .iter()
            .any(|e| e.weight.keys.contains(key))
    }

    /// Degree of `node`; `None` if the node is not in the graph.
    ///
    /// A self-loop counts once in each direction.
    pub fn degree(&self, node: &K::Node, mode: DegreeMode) -> Option<usize> {
        self.index.get(node).map(|&idx| self.degree_at(idx, mode))
    }

    /// `(node, degree)` for every node, in node order.
    pub fn degrees(&self, mode: DegreeMode) -> Vec<(K::Node, usize)> {
        self.index
            .iter()
            .map(|(node, &idx)| (node.clone(), self.degree_at(idx, mode)))
            .collect()
    }

    fn degree_at(&self, idx: NodeIndex, mode: DegreeMode) -> usize {
        let count = |dir| self.graph.edges_directed(idx, dir).count();
        match mode {
            DegreeMode::In => count(Direction::Incoming),
            DegreeMode::Out => count(Direction::Outgoing),
            DegreeMode::Total => count(Direction::Incoming) + count(Direction::Outgoing),
        }
    }
}
