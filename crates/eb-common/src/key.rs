//! Relationship keys.
//!
//! A key identifies a directed relationship whose timestamped occurrences
//! are analyzed for bursts. Burst detection only needs keys to be ordered;
//! graph snapshots additionally read the first and last endpoint through
//! [`EdgeKey`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key that can be drawn as a directed edge `source -> target`.
pub trait EdgeKey: Ord + Clone + Send + Sync {
    /// Node identity type.
    type Node: Ord + Clone + Send + Sync + fmt::Debug;

    /// First endpoint of the relationship.
    fn source(&self) -> Self::Node;

    /// Last endpoint of the relationship.
    fn target(&self) -> Self::Node;
}

impl<N> EdgeKey for (N, N)
where
    N: Ord + Clone + Send + Sync + fmt::Debug,
{
    type Node = N;

    fn source(&self) -> N {
        self.0.clone()
    }

    fn target(&self) -> N {
        self.1.clone()
    }
}

/// Subject-verb-object style triple; the middle element labels the edge.
impl<N, V> EdgeKey for (N, V, N)
where
    N: Ord + Clone + Send + Sync + fmt::Debug,
    V: Ord + Clone + Send + Sync,
{
    type Node = N;

    fn source(&self) -> N {
        self.0.clone()
    }

    fn target(&self) -> N {
        self.2.clone()
    }
}

/// Non-empty sequence of terms, e.g. `["alice", "emails", "bob"]`.
///
/// Used where keys arrive from files: a pair, a triple or any longer path
/// all map onto an edge from the first term to the last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Create a key path, rejecting an empty term list.
    pub fn new(terms: Vec<String>) -> Option<Self> {
        if terms.is_empty() {
            None
        } else {
            Some(Self(terms))
        }
    }

    /// Terms in order.
    pub fn terms(&self) -> &[String] {
        &self.0
    }

    fn first(&self) -> &String {
        &self.0[0]
    }

    fn last(&self) -> &String {
        &self.0[self.0.len() - 1]
    }
}

impl TryFrom<Vec<String>> for KeyPath {
    type Error = String;

    fn try_from(terms: Vec<String>) -> Result<Self, Self::Error> {
        KeyPath::new(terms).ok_or_else(|| "key must contain at least one term".to_string())
    }
}

impl From<KeyPath> for Vec<String> {
    fn from(path: KeyPath) -> Self {
        path.0
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    /// Panics when `N == 0`; intended for literals.
    fn from(terms: [&str; N]) -> Self {
        assert!(N > 0, "key must contain at least one term");
        KeyPath(terms.iter().map(|t| t.to_string()).collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" -> "))
    }
}

impl EdgeKey for KeyPath {
    type Node = String;

    fn source(&self) -> String {
        self.first().clone()
    }

    fn target(&self) -> String {
        self.last().clone()
    }
}
