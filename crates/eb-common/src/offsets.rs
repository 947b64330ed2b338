//! Per-key event offsets.

use std::collections::BTreeMap;
use std::fmt;

/// Mapping from key to its ascending event timestamps.
///
/// Built once per dataset and read-only during detection. Also carries the
/// reverse lookup from keys to display labels and the flag recording whether
/// the data came from subject-verb-object extraction (which only changes how
/// labels are rendered downstream).
#[derive(Debug, Clone)]
pub struct OffsetStore<K: Ord> {
    offsets: BTreeMap<K, Vec<f64>>,
    labels: BTreeMap<K, String>,
    from_svos: bool,
}

impl<K: Ord> Default for OffsetStore<K> {
    fn default() -> Self {
        Self {
            offsets: BTreeMap::new(),
            labels: BTreeMap::new(),
            from_svos: false,
        }
    }
}

impl<K: Ord + fmt::Debug> OffsetStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the data as coming from subject-verb-object triples.
    pub fn with_svo_origin(mut self, from_svos: bool) -> Self {
        self.from_svos = from_svos;
        self
    }

    pub fn from_svos(&self) -> bool {
        self.from_svos
    }

    /// Add offsets for a key, merging with any already present.
    ///
    /// The stored sequence is kept sorted; duplicate timestamps are kept.
    pub fn insert(&mut self, key: K, offsets: impl IntoIterator<Item = f64>) {
        let entry = self.offsets.entry(key).or_default();
        entry.extend(offsets);
        entry.sort_by(|a, b| a.total_cmp(b));
    }

    /// Attach a human-readable label to a key.
    pub fn set_label(&mut self, key: K, label: impl Into<String>) {
        self.labels.insert(key, label.into());
    }

    /// Display label for a key: the registered label, else its debug form.
    pub fn label(&self, key: &K) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("{:?}", key))
    }

    pub fn get(&self, key: &K) -> Option<&[f64]> {
        self.offsets.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.offsets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[f64])> {
        self.offsets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Total number of timestamps across all keys.
    pub fn event_count(&self) -> usize {
        self.offsets.values().map(Vec::len).sum()
    }

    /// `(min, max)` over all timestamps, `None` when there are none.
    pub fn global_range(&self) -> Option<(f64, f64)> {
        self.offsets
            .values()
            .filter_map(|v| Some((*v.first()?, *v.last()?)))
            .fold(None, |acc, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((min, max)) => Some((min.min(lo), max.max(hi))),
            })
    }

    /// Offsets keyed by display label, for export.
    pub fn rendered(&self) -> BTreeMap<String, Vec<f64>> {
        self.offsets
            .iter()
            .map(|(k, v)| (self.label(k), v.clone()))
            .collect()
    }
}

impl<K: Ord + fmt::Debug> FromIterator<(K, Vec<f64>)> for OffsetStore<K> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<f64>)>>(iter: I) -> Self {
        let mut store = OffsetStore::new();
        for (key, offsets) in iter {
            store.insert(key, offsets);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sorts_and_merges() {
        let mut store = OffsetStore::new();
        store.insert("k", vec![3.0, 1.0]);
        store.insert("k", vec![2.0, 1.0]);
        assert_eq!(store.get(&"k"), Some(&[1.0, 1.0, 2.0, 3.0][..]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.event_count(), 4);
    }

    #[test]
    fn test_global_range_skips_empty_keys() {
        let store: OffsetStore<&str> = vec![
            ("a", vec![5.0, 9.0]),
            ("b", vec![]),
            ("c", vec![-2.0, 4.0]),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.global_range(), Some((-2.0, 9.0)));

        let silent: OffsetStore<&str> = vec![("a", vec![])].into_iter().collect();
        assert_eq!(silent.global_range(), None);
    }

    #[test]
    fn test_labels_fall_back_to_debug() {
        let mut store = OffsetStore::new();
        store.insert(("a", "b"), vec![1.0]);
        store.insert(("c", "d"), vec![2.0]);
        store.set_label(("a", "b"), "a -> b");
        assert_eq!(store.label(&("a", "b")), "a -> b");
        assert_eq!(store.label(&("c", "d")), r#"("c", "d")"#);

        let rendered = store.rendered();
        assert_eq!(rendered.get("a -> b"), Some(&vec![1.0]));
    }

    #[test]
    fn test_svo_origin_flag() {
        let store: OffsetStore<u32> = OffsetStore::new().with_svo_origin(true);
        assert!(store.from_svos());
    }
}
