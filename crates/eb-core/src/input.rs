//! Offset input files.
//!
//! ```json
//! {
//!   "from_svos": false,
//!   "entries": [
//!     {"key": ["alice", "bob"], "label": "alice -> bob", "offsets": [0, 1, 2]}
//!   ]
//! }
//! ```
//!
//! Repeated keys are merged.

use crate::logging::{event_names, Stage};
use eb_common::{KeyPath, OffsetStore, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetFile {
    #[serde(default)]
    pub from_svos: bool,
    pub entries: Vec<OffsetEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetEntry {
    pub key: KeyPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub offsets: Vec<f64>,
}

impl OffsetFile {
    /// Build the offset store; keys without a label are labelled `a -> b`.
    pub fn into_store(self) -> OffsetStore<KeyPath> {
        let mut store = OffsetStore::new().with_svo_origin(self.from_svos);
        for entry in self.entries {
            let label = entry.label.unwrap_or_else(|| entry.key.to_string());
            store.set_label(entry.key.clone(), label);
            store.insert(entry.key, entry.offsets);
        }
        store
    }
}

/// Parse an input document.
pub fn parse_offsets(content: &str) -> Result<OffsetStore<KeyPath>> {
    let file: OffsetFile = serde_json::from_str(content)?;
    Ok(file.into_store())
}

/// Read and parse an input file.
pub fn load_offsets(path: &Path) -> Result<OffsetStore<KeyPath>> {
    let _span = tracing::debug_span!("stage", stage = %Stage::Load).entered();
    let content = std::fs::read_to_string(path)?;
    let store = parse_offsets(&content)?;
    tracing::info!(
        event = event_names::INPUT_LOADED,
        path = %path.display(),
        keys = store.len(),
        events = store.event_count(),
        from_svos = store.from_svos(),
        "Input loaded"
    );
    Ok(store)
}
