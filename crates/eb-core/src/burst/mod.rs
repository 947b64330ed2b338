//! Burst detection.
//!
//! - [`detector`]: Kleinberg's two-parameter automaton over one key's offsets
//! - [`batch`]: the detector applied to every key of an offset store

pub mod batch;
pub mod detector;

pub use batch::{BatchOutcome, BurstBatch, CancelToken, SkippedKey};
pub use detector::{BurstDetector, DetectorConfig};
